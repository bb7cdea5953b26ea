use anyhow::Context;
use chatgames_bot::{
    ChatHandler, ChatLine, Config, Cooldowns, JsonlChatLog, MemoryLedger, SettingsStore,
};
use chatgames_execution::{Clock, MinigameEngine, RoundStore, SystemClock};
use chatgames_types::UserId;
use clap::Parser;
use std::{str::FromStr, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML config file
    #[arg(short, long)]
    config: String,

    /// Overrides `log_level` from the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Name the bot's own replies are logged under
    #[arg(long, default_value = "chatgames")]
    bot_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let raw = std::fs::read_to_string(&args.config)
        .with_context(|| format!("could not read config file {}", args.config))?;
    let config: Config = serde_yaml::from_str(&raw).context("could not parse config file")?;
    let config = config.validate().context("invalid config")?;

    // Create logger
    let log_level = match &args.log_level {
        Some(level) => {
            Level::from_str(level).with_context(|| format!("invalid log level: {level}"))?
        }
        None => config.log_level,
    };
    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(log_level)
            .init();
    } else {
        tracing_subscriber::fmt().with_max_level(log_level).init();
    }

    // Wire components
    let settings = Arc::new(SettingsStore::new(
        config.settings_path,
        config.settings_ttl,
    ));
    info!(path = %settings.path().display(), "channel settings");
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = Arc::new(MinigameEngine::new(
        config.engine,
        Arc::new(RoundStore::new()),
        clock.clone(),
        Arc::new(MemoryLedger::new()),
    ));
    let handler = Arc::new(ChatHandler::new(
        engine,
        settings,
        Cooldowns::new(config.cooldown_per_minute),
        Arc::new(JsonlChatLog::new(config.chat_log_path)),
        clock,
        UserId::new(args.bot_name),
    ));

    // Close expired rounds and replay failed credits in the background
    let sweeper = handler.clone();
    let mut interval = tokio::time::interval(config.sweep_interval);
    tokio::spawn(async move {
        loop {
            interval.tick().await;
            for (channel, text) in sweeper.sweep() {
                println!("[{channel}] {text}");
            }
            sweeper.replay_credits().await;
            sweeper.cooldowns().prune();
        }
    });

    // Read chat from stdin
    info!("reading chat lines as `channel user [mod] message`");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                let Some(chat) = ChatLine::from_console(&line) else {
                    if !line.trim().is_empty() {
                        warn!(%line, "ignoring malformed line");
                    }
                    continue;
                };
                if let Some(reply) = handler.handle(&chat).await {
                    println!("[{}] {reply}", chat.channel);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    info!("shutting down");
    Ok(())
}
