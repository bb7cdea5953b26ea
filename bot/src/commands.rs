//! Chat command parsing.

use chatgames_types::minigame::{GameKind, GuessKind};

/// Prefix every bot command starts with
pub const COMMAND_PREFIX: char = '!';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    StartNumber,
    StartWord,
    /// A number, letter or word guess; `None` when the argument is missing
    Guess {
        kind: GuessKind,
        input: Option<String>,
    },
    /// `None` when the game argument is missing or unknown
    Status { kind: Option<GameKind> },
    Stop { kind: Option<GameKind> },
    Rps { choice: Option<String> },
    /// Turn minigames on or off for the channel; `None` when the argument
    /// is not on/off
    SetMinigames { enabled: Option<bool> },
    /// `!minigames rps on|off`
    SetRps { enabled: Option<bool> },
}

fn parse_switch(raw: Option<&str>) -> Option<bool> {
    match raw.map(str::to_lowercase).as_deref() {
        Some("on" | "вкл") => Some(true),
        Some("off" | "выкл") => Some(false),
        _ => None,
    }
}

impl Command {
    /// Parse a chat line. Returns `None` for ordinary chat and unknown
    /// commands.
    pub fn parse(line: &str) -> Option<Command> {
        let body = line.trim().strip_prefix(COMMAND_PREFIX)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());
        let game = arg.as_deref().and_then(|raw| raw.parse::<GameKind>().ok());

        let command = match name.to_lowercase().as_str() {
            "number" => Command::StartNumber,
            "word" => Command::StartWord,
            "guess" => Command::Guess {
                kind: GuessKind::Number,
                input: arg,
            },
            "letter" => Command::Guess {
                kind: GuessKind::Letter,
                input: arg,
            },
            "solve" => Command::Guess {
                kind: GuessKind::Word,
                input: arg,
            },
            "status" => Command::Status { kind: game },
            "stop" => Command::Stop { kind: game },
            "rps" => Command::Rps { choice: arg },
            "minigames" => {
                let (target, switch) = match rest.split_once(char::is_whitespace) {
                    Some((target, switch)) => (target, Some(switch.trim())),
                    None => (rest, None),
                };
                if target.eq_ignore_ascii_case("rps") {
                    Command::SetRps {
                        enabled: parse_switch(switch),
                    }
                } else {
                    Command::SetMinigames {
                        enabled: parse_switch(arg.as_deref()),
                    }
                }
            }
            _ => return None,
        };
        Some(command)
    }

    /// Whether only moderators may run this command.
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            Command::Stop { .. } | Command::SetMinigames { .. } | Command::SetRps { .. }
        )
    }

    /// Whether this command changes channel settings.
    pub fn is_toggle(&self) -> bool {
        matches!(self, Command::SetMinigames { .. } | Command::SetRps { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_plain_chat() {
        assert_eq!(Command::parse("hello there"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("!dance"), None);
        assert_eq!(Command::parse("!"), None);
    }

    #[test]
    fn test_parse_guesses() {
        assert_eq!(
            Command::parse("  !guess   42 "),
            Some(Command::Guess {
                kind: GuessKind::Number,
                input: Some("42".to_string())
            })
        );
        assert_eq!(
            Command::parse("!LETTER р"),
            Some(Command::Guess {
                kind: GuessKind::Letter,
                input: Some("р".to_string())
            })
        );
        assert_eq!(
            Command::parse("!solve"),
            Some(Command::Guess {
                kind: GuessKind::Word,
                input: None
            })
        );
    }

    #[test]
    fn test_parse_game_argument() {
        assert_eq!(
            Command::parse("!status word"),
            Some(Command::Status {
                kind: Some(GameKind::WordGuess)
            })
        );
        assert_eq!(
            Command::parse("!stop число"),
            Some(Command::Stop {
                kind: Some(GameKind::NumberGuess)
            })
        );
        assert_eq!(
            Command::parse("!stop chess"),
            Some(Command::Stop { kind: None })
        );
        assert!(Command::parse("!stop number").unwrap().is_privileged());
        assert!(!Command::parse("!number").unwrap().is_privileged());
    }

    #[test]
    fn test_parse_rps() {
        assert_eq!(
            Command::parse("!rps камень"),
            Some(Command::Rps {
                choice: Some("камень".to_string())
            })
        );
        assert_eq!(Command::parse("!rps"), Some(Command::Rps { choice: None }));
    }

    #[test]
    fn test_parse_minigames_toggle() {
        assert_eq!(
            Command::parse("!minigames OFF"),
            Some(Command::SetMinigames {
                enabled: Some(false)
            })
        );
        assert_eq!(
            Command::parse("!minigames вкл"),
            Some(Command::SetMinigames {
                enabled: Some(true)
            })
        );
        assert_eq!(
            Command::parse("!minigames maybe"),
            Some(Command::SetMinigames { enabled: None })
        );
        assert!(Command::parse("!minigames on").unwrap().is_privileged());
    }

    #[test]
    fn test_parse_rps_toggle() {
        assert_eq!(
            Command::parse("!minigames rps off"),
            Some(Command::SetRps {
                enabled: Some(false)
            })
        );
        assert_eq!(
            Command::parse("!minigames RPS вкл"),
            Some(Command::SetRps {
                enabled: Some(true)
            })
        );
        assert_eq!(
            Command::parse("!minigames rps"),
            Some(Command::SetRps { enabled: None })
        );
        let command = Command::parse("!minigames rps on").unwrap();
        assert!(command.is_privileged() && command.is_toggle());
        assert!(!Command::parse("!rps камень").unwrap().is_toggle());
    }
}
