use async_trait::async_trait;
use chatgames_execution::ports::{ChatLogError, ChatLogPort};
use chatgames_types::ledger::ChatMessage;
use std::path::PathBuf;
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};

/// Chat log that appends one JSON object per line.
pub struct JsonlChatLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JsonlChatLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChatLogPort for JsonlChatLog {
    async fn save_chat_message(&self, message: &ChatMessage) -> Result<(), ChatLogError> {
        let mut line =
            serde_json::to_vec(message).map_err(|e| ChatLogError::Encode(e.to_string()))?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        if file.is_none() {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            let opened = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            *file = Some(opened);
        }
        if let Some(file) = file.as_mut() {
            file.write_all(&line).await?;
            file.flush().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgames_types::{ChannelId, UserId};
    use chrono::Utc;

    #[tokio::test]
    async fn test_appends_json_lines() {
        let path = std::env::temp_dir()
            .join(format!("chatgames-chatlog-{}", uuid::Uuid::new_v4()))
            .join("chat.jsonl");
        let log = JsonlChatLog::new(&path);

        let messages: Vec<_> = ["!guess 42", "Меньше!"]
            .into_iter()
            .map(|content| ChatMessage {
                channel: ChannelId::from("chan"),
                user: UserId::from("alice"),
                content: content.to_string(),
                timestamp: Utc::now(),
            })
            .collect();
        for message in &messages {
            log.save_chat_message(message).await.unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        let decoded: Vec<ChatMessage> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(decoded, messages);
    }
}
