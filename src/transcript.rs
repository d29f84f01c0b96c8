//! Append-only chat transcript
//!
//! One line per broadcast event. Write failures are logged and otherwise
//! ignored; they never affect sessions.

use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::message::Message;

/// Default transcript file, relative to the working directory
pub const DEFAULT_TRANSCRIPT_PATH: &str = "chat.log";

/// Transcript sink
#[derive(Debug)]
pub struct Transcript {
    file: Option<File>,
}

impl Transcript {
    /// Open (or create) the transcript in append mode
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self { file: Some(file) })
    }

    /// A transcript that records nothing
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Append one message
    pub async fn append(&mut self, msg: &Message) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let line = msg.transcript_line();
        if let Err(e) = file.write_all(line.as_bytes()).await {
            warn!("Failed to write transcript: {}", e);
            return;
        }
        if let Err(e) = file.flush().await {
            warn!("Failed to flush transcript: {}", e);
        }
    }
}
