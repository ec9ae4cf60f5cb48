//! # Console Transport
//!
//! Drives one channel from the terminal: each stdin line is a chat message from
//! a fixed author, replies are printed to stdout. Used for local testing of
//! command configs without a Matrix account.

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::domain::traits::ChatProvider;
use crate::domain::types::{Author, IncomingLine};

pub struct ConsoleChat {
    channel: String,
}

impl ConsoleChat {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
        }
    }
}

#[async_trait]
impl ChatProvider for ConsoleChat {
    fn room_id(&self) -> String {
        self.channel.clone()
    }

    async fn send_message(&self, content: &str) -> Result<(), String> {
        println!("[{}] {}", self.channel, content);
        Ok(())
    }
}

/// Reads stdin until EOF.
pub async fn run(author: Author, queue: mpsc::Sender<IncomingLine>) -> Result<()> {
    forward_lines(BufReader::new(tokio::io::stdin()), author, queue).await
}

async fn forward_lines<R: AsyncBufRead + Unpin>(
    reader: R,
    author: Author,
    queue: mpsc::Sender<IncomingLine>,
) -> Result<()> {
    let mut lines = reader.lines();
    while let Some(body) = lines.next_line().await? {
        if body.trim().is_empty() {
            continue;
        }
        let line = IncomingLine {
            author: author.clone(),
            body,
        };
        if queue.send(line).await.is_err() {
            tracing::error!("channel worker is gone, stopping console input");
            break;
        }
    }
    Ok(())
}
