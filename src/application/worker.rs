//! # Channel Worker
//!
//! One task per channel. Transports push `IncomingLine`s onto the channel's queue;
//! the worker owns the `ChannelSession` and processes lines strictly in order,
//! so no session state is ever shared between tasks.
//!
//! After each line: the reply (if any) goes out through the `ChatProvider`,
//! a dirty session is written back through the `ChannelStore`, and engine
//! failures are handed to telemetry.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::dispatcher::{Dispatcher, Outcome};
use crate::application::session::ChannelSession;
use crate::domain::errors::EngineError;
use crate::domain::traits::{ChannelStore, ChatProvider};
use crate::domain::types::IncomingLine;
use crate::infrastructure::telemetry::Telemetry;

pub struct ChannelWorker {
    session: ChannelSession,
    dispatcher: Arc<Dispatcher>,
    chat: Arc<dyn ChatProvider>,
    store: Box<dyn ChannelStore>,
    telemetry: Telemetry,
}

impl ChannelWorker {
    pub fn new(
        session: ChannelSession,
        dispatcher: Arc<Dispatcher>,
        chat: Arc<dyn ChatProvider>,
        store: Box<dyn ChannelStore>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            session,
            dispatcher,
            chat,
            store,
            telemetry,
        }
    }

    /// Starts the worker; dropping every sender stops it.
    pub fn spawn(self, capacity: usize) -> (mpsc::Sender<IncomingLine>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(self.run(rx));
        (tx, handle)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<IncomingLine>) {
        tracing::info!(channel = %self.session.state.channel, "channel worker started");
        while let Some(line) = rx.recv().await {
            self.handle(line).await;
        }
        tracing::info!(channel = %self.session.state.channel, "channel worker stopped");
    }

    pub async fn handle(&mut self, line: IncomingLine) -> Outcome {
        let outcome = self
            .dispatcher
            .dispatch(&mut self.session, &line.author, &line.body)
            .await;

        if let Some(reply) = outcome.reply() {
            if let Err(e) = self.chat.send_message(reply).await {
                tracing::error!(channel = %self.chat.room_id(), "Failed to send reply: {}", e);
            }
        }

        if self.session.state.take_dirty() {
            if let Err(e) = self.store.save(&self.session.to_config()) {
                tracing::error!(channel = %self.session.state.channel, "Failed to save channel config: {:#}", e);
            }
        }

        if let Outcome::Errored { error, .. } = &outcome {
            if !matches!(error, EngineError::InsufficientArguments { .. }) {
                self.telemetry.report_error(format!(
                    "[{}] {} failed on {:?}: {}",
                    error.code(),
                    self.session.state.channel,
                    line.body,
                    error
                ));
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Author;
    use crate::infrastructure::storage::JsonChannelStore;
    use crate::interface::modules::catalogue;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatProvider for RecordingChat {
        async fn send_message(&self, content: &str) -> Result<(), String> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok(())
        }

        fn room_id(&self) -> String {
            "!room:test".to_string()
        }
    }

    fn line(author: Author, body: &str) -> IncomingLine {
        IncomingLine {
            author,
            body: body.to_string(),
        }
    }

    async fn worker(store: JsonChannelStore, chat: Arc<RecordingChat>) -> ChannelWorker {
        let config = store.load().unwrap();
        let session = ChannelSession::from_config("chan", config, &catalogue())
            .await
            .unwrap();
        ChannelWorker::new(
            session,
            Arc::new(Dispatcher::new(Duration::from_secs(5))),
            chat,
            Box::new(store),
            Telemetry::disabled(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_and_write_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chan.json");
        let chat = Arc::new(RecordingChat::default());
        let mut worker = worker(JsonChannelStore::new(&path), chat.clone()).await;

        let moderator = Author::new("m1", "mod").moderator();
        worker.handle(line(moderator, "r!cmdadd hi 0 hello &caller&")).await;
        worker.handle(line(Author::new("u1", "alice"), "r!hi")).await;
        worker.handle(line(Author::new("u1", "alice"), "just chatting")).await;

        assert_eq!(
            *chat.sent.lock().unwrap(),
            vec!["@mod > Command hi added successfully.".to_string(), "hello alice".to_string()]
        );

        let saved = JsonChannelStore::new(&path).load().unwrap();
        assert_eq!(saved.commands["hi"].response, "hello &caller&");
    }

    #[tokio::test]
    async fn test_spawned_worker_processes_in_order() {
        let dir = tempdir().unwrap();
        let chat = Arc::new(RecordingChat::default());
        let worker = worker(JsonChannelStore::new(dir.path().join("chan.json")), chat.clone()).await;
        let (tx, handle) = worker.spawn(8);

        let moderator = Author::new("m1", "mod").moderator();
        tx.send(line(moderator.clone(), "r!prefix !")).await.unwrap();
        tx.send(line(moderator.clone(), "r!prefix")).await.unwrap();
        tx.send(line(moderator, "!prefix")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(
            *chat.sent.lock().unwrap(),
            vec![
                "@mod > Prefix changed to !".to_string(),
                "@mod > The current prefix is !".to_string(),
            ]
        );
        let config = JsonChannelStore::new(dir.path().join("chan.json")).load().unwrap();
        assert_eq!(config.meta.prefix, "!");
    }
}
