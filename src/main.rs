//! # Main Entry Point
//!
//! Initializes the bot:
//! - Domain: configuration and types
//! - Infrastructure: Matrix or console transport, channel storage, telemetry
//! - Application: sessions, dispatcher and one worker per channel
//! - Interface: the module catalogue

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::dispatcher::Dispatcher;
use crate::application::logging;
use crate::application::modules::ModuleKind;
use crate::application::session::ChannelSession;
use crate::application::worker::ChannelWorker;
use crate::domain::config::{AppConfig, TransportKind};
use crate::domain::traits::{ChannelStore, ChatProvider};
use crate::domain::types::{Author, IncomingLine};
use crate::infrastructure::console::{self, ConsoleChat};
use crate::infrastructure::matrix::{self, MatrixChannel, MatrixRouter};
use crate::infrastructure::storage::JsonChannelStore;
use crate::infrastructure::telemetry::Telemetry;

const CONSOLE_CHANNEL: &str = "console";

#[derive(Parser, Debug)]
#[command(name = "rasbot", version, about = "Chat command bot")]
struct Args {
    /// App config file
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Read chat lines from stdin instead of connecting to Matrix
    #[arg(long)]
    console: bool,

    /// Channel driven by the console (defaults to the first configured one)
    #[arg(long)]
    channel: Option<String>,

    /// Console author name
    #[arg(long, default_value = "console")]
    as_user: String,

    /// Console author is a moderator
    #[arg(long)]
    moderator: bool,
}

/// Everything needed to bring a channel up.
struct Runtime {
    config: Arc<AppConfig>,
    catalogue: Vec<ModuleKind>,
    dispatcher: Arc<Dispatcher>,
    telemetry: Telemetry,
}

impl Runtime {
    /// Loads the channel's session and spawns its worker. A broken channel is
    /// logged and reported, and the other channels carry on.
    async fn start_channel(
        &self,
        channel: &str,
        config_path: &str,
        chat: Arc<dyn ChatProvider>,
    ) -> Option<(mpsc::Sender<IncomingLine>, JoinHandle<()>)> {
        let store = JsonChannelStore::new(self.config.channel_path(config_path));
        let session = match self.load_session(channel, &store).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(channel, "Failed to start channel: {:#}", e);
                self.telemetry
                    .report_error(format!("channel {channel} failed to start: {e:#}"));
                return None;
            }
        };

        let worker = ChannelWorker::new(
            session,
            self.dispatcher.clone(),
            chat,
            Box::new(store),
            self.telemetry.clone(),
        );
        Some(worker.spawn(self.config.engine.queue_capacity))
    }

    async fn load_session(&self, channel: &str, store: &JsonChannelStore) -> Result<ChannelSession> {
        let config = store.load()?;
        ChannelSession::from_config(channel, config, &self.catalogue).await
    }
}

fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let mut config = load_config(&args.config)?;
    if args.console {
        config.transport = TransportKind::Console;
    }

    // 2. Logging Setup
    let _guard = logging::init(&config.data_dir)?;
    tracing::info!("Starting rasbot {}...", env!("CARGO_PKG_VERSION"));

    let telemetry = Telemetry::new(&config.telemetry);
    telemetry.notify_instance();

    let runtime = Runtime {
        dispatcher: Arc::new(Dispatcher::new(Duration::from_secs(
            config.engine.module_timeout_secs,
        ))),
        config: Arc::new(config),
        catalogue: interface::modules::catalogue(),
        telemetry,
    };

    // 3. Transport
    match runtime.config.transport {
        TransportKind::Console => run_console(&runtime, &args).await,
        TransportKind::Matrix => run_matrix(&runtime).await,
    }
}

async fn run_console(runtime: &Runtime, args: &Args) -> Result<()> {
    let channel = args
        .channel
        .clone()
        .or_else(|| runtime.config.channels.keys().next().cloned())
        .unwrap_or_else(|| CONSOLE_CHANNEL.to_string());
    let config_path = runtime
        .config
        .channels
        .get(&channel)
        .cloned()
        .unwrap_or_else(|| format!("channels/{CONSOLE_CHANNEL}.json"));

    let chat = Arc::new(ConsoleChat::new(&channel));
    let Some((queue, worker)) = runtime.start_channel(&channel, &config_path, chat).await else {
        bail!("channel {channel} could not be started");
    };

    let mut author = Author::new(&args.as_user, &args.as_user);
    if args.moderator {
        author = author.moderator();
    }
    tracing::info!(channel = %channel, author = %author.name, "console ready, type chat lines");
    console::run(author, queue).await?;

    // input closed; let the worker drain its queue
    worker.await.context("channel worker panicked")?;
    Ok(())
}

async fn run_matrix(runtime: &Runtime) -> Result<()> {
    let Some(matrix_config) = &runtime.config.matrix else {
        bail!("transport is matrix but no `matrix` section is configured");
    };
    if runtime.config.channels.is_empty() {
        tracing::warn!("No channels configured");
    }

    let client = matrix::connect(matrix_config).await?;

    let mut routes = HashMap::new();
    for (room_id, config_path) in &runtime.config.channels {
        let chat = match MatrixChannel::new(client.clone(), room_id) {
            Ok(chat) => chat,
            Err(e) => {
                tracing::error!("Skipping channel: {:#}", e);
                continue;
            }
        };
        if let Some((queue, _worker)) = runtime.start_channel(room_id, config_path, Arc::new(chat)).await {
            routes.insert(room_id.clone(), queue);
        }
    }

    let router = MatrixRouter::new(routes, runtime.config.clone());
    matrix::run(client, router).await
}
