//! src/main.rs
//! ============================================================================
//! # Carousel Engine Entry Point
//!
//! Wires the production collaborators (OAuth broker, Drive-style listing,
//! HTTP image fetcher, console surface) to the event loop, then hands
//! control to it. Operator input arrives on stdin: `auth <code>` runs the
//! authorization-code exchange, `fetch` triggers a poll cycle, `quit` ends
//! the session.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal;
use tokio::sync::{Mutex, Notify, mpsc};
use tracing::{error, info, warn};

use reel_core::{
    Logger,
    config::Config,
    controller::{actions::Action, event_loop::EventLoop},
    model::app_state::AppState,
    remote::{
        auth::OAuthBroker, fetch::HttpImageFetcher, listing::DriveListing,
        token_store::TokenStore,
    },
    view::surface::ConsoleSurface,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    Logger::init_tracing();
    info!("starting reel");

    // Load configuration
    let config: Arc<Config> = Arc::new(Config::load().await.unwrap_or_else(|e| {
        warn!("failed to load config, using defaults: {e}");
        Config::default()
    }));
    if config.folder_id.is_empty() {
        warn!("no folder_id configured, polling will list nothing useful");
    }

    // Communication channel between tasks and the event loop
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

    // Shared session state
    let app_state: Arc<Mutex<AppState>> = Arc::new(Mutex::new(AppState::new(config.clone())));

    // Production collaborators
    let store: TokenStore =
        TokenStore::at_default_path().context("Failed to resolve token store path")?;
    let broker = Arc::new(OAuthBroker::new(config.oauth.clone(), store));
    let listing = Arc::new(DriveListing::new(
        config.listing_endpoint.clone(),
        config.page_size,
    ));
    let fetcher = Arc::new(HttpImageFetcher::new());
    let surface = Arc::new(ConsoleSurface);

    // Graceful shutdown plus operator input
    let shutdown: Arc<Notify> = Arc::new(Notify::new());
    spawn_shutdown_handler(shutdown.clone());
    spawn_command_reader(action_tx.clone());

    let event_loop: EventLoop = EventLoop::new(
        app_state, action_rx, action_tx, broker, listing, fetcher, surface,
    );
    event_loop.run(shutdown).await;

    info!("session ended cleanly");
    Ok(())
}

/// Setup signal handler for graceful shutdown
fn spawn_shutdown_handler(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C signal");
                shutdown.notify_one();
            }
            Err(e) => {
                error!("failed to listen for Ctrl+C: {e}");
            }
        }
    });
}

/// Reads operator commands from stdin and forwards them as actions:
/// `auth <code>`, `fetch`, `quit`.
fn spawn_command_reader(action_tx: mpsc::UnboundedSender<Action>) {
    tokio::spawn(async move {
        let mut lines: Lines<BufReader<Stdin>> = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let trimmed: &str = line.trim();
            let action: Option<Action> = match trimmed.split_once(' ') {
                Some(("auth", code)) if !code.trim().is_empty() => Some(Action::Authorize {
                    code: code.trim().to_owned(),
                }),
                _ => match trimmed {
                    "fetch" => Some(Action::FetchNow),
                    "quit" | "exit" => Some(Action::Quit),
                    "" => None,
                    other => {
                        warn!("unknown command: {other}");
                        None
                    }
                },
            };

            if let Some(action) = action
                && action_tx.send(action).is_err()
            {
                break;
            }
        }
    });
}
