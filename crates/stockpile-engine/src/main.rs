//! Console host for the Stockpile warehouse game.
//!
//! This is the main entry point that wires the game session to a
//! line-oriented console. Commands arrive on stdin, every published
//! snapshot leaves on stdout as one JSON line, and logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `stockpile-config.yaml` (or the path given as
//!    the first argument), falling back to defaults
//! 2. Initialize structured logging (tracing) on stderr
//! 3. Create the game session
//! 4. Spawn the stdout snapshot writer
//! 5. Run the console until `quit`, end of input, or Ctrl-C
//! 6. Stop the round loop, close the snapshot feed, and drain the writer

mod console;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Context as _;
use stockpile_core::config::{GameConfig, LogFormat, LoggingConfig};
use stockpile_core::session::GameSession;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Config file looked up in the working directory when no path is given.
const DEFAULT_CONFIG_PATH: &str = "stockpile-config.yaml";

/// Application entry point for the console host.
///
/// # Errors
///
/// Returns an error if configuration is invalid, console I/O fails, or
/// the round loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, loaded_from) = load_config().context("failed to load configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("stockpile-engine starting");
    match loaded_from {
        Some(path) => info!(path = %path.display(), "Config file loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        tick_interval_ms = config.clock.tick_interval_ms,
        seed = ?config.demand.seed,
        negative_demand = ?config.demand.negative_demand,
        "Configuration loaded"
    );

    // 3. Create the game session.
    let session = GameSession::new(&config);
    info!("Game session created, waiting for `start`");

    // 4. Spawn the snapshot writer.
    let (replies_tx, replies_rx) = mpsc::channel(output::REPLY_CAPACITY);
    let writer = output::spawn_stdout_writer(session.subscribe_feed(), replies_rx);

    // 5. Run the console.
    let stdin = BufReader::new(tokio::io::stdin());
    console::run(&session, stdin, replies_tx)
        .await
        .context("console failed")?;

    // 6. Shut down.
    if let Some(result) = session.shutdown().await.context("round loop failed")? {
        info!(
            session_id = %result.session_id,
            end_reason = ?result.end_reason,
            total_ticks = result.total_ticks,
            "Last round stopped"
        );
    }
    // Closing the feed lets the writer finish once it has drained.
    drop(session);
    writer
        .await
        .context("snapshot writer task did not complete")?
        .context("snapshot writer failed")?;

    info!("stockpile-engine shutdown complete");
    Ok(())
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the game configuration.
///
/// Reads the path given as the first argument, or `stockpile-config.yaml`
/// in the working directory. A missing file means defaults; environment
/// overrides apply either way. Returns the path actually read, if any.
fn load_config() -> Result<(GameConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if config_path.exists() {
        let config = GameConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        let mut config = GameConfig::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok((config, None))
    }
}
