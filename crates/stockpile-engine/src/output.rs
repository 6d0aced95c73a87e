//! Snapshot writer: the only task that writes to stdout.
//!
//! Every snapshot the session publishes is written as one JSON line, in
//! publication order, read from the session's broadcast feed. The console's
//! replies (explicit `state` requests and rejected commands) go through the
//! same task so lines never interleave.

use serde_json::json;
use stockpile_types::GameSnapshot;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Capacity of the console reply queue.
pub const REPLY_CAPACITY: usize = 32;

/// A console reply to be written in order with snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Write this snapshot, taken when `state` was handled.
    State(Box<GameSnapshot>),
    /// Write an error line.
    Error(String),
}

/// Encode a snapshot as one newline-terminated JSON line.
pub fn render_snapshot(snapshot: &GameSnapshot) -> Result<String, EngineError> {
    let mut line = serde_json::to_string(snapshot)?;
    line.push('\n');
    Ok(line)
}

/// Encode an error reply as one newline-terminated JSON line.
pub fn render_error(message: &str) -> Result<String, EngineError> {
    let mut line = serde_json::to_string(&json!({ "error": message }))?;
    line.push('\n');
    Ok(line)
}

/// Write snapshots and replies to `out`.
///
/// Pending feed snapshots are written before a queued reply. After the
/// reply queue closes the writer keeps draining the feed until every
/// publisher is gone.
pub async fn write_lines<W>(
    mut out: W,
    mut feed: broadcast::Receiver<GameSnapshot>,
    mut replies: mpsc::Receiver<Reply>,
) -> Result<(), EngineError>
where
    W: AsyncWrite + Unpin,
{
    let mut replies_open = true;

    loop {
        let line = tokio::select! {
            biased;
            published = feed.recv() => match published {
                Ok(snapshot) => render_snapshot(&snapshot)?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Snapshot writer lagged, snapshots dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
            reply = replies.recv(), if replies_open => match reply {
                Some(Reply::State(snapshot)) => render_snapshot(&snapshot)?,
                Some(Reply::Error(message)) => render_error(&message)?,
                None => {
                    replies_open = false;
                    continue;
                }
            },
        };
        out.write_all(line.as_bytes()).await?;
        out.flush().await?;
    }

    debug!("Snapshot writer finished");
    Ok(())
}

/// Spawn the writer on stdout.
pub fn spawn_stdout_writer(
    feed: broadcast::Receiver<GameSnapshot>,
    replies: mpsc::Receiver<Reply>,
) -> JoinHandle<Result<(), EngineError>> {
    tokio::spawn(write_lines(tokio::io::stdout(), feed, replies))
}
