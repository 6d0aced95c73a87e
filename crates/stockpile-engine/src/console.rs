//! Line-oriented command console.
//!
//! Each input line is one command:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `start` | Start (or restart) a round |
//! | `adjust <category> <delta>` | Add `delta` to a category's stock |
//! | `state` | Print the current snapshot |
//! | `quit` | Stop the console |
//!
//! Malformed lines are answered with an error reply and never reach the
//! session.

use std::num::ParseIntError;
use std::str::FromStr;

use stockpile_core::session::GameSession;
use stockpile_types::{Category, ParseCategoryError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::output::Reply;

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a new round.
    Start,
    /// Adjust one category's stock.
    Adjust {
        /// Category to adjust.
        category: Category,
        /// Signed change in units.
        delta: i32,
    },
    /// Print the current snapshot.
    State,
    /// Leave the console.
    Quit,
}

/// Errors produced when a console line cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line held no command.
    #[error("empty command")]
    Empty,

    /// The command word is not recognised.
    #[error("unknown command: {name}")]
    Unknown {
        /// The unrecognised word.
        name: String,
    },

    /// A required argument is absent.
    #[error("{command} is missing its {argument} argument")]
    MissingArgument {
        /// The command being parsed.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// The command was given more arguments than it takes.
    #[error("{command} takes no further arguments, got: {extra}")]
    UnexpectedArgument {
        /// The command being parsed.
        command: &'static str,
        /// The first surplus argument.
        extra: String,
    },

    /// The category argument is not a known category.
    #[error(transparent)]
    Category(#[from] ParseCategoryError),

    /// The delta argument is not an integer in range.
    #[error("invalid delta {value}: {source}")]
    Delta {
        /// The text that failed to parse.
        value: String,
        /// The underlying parse error.
        source: ParseIntError,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;

        let command = match name.to_lowercase().as_str() {
            "start" => Self::Start,
            "state" => Self::State,
            "quit" | "exit" => Self::Quit,
            "adjust" => {
                let category = words.next().ok_or(CommandError::MissingArgument {
                    command: "adjust",
                    argument: "category",
                })?;
                let value = words.next().ok_or(CommandError::MissingArgument {
                    command: "adjust",
                    argument: "delta",
                })?;
                let category = category.parse::<Category>()?;
                let delta = value.parse::<i32>().map_err(|source| CommandError::Delta {
                    value: value.to_owned(),
                    source,
                })?;
                Self::Adjust { category, delta }
            }
            other => {
                return Err(CommandError::Unknown {
                    name: other.to_owned(),
                });
            }
        };

        if let Some(extra) = words.next() {
            return Err(CommandError::UnexpectedArgument {
                command: command.name(),
                extra: extra.to_owned(),
            });
        }
        Ok(command)
    }
}

impl Command {
    /// The command word.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Adjust { .. } => "adjust",
            Self::State => "state",
            Self::Quit => "quit",
        }
    }
}

/// Read commands from `input` until `quit`, end of input, or Ctrl-C.
///
/// Replies (state dumps and rejections) are queued on `replies` for the
/// snapshot writer.
pub async fn run<R>(
    session: &GameSession,
    input: R,
    replies: mpsc::Sender<Reply>,
) -> Result<(), EngineError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(err) => {
                warn!(line = %line, error = %err, "Rejected console command");
                send(&replies, Reply::Error(err.to_string())).await;
                continue;
            }
        };

        match command {
            Command::Start => {
                let session_id = session.start().await;
                debug!(%session_id, "Console started a round");
            }
            Command::Adjust { category, delta } => {
                if session.adjust(category, delta).await.is_none() {
                    send(
                        &replies,
                        Reply::Error("no round in progress; send `start` first".to_owned()),
                    )
                    .await;
                }
            }
            Command::State => {
                send(&replies, Reply::State(Box::new(session.snapshot()))).await;
            }
            Command::Quit => {
                info!("Quit requested");
                break;
            }
        }
    }

    Ok(())
}

async fn send(replies: &mpsc::Sender<Reply>, reply: Reply) {
    if replies.send(reply).await.is_err() {
        warn!("Snapshot writer has stopped; reply dropped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stockpile_core::config::GameConfig;
    use stockpile_types::GamePhase;

    use super::*;

    #[test]
    fn parses_every_command() {
        assert_eq!("start".parse::<Command>().unwrap(), Command::Start);
        assert_eq!(" STATE ".parse::<Command>().unwrap(), Command::State);
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "adjust electronics -10".parse::<Command>().unwrap(),
            Command::Adjust {
                category: Category::Electronics,
                delta: -10
            }
        );
        assert_eq!(
            "adjust Apparel +5".parse::<Command>().unwrap(),
            Command::Adjust {
                category: Category::Apparel,
                delta: 5
            }
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "adjust furniture 5".parse::<Command>().unwrap_err();
        assert!(matches!(err, CommandError::Category(_)));
        assert_eq!(err.to_string(), "unknown category: furniture");
    }

    #[test]
    fn malformed_delta_is_rejected() {
        assert!(matches!(
            "adjust apparel lots".parse::<Command>(),
            Err(CommandError::Delta { .. })
        ));
        assert!(matches!(
            "adjust apparel 99999999999".parse::<Command>(),
            Err(CommandError::Delta { .. })
        ));
    }

    #[test]
    fn missing_and_extra_arguments() {
        assert_eq!(
            "adjust".parse::<Command>(),
            Err(CommandError::MissingArgument {
                command: "adjust",
                argument: "category"
            })
        );
        assert_eq!(
            "adjust apparel".parse::<Command>(),
            Err(CommandError::MissingArgument {
                command: "adjust",
                argument: "delta"
            })
        );
        assert!(matches!(
            "start now".parse::<Command>(),
            Err(CommandError::UnexpectedArgument { command: "start", .. })
        ));
        assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
        assert!(matches!(
            "restock".parse::<Command>(),
            Err(CommandError::Unknown { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn script_drives_the_session() {
        let session = GameSession::new(&GameConfig::default());
        let (tx, mut rx) = mpsc::channel(8);
        let script: &[u8] = b"adjust apparel 5\nstart\nadjust electronics -10\n\nadjust toys 1\nstate\nquit\nstart\n";

        run(&session, script, tx).await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.item(Category::Electronics).unwrap().stock, 40);

        assert!(matches!(rx.recv().await, Some(Reply::Error(_))));
        assert!(matches!(rx.recv().await, Some(Reply::Error(msg)) if msg.contains("toys")));
        assert!(matches!(
            rx.recv().await,
            Some(Reply::State(snapshot)) if snapshot.phase == GamePhase::Playing
        ));
        // The sender was dropped when the console returned.
        assert!(rx.recv().await.is_none());

        let _ = session.shutdown().await.unwrap();
    }
}
