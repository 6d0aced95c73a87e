//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup, the console loop,
//! and the snapshot writer.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: stockpile_core::config::ConfigError,
    },

    /// The round loop failed or could not be joined.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: stockpile_core::session::SessionError,
    },

    /// Reading stdin or writing stdout failed.
    #[error("console I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A snapshot could not be serialized.
    #[error("snapshot encoding error: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
