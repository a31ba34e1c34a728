//! Error types for Task Relay.

use std::path::PathBuf;

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Keyword load error: {0}")]
    Load(#[from] LoadError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Keyword/phrase source errors.
///
/// Recoverable by contract: a category whose source cannot be read degrades
/// to an empty keyword set, so classification simply never matches it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read keyword source {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Transport-layer errors.
///
/// Recoverable per destination: a failed forward to one channel must not
/// block forwards to the remaining channels.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Channel {channel} not found")]
    ChannelNotFound { channel: String },

    #[error("Failed to send to channel {channel}: {reason}")]
    SendFailed { channel: String, reason: String },

    #[error("Failed to download attachment for message {message_id}: {reason}")]
    DownloadFailed { message_id: String, reason: String },
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
