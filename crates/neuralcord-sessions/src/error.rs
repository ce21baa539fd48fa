use thiserror::Error;

/// Errors that can occur during channel session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No messages have been recorded for this channel yet.
    #[error("unknown channel: {key}")]
    UnknownChannel { key: String },

    /// The requested cooldown is below the configured floor.
    #[error("cooldown of {requested}s is below the minimum of {min}s")]
    CooldownTooShort { requested: u64, min: u64 },

    /// The provided channel key string is malformed.
    ///
    /// Expected format: `{platform}:{channel_id}`
    #[error("invalid channel key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
