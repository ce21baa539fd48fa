pub mod config;
pub mod error;
pub mod types;

pub use config::{BotConfig, FilterConfig, LoggingConfig, NeuralcordConfig, ReplyTags};
pub use error::{NeuralcordError, Result};
pub use types::{ChatMessage, ContextWindow, Decision};
