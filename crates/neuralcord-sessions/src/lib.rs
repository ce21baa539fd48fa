pub mod allow;
pub mod error;
pub mod manager;
pub mod types;

pub use allow::is_channel_allowed;
pub use error::SessionError;
pub use manager::ChannelSessions;
pub use types::{ChannelKey, ChannelSnapshot};
