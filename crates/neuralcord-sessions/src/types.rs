use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Identifies one chat channel the bot watches.
///
/// Format: `{platform}:{channel_id}`, e.g. `discord:1234567890`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub platform: String,
    pub channel_id: String,
}

impl ChannelKey {
    pub fn new(platform: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            channel_id: channel_id.into(),
        }
    }

    pub fn format(&self) -> String {
        format!("{}:{}", self.platform, self.channel_id)
    }

    /// Parse `platform:channel_id`. The channel ID may itself contain colons.
    pub fn parse(s: &str) -> Result<Self> {
        let (platform, channel_id) = s
            .split_once(':')
            .ok_or_else(|| SessionError::InvalidKey(format!("missing ':' separator: {s}")))?;
        if platform.is_empty() || channel_id.is_empty() {
            return Err(SessionError::InvalidKey(format!(
                "key components must not be empty: {s}"
            )));
        }
        Ok(Self::new(platform, channel_id))
    }
}

impl std::fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

/// Read-only view of a channel's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    pub key: ChannelKey,
    /// Messages currently held in the window.
    pub message_count: usize,
    pub cooldown_secs: u64,
    /// When the bot last replied here, if ever.
    pub last_reply_at: Option<DateTime<Utc>>,
}
