use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info, instrument};

use neuralcord_core::{BotConfig, ChatMessage, ContextWindow, FilterConfig};

use crate::error::{Result, SessionError};
use crate::types::{ChannelKey, ChannelSnapshot};

struct ChannelState {
    /// Oldest first, at most `capacity` entries.
    messages: VecDeque<ChatMessage>,
    cooldown_secs: u64,
    last_reply_at: Option<DateTime<Utc>>,
}

/// In-memory per-channel state owned by the chat adapter.
///
/// Assembles the bounded, chronological window the filter gate expects and
/// tracks reply cooldowns. Nothing here survives a restart.
pub struct ChannelSessions {
    channels: DashMap<ChannelKey, ChannelState>,
    capacity: usize,
    default_cooldown_secs: u64,
    min_cooldown_secs: u64,
}

impl ChannelSessions {
    pub fn new(capacity: usize, default_cooldown_secs: u64, min_cooldown_secs: u64) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
            default_cooldown_secs: default_cooldown_secs.max(min_cooldown_secs),
            min_cooldown_secs,
        }
    }

    pub fn from_config(filter: &FilterConfig, bot: &BotConfig) -> Self {
        Self::new(
            filter.max_context_messages,
            bot.cooldown_secs,
            bot.min_cooldown_secs,
        )
    }

    fn new_state(&self) -> ChannelState {
        ChannelState {
            messages: VecDeque::with_capacity(self.capacity),
            cooldown_secs: self.default_cooldown_secs,
            last_reply_at: None,
        }
    }

    /// Add a message to the channel window.
    ///
    /// Returns `false` when a message with the same id is already held.
    /// Late arrivals are slotted in by timestamp; the oldest entries fall off
    /// once the window is full.
    #[instrument(skip(self, msg), fields(key = %key, id = %msg.id))]
    pub fn record(&self, key: &ChannelKey, msg: ChatMessage) -> bool {
        let mut state = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| self.new_state());

        if state.messages.iter().any(|m| m.id == msg.id) {
            debug!("duplicate message ignored");
            return false;
        }

        let pos = state
            .messages
            .iter()
            .rposition(|m| m.timestamp <= msg.timestamp)
            .map_or(0, |i| i + 1);
        state.messages.insert(pos, msg);

        while state.messages.len() > self.capacity {
            state.messages.pop_front();
        }
        true
    }

    /// Snapshot of the channel window, oldest first. Empty for unknown channels.
    pub fn window(&self, key: &ChannelKey) -> ContextWindow {
        self.channels
            .get(key)
            .map(|s| ContextWindow::new(s.messages.iter().cloned().collect()))
            .unwrap_or_default()
    }

    /// Forget the channel's messages; cooldown settings are kept.
    pub fn clear(&self, key: &ChannelKey) -> Result<()> {
        let mut state = self
            .channels
            .get_mut(key)
            .ok_or_else(|| SessionError::UnknownChannel { key: key.format() })?;
        state.messages.clear();
        info!(key = %key, "channel window cleared");
        Ok(())
    }

    /// Change the reply cooldown for one channel.
    pub fn set_cooldown(&self, key: &ChannelKey, secs: u64) -> Result<()> {
        if secs < self.min_cooldown_secs {
            return Err(SessionError::CooldownTooShort {
                requested: secs,
                min: self.min_cooldown_secs,
            });
        }
        let mut state = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| self.new_state());
        state.cooldown_secs = secs;
        info!(key = %key, secs, "channel cooldown updated");
        Ok(())
    }

    /// Time left before the bot may reply again, `None` when it may reply now.
    pub fn cooldown_remaining(&self, key: &ChannelKey, now: DateTime<Utc>) -> Option<Duration> {
        let state = self.channels.get(key)?;
        let last = state.last_reply_at?;
        let ready_at = last + Duration::seconds(state.cooldown_secs as i64);
        (ready_at > now).then(|| ready_at - now)
    }

    pub fn mark_replied(&self, key: &ChannelKey, at: DateTime<Utc>) {
        let mut state = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| self.new_state());
        state.last_reply_at = Some(at);
    }

    pub fn snapshot(&self, key: &ChannelKey) -> Option<ChannelSnapshot> {
        self.channels.get(key).map(|s| ChannelSnapshot {
            key: key.clone(),
            message_count: s.messages.len(),
            cooldown_secs: s.cooldown_secs,
            last_reply_at: s.last_reply_at,
        })
    }

    /// Every channel with recorded state.
    pub fn channels(&self) -> Vec<ChannelKey> {
        self.channels.iter().map(|e| e.key().clone()).collect()
    }
}
