//! Channel allow-list for the chat adapter.
//!
//! Deny-by-default: an empty list means the bot listens nowhere.
//! Wildcard `"*"` allows every channel.

/// Returns `true` when the bot may watch and answer in `channel_id`.
///
/// Entries match the raw channel ID exactly; a leading `#` on an entry is
/// ignored so `"#123"` and `"123"` are equivalent.
pub fn is_channel_allowed(allowed: &[String], channel_id: &str) -> bool {
    if allowed.is_empty() {
        return false;
    }
    allowed.iter().any(|entry| {
        let entry = entry.trim().trim_start_matches('#');
        entry == "*" || entry == channel_id
    })
}
