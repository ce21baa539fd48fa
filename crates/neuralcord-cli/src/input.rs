use chrono::{DateTime, Utc};
use neuralcord_core::ChatMessage;

/// Turn an `Author: text` line into a message.
///
/// Blank lines and lines without an author prefix yield `None`.
pub fn parse_line(line: &str, at: DateTime<Utc>) -> Option<ChatMessage> {
    let (author, content) = line.split_once(':')?;
    let author = author.trim();
    let content = content.trim();
    if author.is_empty() || author.contains(char::is_whitespace) || content.is_empty() {
        return None;
    }
    Some(ChatMessage::new(
        uuid::Uuid::now_v7().to_string(),
        author,
        content,
        at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_author_and_text() {
        let msg = parse_line("Sam: hey Aria, what's up?", Utc::now()).unwrap();
        assert_eq!(msg.author, "Sam");
        assert_eq!(msg.content, "hey Aria, what's up?");
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn keeps_colons_in_text() {
        let msg = parse_line("Sam: meet at 10:30", Utc::now()).unwrap();
        assert_eq!(msg.content, "meet at 10:30");
    }

    #[test]
    fn rejects_unattributed_lines() {
        assert!(parse_line("", Utc::now()).is_none());
        assert!(parse_line("no author here", Utc::now()).is_none());
        assert!(parse_line("Sam:   ", Utc::now()).is_none());
        assert!(parse_line("two words: text", Utc::now()).is_none());
    }

    #[test]
    fn ids_are_unique() {
        let now = Utc::now();
        let a = parse_line("Sam: one", now).unwrap();
        let b = parse_line("Sam: one", now).unwrap();
        assert_ne!(a.id, b.id);
    }
}
