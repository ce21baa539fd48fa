use neuralcord_core::ReplyTags;
use serde::Serialize;
use tracing::warn;

/// The classifier's verdict as read from the first line of its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Respond,
    Ignore,
    Inappropriate,
}

/// Parsed classifier reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub verdict: Verdict,
    /// Text after the summary marker line, trimmed. `None` when the marker is
    /// missing or nothing follows it.
    pub rationale: Option<String>,
}

impl ParsedReply {
    /// Only an explicit respond tag lets the agent speak; a flag always wins.
    pub fn should_respond(&self) -> bool {
        self.verdict == Verdict::Respond
    }
}

/// Read the verdict and rationale out of a free-text classifier reply.
///
/// The first non-blank line must equal a tag literal exactly (after trimming).
/// Anything unrecognized, including the ignore tag, reads as [`Verdict::Ignore`].
pub fn parse_reply(raw: &str, tags: &ReplyTags) -> ParsedReply {
    let lines: Vec<&str> = raw.trim().lines().collect();

    let first = lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");

    let verdict = if first == tags.inappropriate {
        Verdict::Inappropriate
    } else if first == tags.respond {
        Verdict::Respond
    } else {
        Verdict::Ignore
    };

    let rationale = lines
        .iter()
        .position(|l| l.trim() == tags.summary)
        .map(|i| lines[i + 1..].join("\n").trim().to_string())
        .filter(|s| !s.is_empty());

    if verdict == Verdict::Inappropriate {
        warn!(
            rationale = rationale.as_deref().unwrap_or(""),
            "classifier flagged the conversation as inappropriate"
        );
    }

    ParsedReply { verdict, rationale }
}
