//! Renderings of the conversation window.
//!
//! - [`flat_transcript`]: every recent message verbatim, for the classifier.
//! - [`context_digest`]: budgeted newest-first selection, for the agent payload.
//! - [`narrative_summary`]: author-grouped prose, logged for comparison only.
//!
//! All lengths are counted in characters, never bytes.

use neuralcord_core::{ContextWindow, FilterConfig};

use crate::addressee::mentions_agent;

const ELLIPSIS: &str = "...";

/// Suffix marking lines that name the agent.
pub const MENTION_SUFFIX: &str = " (directly mentioned the character)";

/// Per-message cap inside the narrative summary.
const NARRATIVE_MESSAGE_CHARS: usize = 80;

/// Keep the first `max - 3` characters and append "..." when `text` is longer
/// than `max` characters. The result is never longer than `max`.
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// `author: content` per message, oldest first, last `max_context_messages`
/// only. No truncation.
pub fn flat_transcript(window: &ContextWindow, agent_name: &str, config: &FilterConfig) -> String {
    window
        .recent(config.max_context_messages)
        .iter()
        .map(|msg| {
            let suffix = if mentions_agent(&msg.content, agent_name) {
                MENTION_SUFFIX
            } else {
                ""
            };
            format!("{}: {}{}", msg.author, msg.content, suffix)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Budgeted transcript for the agent payload.
///
/// Walks newest to oldest, capping each message at `max_message_length` and
/// the whole digest at `max_context_length` (one separator per line counted).
/// A newest line that alone does not fit is cut to `max_context_length - 3`
/// characters plus "...".
pub fn context_digest(window: &ContextWindow, config: &FilterConfig) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut used = 0usize;

    for msg in window.recent(config.max_context_messages).iter().rev() {
        let content = truncate_with_ellipsis(msg.content.trim(), config.max_message_length);
        let line = format!("{}: {}", msg.author, content);
        let cost = line.chars().count() + 1;

        if used + cost > config.max_context_length {
            if lines.is_empty() {
                // cost counts the separator, so a line of exactly the budget
                // still lands here and is cut
                let keep = config.max_context_length.saturating_sub(ELLIPSIS.len());
                let mut cut: String = line.chars().take(keep).collect();
                cut.push_str(ELLIPSIS);
                lines.push(cut);
            }
            break;
        }

        lines.push(line);
        used += cost;
    }

    lines.reverse();
    lines.join("\n")
}

/// Prose summary grouping consecutive messages by author, e.g.
/// `"Sam said hi and mentioned lunch. Then Kim asked about it and then Sam ok"`.
pub fn narrative_summary(window: &ContextWindow, config: &FilterConfig) -> String {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();

    for msg in window.recent(config.max_context_messages) {
        let content = truncate_with_ellipsis(msg.content.trim(), NARRATIVE_MESSAGE_CHARS);
        if let Some((author, contents)) = groups.last_mut() {
            if *author == msg.author {
                contents.push(content);
                continue;
            }
        }
        groups.push((msg.author.as_str(), vec![content]));
    }

    let topics: Vec<String> = groups
        .iter()
        .map(|(author, contents)| format!("{} {}", author, describe_topics(contents)))
        .collect();

    match topics.len() {
        0 => String::new(),
        1 => topics[0].clone(),
        n => {
            let mut summary = topics[0].clone();
            for (i, topic) in topics.iter().enumerate().skip(1) {
                if i == n - 1 {
                    summary.push_str(" and then ");
                } else {
                    summary.push_str(". Then ");
                }
                summary.push_str(topic);
            }
            summary
        }
    }
}

fn describe_topics(contents: &[String]) -> String {
    const ACTIONS: [&str; 5] = ["said", "mentioned", "talked about", "asked about", "discussed"];

    match contents {
        [] => String::new(),
        [only] => only.clone(),
        few if few.len() <= 3 => {
            let last = few.len() - 1;
            let mut out = String::new();
            for (i, content) in few.iter().enumerate() {
                let action = ACTIONS[i % ACTIONS.len()];
                if i == 0 {
                    out.push_str(&format!("{action} {content}"));
                } else if i == last {
                    out.push_str(&format!(" and {action} {content}"));
                } else {
                    out.push_str(&format!(", {action} {content}"));
                }
            }
            out
        }
        many => format!("had a conversation about {} and other topics", many[0]),
    }
}
