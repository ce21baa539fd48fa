//! Addressee detection: is the latest message aimed at another person?
//!
//! Pattern families are tried in priority order and the first family that
//! yields a plausible name other than the agent's wins. Patterns run against
//! the lowercased message, except the capitalized-word fallback which needs
//! the original casing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Where in the message the address was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternFamily {
    /// `@name`, `hey name`, `name,` ... at the start of the message.
    Leading,
    /// "what about you name", "asking name", "tell me name" ...
    MidSentence,
    /// "... you name?" at the very end, "your turn name".
    Trailing,
    /// A capitalized word after "to"/"and" or at the end of the message.
    CapitalizedName,
}

impl PatternFamily {
    pub fn confidence(self) -> Confidence {
        match self {
            PatternFamily::Leading => Confidence::High,
            PatternFamily::MidSentence | PatternFamily::Trailing => Confidence::Medium,
            PatternFamily::CapitalizedName => Confidence::Low,
        }
    }
}

impl fmt::Display for PatternFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leading => write!(f, "leading"),
            Self::MidSentence => write!(f, "mid-sentence"),
            Self::Trailing => write!(f, "trailing"),
            Self::CapitalizedName => write!(f, "capitalized-name"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A third party the message appears to be talking to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Addressee {
    pub name: String,
    pub family: PatternFamily,
    pub confidence: Confidence,
}

/// One compiled pattern; capture group 1 is the candidate name.
struct AddressRule {
    family: PatternFamily,
    pattern: Regex,
}

impl AddressRule {
    fn new(family: PatternFamily, pattern: &str) -> Self {
        Self {
            family,
            pattern: Regex::new(pattern).expect("address pattern must compile"),
        }
    }

    fn candidates<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    }
}

static ADDRESS_RULES: LazyLock<Vec<AddressRule>> = LazyLock::new(|| {
    use PatternFamily::*;
    vec![
        AddressRule::new(Leading, r"^@(\w+)"),
        AddressRule::new(Leading, r"^hey\s+(\w+)"),
        AddressRule::new(Leading, r"^hi\s+(\w+)"),
        AddressRule::new(Leading, r"^(\w+)[,:]"),
        AddressRule::new(Leading, r"^(\w+)\s+(?:what|how|can|do|would|tell)"),
        AddressRule::new(MidSentence, r"\bwhat\s+about\s+(?:you|u)\s+(\w+)"),
        AddressRule::new(MidSentence, r"\bhow\s+about\s+(?:you|u)\s+(\w+)"),
        AddressRule::new(MidSentence, r"\b(?:and|or)\s+(?:you|u)\s+(\w+)"),
        AddressRule::new(MidSentence, r"\basking\s+(\w+)"),
        AddressRule::new(MidSentence, r"\btell\s+(?:us|me)\s+(\w+)"),
        AddressRule::new(Trailing, r"\b(?:you|u)\s+(\w+)\s*\??$"),
        AddressRule::new(Trailing, r"\b(?:your|ur)\s+turn\s+(\w+)"),
    ]
});

static CAPITALIZED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+)\b").expect("capitalized pattern must compile"));

/// Words that fill a name slot in the patterns above without being a name
/// ("what do you think", "hey guys", "can you help?").
const NOT_A_NAME: &[&str] = &[
    "a", "about", "agree", "all", "am", "an", "and", "anyone", "are", "be", "bro", "but", "can",
    "could", "did", "do", "does", "doing", "everybody", "everyone", "folks", "for", "guys", "had",
    "has", "have", "he", "hello", "help", "here", "hey", "hi", "how", "i", "if", "im", "is", "it",
    "just", "know", "like", "lol", "man", "me", "mean", "my", "need", "no", "not", "now", "oh",
    "ok", "okay", "or", "people", "please", "really", "right", "said", "say", "see", "she",
    "should", "so", "sure", "thanks", "that", "the", "them", "then", "there", "they", "think",
    "this", "to", "too", "u", "up", "us", "want", "was", "we", "well", "what", "when", "where",
    "which", "who", "why", "will", "with", "would", "y", "yall", "yeah", "yes", "yo", "you",
    "your",
];

fn is_name_like(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    !lower.is_empty() && !NOT_A_NAME.contains(&lower.as_str())
}

/// Case-insensitive direct mention of the agent. An empty name never matches.
pub fn mentions_agent(text: &str, agent_name: &str) -> bool {
    let agent = agent_name.trim().to_lowercase();
    !agent.is_empty() && text.to_lowercase().contains(&agent)
}

/// Decides whether a message is aimed at someone other than the agent.
#[derive(Debug, Clone, Copy)]
pub struct AddresseeDetector {
    /// Run the capitalized-word fallback tier.
    heuristic: bool,
}

impl Default for AddresseeDetector {
    fn default() -> Self {
        Self { heuristic: true }
    }
}

impl AddresseeDetector {
    pub fn new(heuristic: bool) -> Self {
        Self { heuristic }
    }

    pub fn is_directed_at_other_user(&self, message: &str, agent_name: &str) -> bool {
        self.detect(message, agent_name).is_some()
    }

    /// Return the third party the message addresses, if any.
    pub fn detect(&self, message: &str, agent_name: &str) -> Option<Addressee> {
        if mentions_agent(message, agent_name) {
            return None;
        }

        let agent = agent_name.trim().to_lowercase();
        let lower = message.to_lowercase();

        for rule in ADDRESS_RULES.iter() {
            let hit = rule
                .candidates(&lower)
                .find(|c| *c != agent && is_name_like(c));
            if let Some(name) = hit {
                debug!(
                    candidate = name,
                    family = %rule.family,
                    pattern = rule.pattern.as_str(),
                    "message appears addressed to someone else"
                );
                return Some(Addressee {
                    name: name.to_string(),
                    family: rule.family,
                    confidence: rule.family.confidence(),
                });
            }
        }

        if self.heuristic {
            return capitalized_addressee(message, &agent);
        }
        None
    }
}

/// Lowest-confidence tier: a capitalized word placed where a name usually
/// sits ("to Kim", "and Kim", "... Kim").
fn capitalized_addressee(message: &str, agent_lower: &str) -> Option<Addressee> {
    let lower = message.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let mut seen: Vec<&str> = Vec::new();

    for caps in CAPITALIZED_WORD.captures_iter(message) {
        let Some(word) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if seen.contains(&word) {
            continue;
        }
        seen.push(word);

        let word_lower = word.to_lowercase();
        if word_lower == agent_lower || !is_name_like(word) {
            continue;
        }

        if lower.ends_with(&word_lower) || follows_connector(&tokens, &word_lower) {
            debug!(candidate = word, "capitalized word in addressee position");
            return Some(Addressee {
                name: word.to_string(),
                family: PatternFamily::CapitalizedName,
                confidence: Confidence::Low,
            });
        }
    }
    None
}

/// `to <name>` or `and <name>`, the name ending at a word boundary.
fn follows_connector(tokens: &[&str], name: &str) -> bool {
    tokens.windows(2).any(|pair| {
        let connector = pair[0].trim_start_matches(|c: char| !is_word_char(c));
        let starts_with_name = pair[1]
            .strip_prefix(name)
            .is_some_and(|rest| !rest.starts_with(is_word_char));
        (connector == "to" || connector == "and") && starts_with_name
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Boolean check with the default detector (all tiers enabled).
pub fn is_directed_at_other_user(message: &str, agent_name: &str) -> bool {
    AddresseeDetector::default().is_directed_at_other_user(message, agent_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(message: &str) -> Option<Addressee> {
        AddresseeDetector::default().detect(message, "Aria")
    }

    #[test]
    fn agent_mention_is_never_elsewhere() {
        assert!(!is_directed_at_other_user("Hey Josh, ask ARIA about it", "Aria"));
        assert!(!is_directed_at_other_user("@aria what's up", "Aria"));
    }

    #[test]
    fn leading_patterns() {
        for msg in [
            "@josh did you eat",
            "hey josh",
            "Hi Josh how are you",
            "Josh, what's the plan",
            "josh: come here",
            "Josh what do you think about chicken",
            "josh can you grab snacks",
            "josh would you",
            "josh tell me",
            "Josh do it",
        ] {
            let hit = detect(msg).unwrap_or_else(|| panic!("expected a hit for {msg:?}"));
            assert_eq!(hit.name, "josh", "{msg}");
            assert_eq!(hit.family, PatternFamily::Leading, "{msg}");
            assert_eq!(hit.confidence, Confidence::High);
        }
    }

    #[test]
    fn mid_sentence_patterns() {
        for (msg, name) in [
            ("i like pizza, what about you sam", "sam"),
            ("mine is blue. how about u kim", "kim"),
            ("i'm in, and you dana", "dana"),
            ("i was asking priya", "priya"),
            ("so tell us morgan", "morgan"),
        ] {
            let hit = detect(msg).unwrap_or_else(|| panic!("expected a hit for {msg:?}"));
            assert_eq!(hit.name, name, "{msg}");
            assert_eq!(hit.family, PatternFamily::MidSentence, "{msg}");
        }
    }

    #[test]
    fn trailing_patterns() {
        let hit = detect("that was great, thank you alex?").unwrap();
        assert_eq!(hit.name, "alex");
        assert_eq!(hit.family, PatternFamily::Trailing);

        let hit = detect("i rolled a six. your turn jordan").unwrap();
        assert_eq!(hit.name, "jordan");
        assert_eq!(hit.family, PatternFamily::Trailing);
    }

    #[test]
    fn capitalized_fallback() {
        let hit = detect("i'll send the notes to Taylor later").unwrap();
        assert_eq!(hit.name, "Taylor");
        assert_eq!(hit.family, PatternFamily::CapitalizedName);
        assert_eq!(hit.confidence, Confidence::Low);

        assert_eq!(detect("see you tomorrow Riley").unwrap().name, "Riley");
        assert_eq!(detect("snacks for me and Devon, thanks").unwrap().name, "Devon");
    }

    #[test]
    fn capitalized_word_elsewhere_is_not_an_address() {
        assert!(detect("Paris was lovely this spring").is_none());
        assert!(detect("Kim is coming over later").is_none());
        assert!(detect("went to Taylor's place earlier").is_some());
    }

    #[test]
    fn capitalized_fallback_can_be_disabled() {
        let detector = AddresseeDetector::new(false);
        assert!(detector.detect("i'll send the notes to Taylor later", "Aria").is_none());
        // explicit patterns still apply
        assert!(detector.detect("hey taylor", "Aria").is_some());
    }

    #[test]
    fn function_words_are_not_names() {
        assert!(detect("what do you think about chicken").is_none());
        assert!(detect("hey guys").is_none());
        assert!(detect("can you help?").is_none());
        assert!(detect("yes, that works").is_none());
    }

    #[test]
    fn plain_chatter_is_not_addressed() {
        assert!(detect("the weather is nice today").is_none());
        assert!(detect("").is_none());
    }

    #[test]
    fn candidate_equal_to_agent_is_skipped() {
        // "aria" never reaches the rules because it is a direct mention, but
        // a multi-word agent name is compared as a whole.
        let detector = AddresseeDetector::default();
        assert!(detector.detect("hey bot", "Bot").is_none());
        assert!(detector.detect("hey aria", "Aria Bot").is_some());
    }

    #[test]
    fn empty_agent_name_does_not_short_circuit() {
        assert!(!mentions_agent("anything", ""));
        assert!(!mentions_agent("anything", "   "));
        assert!(is_directed_at_other_user("hey josh", ""));
    }
}
