use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{NeuralcordError, Result};

pub const DEFAULT_MAX_CONTEXT_MESSAGES: usize = 15;
pub const DEFAULT_MAX_CONTEXT_LENGTH: usize = 1000; // rendered digest budget (chars)
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 200; // per-message budget (chars)
pub const DEFAULT_MODEL: &str = "mistral";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api";

/// Smallest budget that still leaves room for the "..." marker.
const MIN_BUDGET_CHARS: usize = 4;

/// Top-level config (neuralcord.toml + NEURALCORD_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeuralcordConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the conversation filter gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Messages considered from the end of the window.
    pub max_context_messages: usize,
    /// Character budget of the context digest handed to the agent.
    pub max_context_length: usize,
    /// Per-message truncation budget inside the digest.
    pub max_message_length: usize,
    pub tags: ReplyTags,
    /// Classifier model name. Hot-swappable at runtime via the gate.
    pub model: String,
    /// Completion service base URL (Ollama `/api` root).
    pub endpoint: String,
    /// Enables the capitalized-word fallback in addressee detection.
    pub address_heuristic: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_context_messages: DEFAULT_MAX_CONTEXT_MESSAGES,
            max_context_length: DEFAULT_MAX_CONTEXT_LENGTH,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            tags: ReplyTags::default(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            address_heuristic: true,
        }
    }
}

impl FilterConfig {
    /// Reject settings the renderers and parser cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_context_messages == 0 {
            return Err(NeuralcordError::Config(
                "filter.max_context_messages must be at least 1".to_string(),
            ));
        }
        if self.max_context_length < MIN_BUDGET_CHARS {
            return Err(NeuralcordError::Config(format!(
                "filter.max_context_length must be at least {MIN_BUDGET_CHARS}"
            )));
        }
        if self.max_message_length < MIN_BUDGET_CHARS {
            return Err(NeuralcordError::Config(format!(
                "filter.max_message_length must be at least {MIN_BUDGET_CHARS}"
            )));
        }
        if self.model.trim().is_empty() {
            return Err(NeuralcordError::Config("filter.model is empty".to_string()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(NeuralcordError::Config("filter.endpoint is empty".to_string()));
        }
        self.tags.validate()
    }
}

/// Literal markers shared by the prompt template and the reply parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTags {
    pub respond: String,
    pub ignore: String,
    pub inappropriate: String,
    pub summary: String,
}

impl Default for ReplyTags {
    fn default() -> Self {
        Self {
            respond: "[RESPOND]".to_string(),
            ignore: "[IGNORE]".to_string(),
            inappropriate: "INAPPROPRIATE".to_string(),
            summary: "[SUMMARY]".to_string(),
        }
    }
}

impl ReplyTags {
    fn validate(&self) -> Result<()> {
        let all = [
            ("respond", &self.respond),
            ("ignore", &self.ignore),
            ("inappropriate", &self.inappropriate),
            ("summary", &self.summary),
        ];
        for (i, (name, tag)) in all.iter().enumerate() {
            if tag.trim().is_empty() || tag.trim() != tag.as_str() || tag.contains('\n') {
                return Err(NeuralcordError::Config(format!(
                    "filter.tags.{name} must be a non-empty single-line literal"
                )));
            }
            if let Some((other, _)) = all[..i].iter().find(|(_, t)| t == tag) {
                return Err(NeuralcordError::Config(format!(
                    "filter.tags.{name} duplicates filter.tags.{other}"
                )));
            }
        }
        Ok(())
    }
}

/// Chat-side behaviour owned by the caller of the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Display name of the character the bot speaks as.
    pub agent_name: String,
    /// Seconds between two replies in the same channel.
    pub cooldown_secs: u64,
    /// Lower bound accepted when a cooldown is changed at runtime.
    pub min_cooldown_secs: u64,
    /// Channel IDs the bot listens in. `"*"` allows every channel.
    pub allowed_channels: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            agent_name: "Character".to_string(),
            cooldown_secs: 1,
            min_cooldown_secs: 1,
            allowed_channels: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "neuralcord=info,neuralcord_filter=info".to_string(),
        }
    }
}

impl NeuralcordConfig {
    /// Load config from a TOML file with NEURALCORD_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.neuralcord/neuralcord.toml
    ///
    /// A missing file yields the defaults. `OLLAMA_API_URL`, when set, wins
    /// over `filter.endpoint`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        let config: NeuralcordConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("NEURALCORD_").split("__"))
            .merge(
                Env::raw()
                    .only(&["OLLAMA_API_URL"])
                    .map(|_| "filter.endpoint".into()),
            )
            .extract()
            .map_err(|e| NeuralcordError::Config(e.to_string()))?;

        config.filter.validate()?;
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.neuralcord/neuralcord.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = FilterConfig::default();
        assert_eq!(cfg.max_context_messages, 15);
        assert_eq!(cfg.max_context_length, 1000);
        assert_eq!(cfg.max_message_length, 200);
        assert_eq!(cfg.model, "mistral");
        assert_eq!(cfg.tags.respond, "[RESPOND]");
        assert_eq!(cfg.tags.inappropriate, "INAPPROPRIATE");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_tiny_budgets() {
        let cfg = FilterConfig {
            max_context_length: 3,
            ..FilterConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = FilterConfig {
            max_message_length: 0,
            ..FilterConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = FilterConfig {
            max_context_messages: 0,
            ..FilterConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_tags() {
        let mut cfg = FilterConfig::default();
        cfg.tags.ignore = cfg.tags.respond.clone();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("duplicates"));
    }

    #[test]
    fn validate_rejects_multiline_tag() {
        let mut cfg = FilterConfig::default();
        cfg.tags.summary = "[SUM\nMARY]".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_reads_toml_and_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("neuralcord.toml");
        fs::write(
            &path,
            "[filter]\nmodel = \"llama3\"\nmax_context_messages = 8\n\n[bot]\nagent_name = \"Aria\"\n",
        )
        .expect("write");

        let cfg = NeuralcordConfig::load(path.to_str()).expect("load");
        assert_eq!(cfg.filter.model, "llama3");
        assert_eq!(cfg.filter.max_context_messages, 8);
        assert_eq!(cfg.filter.max_message_length, DEFAULT_MAX_MESSAGE_LENGTH);
        assert_eq!(cfg.bot.agent_name, "Aria");
        assert_eq!(cfg.bot.allowed_channels, vec!["*".to_string()]);
    }

    #[test]
    fn load_surfaces_invalid_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("neuralcord.toml");
        fs::write(&path, "[filter]\nmax_context_length = 2\n").expect("write");

        let err = NeuralcordConfig::load(path.to_str()).unwrap_err();
        assert!(matches!(err, NeuralcordError::Config(_)));
    }
}
