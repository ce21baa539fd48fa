use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use neuralcord_core::{ContextWindow, Decision, FilterConfig};

use crate::addressee::{mentions_agent, AddresseeDetector};
use crate::context::{context_digest, flat_transcript, narrative_summary};
use crate::ollama::OllamaClassifier;
use crate::parse::{parse_reply, Verdict};
use crate::prompt::build_prompt;
use crate::provider::{ClassifierClient, CompletionRequest};

/// Decides whether the character should join the conversation.
///
/// Cheap checks run first (addressee detection, direct mention); only
/// ambiguous windows reach the classifier. Shared across handlers via `Arc`.
pub struct FilterGate {
    client: Box<dyn ClassifierClient>,
    config: FilterConfig,
    detector: AddresseeDetector,
    /// Swapped whole by `set_model`; each evaluation reads it once.
    model: RwLock<String>,
}

impl FilterGate {
    pub fn new(client: Box<dyn ClassifierClient>, config: FilterConfig) -> Self {
        let detector = AddresseeDetector::new(config.address_heuristic);
        let model = RwLock::new(config.model.clone());
        info!(model = %config.model, client = client.name(), "filter gate initialized");
        Self {
            client,
            config,
            detector,
            model,
        }
    }

    /// Gate talking to the Ollama service at `config.endpoint`.
    pub fn with_ollama(config: FilterConfig) -> Self {
        let client = OllamaClassifier::new(Some(config.endpoint.clone()));
        Self::new(Box::new(client), config)
    }

    /// Startup configuration. `model` here is the initial value only; read
    /// [`FilterGate::model`] for the one in use after a swap.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Current classifier model name.
    pub async fn model(&self) -> String {
        self.model.read().await.clone()
    }

    /// Switch the classifier model after confirming the service has it.
    /// Returns `false` (and keeps the old model) when the probe fails.
    pub async fn set_model(&self, new_model: &str) -> bool {
        let new_model = new_model.trim();
        if new_model.is_empty() {
            warn!("refusing to switch to an empty model name");
            return false;
        }

        let current = self.model().await;
        info!(from = %current, to = %new_model, "attempting classifier model change");

        match self.client.check_model_available(new_model).await {
            Ok(true) => {
                let mut guard = self.model.write().await;
                *guard = new_model.to_string();
                info!(model = %new_model, "classifier model changed");
                true
            }
            Ok(false) => {
                warn!(model = %new_model, "model not installed on classifier service");
                false
            }
            Err(e) => {
                warn!(model = %new_model, error = %e, "could not verify classifier model");
                false
            }
        }
    }

    /// Evaluate the window and decide whether the agent should reply.
    ///
    /// Never fails: classifier errors degrade to `Decision::Ignore(None)`.
    pub async fn evaluate(&self, window: &ContextWindow, agent_name: &str) -> Decision {
        let Some(latest) = window.latest() else {
            info!("empty context received, ignoring");
            return Decision::Ignore(None);
        };

        info!(messages = window.len(), "evaluating conversation window");
        let latest_content = latest.content.trim();

        if let Some(addressee) = self.detector.detect(latest_content, agent_name) {
            info!(
                addressee = %addressee.name,
                family = %addressee.family,
                "message directed at another user, ignoring"
            );
            return Decision::Ignore(Some(format!(
                "message addressed to {}",
                addressee.name
            )));
        }

        if mentions_agent(latest_content, agent_name) {
            info!(author = %latest.author, "direct mention of character, responding");
            return Decision::Respond(self.compose_payload(window, &latest.author, latest_content));
        }

        let model = self.model().await;
        let transcript = flat_transcript(window, agent_name, &self.config);
        debug!(%transcript, "formatted conversation");
        let prompt = build_prompt(&transcript, agent_name, &self.config.tags);

        let request = CompletionRequest {
            model: model.clone(),
            prompt,
        };

        let raw = match self.client.complete(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    model = %model,
                    error = %e,
                    unavailable = e.is_unavailable(),
                    "classifier call failed, ignoring"
                );
                return Decision::Ignore(None);
            }
        };
        debug!(chars = raw.chars().count(), reply = %raw, "classifier reply");

        let parsed = parse_reply(&raw, &self.config.tags);
        match parsed.verdict {
            Verdict::Respond => {
                info!(model = %model, "classifier decision: respond");
                if let Some(r) = &parsed.rationale {
                    debug!(rationale = %r, "respond rationale");
                }
                Decision::Respond(self.compose_payload(window, &latest.author, latest_content))
            }
            Verdict::Inappropriate => {
                info!(model = %model, "classifier decision: inappropriate");
                Decision::Inappropriate(parsed.rationale)
            }
            Verdict::Ignore => {
                info!(model = %model, "classifier decision: ignore");
                Decision::Ignore(parsed.rationale)
            }
        }
    }

    /// `*Context of the current conversation:\n<digest>*\n\n<author>: <content>`
    fn compose_payload(&self, window: &ContextWindow, author: &str, content: &str) -> String {
        let digest = context_digest(window, &self.config);
        debug!(
            chars = digest.chars().count(),
            narrative = %narrative_summary(window, &self.config),
            "built context digest"
        );
        format!("*Context of the current conversation:\n{digest}*\n\n{author}: {content}")
    }
}
