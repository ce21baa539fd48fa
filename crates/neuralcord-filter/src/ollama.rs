use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use neuralcord_core::config::DEFAULT_ENDPOINT;

use crate::provider::{ClassifierClient, ClassifierError, CompletionRequest};

/// Classifier backed by an Ollama server's `/api/generate` endpoint.
pub struct OllamaClassifier {
    client: reqwest::Client,
    /// API root, e.g. `http://localhost:11434/api`.
    endpoint: String,
}

impl OllamaClassifier {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.endpoint)
    }

    /// The tag listing lives under the server root, not the API root.
    fn tags_url(&self) -> String {
        let root = self
            .endpoint
            .strip_suffix("/api")
            .unwrap_or(&self.endpoint);
        format!("{}/api/tags", root)
    }
}

#[async_trait]
impl ClassifierClient for OllamaClassifier {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, req: &CompletionRequest) -> Result<String, ClassifierError> {
        let url = self.generate_url();
        let body = serde_json::json!({
            "model": req.model,
            "prompt": req.prompt,
            "stream": false,
        });

        debug!(model = %req.model, url = %url, "sending prompt to Ollama");

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Ollama generate error");
            return Err(ClassifierError::Api {
                status,
                message: text,
            });
        }

        let api_resp: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        Ok(api_resp.response)
    }

    async fn list_models(&self) -> Result<Vec<String>, ClassifierError> {
        let url = self.tags_url();
        debug!(url = %url, "listing Ollama models");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(map_transport)?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Ollama tags error");
            return Err(ClassifierError::Api {
                status,
                message: text,
            });
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// Connection-level failures mean the service is unreachable.
fn map_transport(e: reqwest::Error) -> ClassifierError {
    if e.is_connect() || e.is_timeout() {
        ClassifierError::Unavailable(e.to_string())
    } else {
        ClassifierError::Http(e)
    }
}

// Ollama wire types, deserialization only

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}
