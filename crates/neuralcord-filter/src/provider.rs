use async_trait::async_trait;

/// A single non-streaming completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
}

/// Common interface for the text-completion service behind the filter.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Client name for logging and error messages.
    fn name(&self) -> &str;

    /// Send one prompt, wait for the full completion text.
    async fn complete(&self, req: &CompletionRequest) -> Result<String, ClassifierError>;

    /// Names of the models the service can run.
    async fn list_models(&self) -> Result<Vec<String>, ClassifierError>;

    /// Whether `model` is installed on the service.
    /// An untagged name also matches its `:latest` variant.
    async fn check_model_available(&self, model: &str) -> Result<bool, ClassifierError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| model_matches(m, model)))
    }
}

fn model_matches(listed: &str, wanted: &str) -> bool {
    listed == wanted || listed.strip_suffix(":latest") == Some(wanted)
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
}

impl ClassifierError {
    /// Transport failures and non-success statuses: the service could not
    /// produce an answer at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ClassifierError::Unavailable(_) | ClassifierError::Api { .. } | ClassifierError::Http(_)
        )
    }
}
