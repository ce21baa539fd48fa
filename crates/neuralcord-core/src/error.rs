use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeuralcordError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NeuralcordError {
    /// Short, stable error code for log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            NeuralcordError::Config(_) => "CONFIG_ERROR",
            NeuralcordError::Serialization(_) => "SERIALIZATION_ERROR",
            NeuralcordError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, NeuralcordError>;
