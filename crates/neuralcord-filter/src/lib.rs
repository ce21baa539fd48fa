//! Conversation filter: decides whether the character should join a chat
//! and, if so, what text to hand it.

pub mod addressee;
pub mod context;
pub mod gate;
pub mod ollama;
pub mod parse;
pub mod prompt;
pub mod provider;

pub use addressee::{Addressee, AddresseeDetector, Confidence, PatternFamily};
pub use gate::FilterGate;
pub use ollama::OllamaClassifier;
pub use parse::{ParsedReply, Verdict};
pub use provider::{ClassifierClient, ClassifierError, CompletionRequest};
