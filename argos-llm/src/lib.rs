//! argos-llm: language-model access for anomaly reasoning
//!
//! A thin provider abstraction over a local Ollama endpoint plus the prompt
//! template and reasoner used by the monitoring loop.

pub mod config;
pub mod error;
pub mod providers;
pub mod reasoning;

pub use config::{GenerateRequest, LlmConfig};
pub use error::{LlmError, Result};
pub use providers::ollama::OllamaProvider;
pub use providers::Provider;
pub use reasoning::{AnomalyReasoner, PromptTemplate, Verdict};
