use serde::{Deserialize, Serialize};

/// Language-model endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama endpoint
    pub endpoint: String,
    /// Model name to generate with
    pub model: String,
    /// Generation budget (Ollama `num_predict`)
    pub max_tokens: u32,
    pub temperature: f32,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            request_timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("LLM endpoint must not be empty".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err("LLM endpoint must be an http(s) URL".to_string());
        }
        if self.model.is_empty() {
            return Err("LLM model name must not be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be non-zero".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be within [0, 2]".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request timeout must be non-zero".to_string());
        }
        Ok(())
    }
}

/// One generation request against the language-model boundary
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerateRequest {
    pub fn from_config(config: &LlmConfig, prompt: String) -> Self {
        Self {
            prompt,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}
