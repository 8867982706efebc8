//! Anomaly reasoning over flushed detection windows

use crate::config::{GenerateRequest, LlmConfig};
use crate::error::{LlmError, Result};
use crate::providers::Provider;
use std::sync::Arc;
use tracing::debug;

/// Placeholder the observations text is substituted into
pub const OBSERVATIONS_SLOT: &str = "{observations}";

/// Default prompt wording. The phrasing directly steers model behavior, so
/// it is configuration, not protocol.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Observations from a CCTV feed: {observations}. \
Is there any unusual or concerning activity happening? \
Answer yes or no with a brief explanation.";

/// Configurable prompt wording with an `{observations}` slot
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: &str) -> Result<Self> {
        if !template.contains(OBSERVATIONS_SLOT) {
            return Err(LlmError::Template(format!(
                "template must contain the {} slot",
                OBSERVATIONS_SLOT
            )));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    /// Substitute the observations text into the template
    pub fn render(&self, observations: &str) -> String {
        self.template.replace(OBSERVATIONS_SLOT, observations)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

/// The language model's textual judgment about one flushed window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub text: String,
}

/// Asks the language model whether a window of accumulated detections
/// describes unusual activity.
pub struct AnomalyReasoner {
    provider: Arc<dyn Provider>,
    template: PromptTemplate,
    config: LlmConfig,
}

impl AnomalyReasoner {
    pub fn new(provider: Arc<dyn Provider>, template: PromptTemplate, config: LlmConfig) -> Self {
        Self {
            provider,
            template,
            config,
        }
    }

    /// Build the prompt for one window and ask for a verdict.
    ///
    /// All failures come back as typed `LlmError` values; the caller decides
    /// that they are non-fatal to the monitoring loop.
    pub async fn assess(&self, observations: &str) -> Result<Verdict> {
        let prompt = self.template.render(observations);
        debug!(
            provider = self.provider.name(),
            model = %self.config.model,
            "Requesting anomaly verdict"
        );

        let request = GenerateRequest::from_config(&self.config, prompt);
        let text = self.provider.generate(request).await?;
        Ok(Verdict {
            text: text.trim().to_string(),
        })
    }
}
