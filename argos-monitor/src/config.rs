//! Configuration for the monitoring binary

use argos_llm::{LlmConfig, PromptTemplate};
use argos_vision::VisionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level monitor configuration, TOML-loadable with full defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Video source: device index ("0"), file path, or stream URL
    pub source: String,
    /// Seconds between window flushes / anomaly assessments
    pub interval_secs: u64,
    /// Show the operator preview window
    pub display: bool,
    /// Prompt wording; must contain the `{observations}` slot
    pub prompt_template: String,
    pub vision: VisionConfig,
    pub llm: LlmConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            source: "0".to_string(),
            interval_secs: 10,
            display: true,
            prompt_template: argos_llm::reasoning::DEFAULT_PROMPT_TEMPLATE.to_string(),
            vision: VisionConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: MonitorConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }

    /// Validate the whole configuration tree
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::Invalid("video source is empty".to_string()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "interval must be at least one second".to_string(),
            ));
        }
        PromptTemplate::new(&self.prompt_template)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.vision.validate().map_err(ConfigError::Invalid)?;
        self.llm.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = MonitorConfig::default();
        assert_eq!(config.source, "0");
        assert_eq!(config.interval_secs, 10);
        assert!(config.display);
        assert!(config.prompt_template.contains("{observations}"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "source = \"rtsp://camera.local/feed\"\ninterval_secs = 30\n\n[llm]\nmodel = \"mistral\"\n"
        )
        .unwrap();

        let config = MonitorConfig::load(file.path()).unwrap();
        assert_eq!(config.source, "rtsp://camera.local/feed");
        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.llm.model, "mistral");
        // Untouched sections keep their defaults
        assert_eq!(config.llm.endpoint, "http://localhost:11434");
        assert_eq!(config.vision.resolution, (640, 480));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(MonitorConfig::load(Path::new("/nonexistent/argos.toml")).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = MonitorConfig::default();
        config.interval_secs = 0;
        assert!(config.validate().is_err());

        config = MonitorConfig::default();
        config.source = "  ".to_string();
        assert!(config.validate().is_err());

        config = MonitorConfig::default();
        config.prompt_template = "no slot".to_string();
        assert!(config.validate().is_err());
    }
}
