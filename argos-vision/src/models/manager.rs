//! Model manager with auto-download functionality

use crate::config::VisionConfig;
use crate::error::VisionError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Model URL and checksum. The checksum can be pinned once a release is
/// frozen; empty skips verification.
const YOLO_V8_URL: &str =
    "https://github.com/ultralytics/assets/releases/download/v8.2.0/yolov8n.onnx";
const YOLO_V8_CHECKSUM: &str = "";

const MAX_MODEL_SIZE: usize = 2_000_000_000; // 2GB
const DOWNLOAD_TIMEOUT_SECS: u64 = 3600;

/// Manages the on-disk model directory and downloads missing models
pub struct ModelManager {
    config: Arc<VisionConfig>,
}

impl ModelManager {
    pub fn new(config: Arc<VisionConfig>) -> Self {
        Self { config }
    }

    /// Ensure the model directory exists
    pub fn ensure_model_dir(&self) -> Result<PathBuf, VisionError> {
        let model_dir = &self.config.model_dir;
        if !model_dir.exists() {
            fs::create_dir_all(model_dir)?;
            info!("Created model directory: {:?}", model_dir);
        }
        Ok(model_dir.clone())
    }

    /// Download a model if not already present
    pub async fn ensure_model(
        &self,
        model_name: &str,
        url: &str,
        checksum: &str,
    ) -> Result<PathBuf, VisionError> {
        if model_name.is_empty() || model_name.len() > 255 {
            return Err(VisionError::Model("invalid model name".to_string()));
        }

        // Reject path traversal in model names
        if model_name.contains("..") || model_name.contains('/') || model_name.contains('\\') {
            return Err(VisionError::Model(
                "model name contains invalid characters".to_string(),
            ));
        }

        if url.is_empty() || url.len() > 2048 {
            return Err(VisionError::Model("invalid model URL".to_string()));
        }

        if !url.starts_with("https://") {
            return Err(VisionError::Model(
                "only HTTPS URLs are allowed for model downloads".to_string(),
            ));
        }

        self.ensure_model_dir()?;
        let model_path = self.config.model_dir.join(model_name);

        if model_path.exists() {
            info!("Model {} already exists at {:?}", model_name, model_path);
            return Ok(model_path);
        }

        info!("Downloading model {} from {}", model_name, url);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()?;

        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(VisionError::Model(format!(
                "failed to download model: HTTP {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_MODEL_SIZE as u64 {
                return Err(VisionError::Model(format!(
                    "model too large: {} bytes (max {})",
                    content_length, MAX_MODEL_SIZE
                )));
            }
        }

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_MODEL_SIZE {
            return Err(VisionError::Model(format!(
                "downloaded model too large: {} bytes (max {})",
                bytes.len(),
                MAX_MODEL_SIZE
            )));
        }
        if bytes.len() < 1024 {
            return Err(VisionError::Model(
                "downloaded file too small, likely corrupted".to_string(),
            ));
        }

        if !checksum.is_empty() {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            let computed = hex::encode(hasher.finalize());
            if computed != checksum {
                return Err(VisionError::Model(format!(
                    "checksum mismatch for model {}: expected {}, got {}",
                    model_name, checksum, computed
                )));
            }
            info!("Verified checksum for model {}", model_name);
        } else {
            info!(
                "Downloaded {} bytes for model {} (checksum verification skipped)",
                bytes.len(),
                model_name
            );
        }

        // Write to a temp file first, then rename, so a partial download
        // never masquerades as a valid model.
        let temp_path = model_path.with_extension("tmp");
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, &model_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            VisionError::Io(e)
        })?;

        info!("Model {} saved to {:?}", model_name, model_path);
        Ok(model_path)
    }

    /// Get the YOLO model path, downloading it if needed
    pub async fn get_yolo_model(&self) -> Result<PathBuf, VisionError> {
        self.ensure_model("yolov8n.onnx", YOLO_V8_URL, YOLO_V8_CHECKSUM)
            .await
    }
}
