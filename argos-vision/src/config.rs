//! Configuration for argos-vision

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Vision stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Fixed resolution frames are normalized to before detection (width, height)
    pub resolution: (u32, u32),
    /// Minimum confidence for a detection to be reported
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression
    pub nms_threshold: f32,
    /// Maximum detections kept per frame
    pub max_detections: usize,
    /// Directory where ONNX models are stored
    pub model_dir: PathBuf,
}

impl Default for VisionConfig {
    fn default() -> Self {
        let model_dir = dirs::home_dir()
            .map(|mut p| {
                p.push(".argos");
                p.push("models");
                p
            })
            .unwrap_or_else(|| PathBuf::from("./models"));

        Self {
            resolution: (640, 480),
            confidence_threshold: 0.5,
            nms_threshold: 0.4,
            max_detections: 100,
            model_dir,
        }
    }
}

impl VisionConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err("resolution must be non-zero".to_string());
        }

        let total_pixels = self
            .resolution
            .0
            .checked_mul(self.resolution.1)
            .ok_or_else(|| "resolution would overflow".to_string())?;
        if total_pixels > 100_000_000 {
            return Err("resolution too large (max 100M pixels)".to_string());
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err("confidence threshold must be within [0, 1]".to_string());
        }

        if !(0.0..=1.0).contains(&self.nms_threshold) {
            return Err("NMS threshold must be within [0, 1]".to_string());
        }

        if self.max_detections == 0 {
            return Err("max detections must be non-zero".to_string());
        }

        Ok(())
    }
}
