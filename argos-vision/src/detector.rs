//! Detection stage with the fail-closed policy

use crate::error::VisionError;
use crate::models::yolo::{Detection, YoloModel};
use opencv::prelude::Mat;
use std::sync::Arc;
use tracing::{debug, warn};

/// Seam for the external detection model, so the loop controller and tests
/// can run against a stub.
pub trait Detector: Send + Sync {
    fn detect(&self, frame: &Mat) -> Result<Vec<Detection>, VisionError>;
}

impl Detector for YoloModel {
    fn detect(&self, frame: &Mat) -> Result<Vec<Detection>, VisionError> {
        YoloModel::detect(self, frame)
    }
}

/// Wraps a detector and fails closed: a failed invocation yields an empty
/// detection list. Detection is best-effort per frame; a single bad frame
/// never halts the monitoring loop.
pub struct DetectionStage {
    detector: Arc<dyn Detector>,
}

impl DetectionStage {
    pub fn new(detector: Arc<dyn Detector>) -> Self {
        Self { detector }
    }

    /// Detect objects in a frame, absorbing detector failures
    pub fn detect(&self, frame: &Mat) -> Vec<Detection> {
        match self.detector.detect(frame) {
            Ok(detections) => {
                debug!("Detected {} objects", detections.len());
                detections
            }
            Err(e) => {
                warn!("Detection failed, treating frame as empty: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn detect(&self, _frame: &Mat) -> Result<Vec<Detection>, VisionError> {
            Err(VisionError::Detector("inference backend down".to_string()))
        }
    }

    struct FixedDetector(Vec<Detection>);

    impl Detector for FixedDetector {
        fn detect(&self, _frame: &Mat) -> Result<Vec<Detection>, VisionError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_stage_absorbs_detector_failure() {
        let stage = DetectionStage::new(Arc::new(FailingDetector));
        let frame = Mat::default();
        assert!(stage.detect(&frame).is_empty());
    }

    #[test]
    fn test_stage_passes_detections_through() {
        let dets = vec![Detection::with_class_id(0, 0.9, (0.0, 0.0, 5.0, 5.0))];
        let stage = DetectionStage::new(Arc::new(FixedDetector(dets)));
        let frame = Mat::default();
        let out = stage.detect(&frame);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class_name, "person");
    }
}
