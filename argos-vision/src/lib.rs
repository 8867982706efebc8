//! argos-vision: capture and detection stages of the Argos monitoring pipeline
//!
//! Wraps a video capture source, runs YOLO object detection on each frame,
//! and reduces the detections of a frame to a short textual summary for the
//! window accumulator downstream.

pub mod config;
pub mod detector;
pub mod display;
pub mod error;
pub mod models;
pub mod overlay;
pub mod source;
pub mod summary;
mod utils;

pub use config::VisionConfig;
pub use detector::{DetectionStage, Detector};
pub use error::VisionError;
pub use models::yolo::{Detection, YoloModel};
pub use source::{FrameSource, StreamSource};
pub use summary::summarize;
