//! Detection model loading and inference

pub mod manager;
pub mod yolo;

pub use manager::ModelManager;
pub use yolo::{Detection, YoloModel};
