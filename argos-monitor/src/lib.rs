//! argos-monitor: the monitoring loop
//!
//! Ties the capture and detection stages to the window accumulator and the
//! anomaly reasoner, one frame per iteration until end of stream or a stop
//! signal.

pub mod config;
pub mod controller;
pub mod window;

pub use config::MonitorConfig;
pub use controller::{FrameStream, MonitorLoop, MonitorStats, Preview};
pub use window::DetectionWindow;
