//! Interactive preview window for the operator

use crate::error::VisionError;
use crate::models::yolo::Detection;
use crate::overlay::draw_detections;
use opencv::highgui;
use opencv::prelude::*;
use tracing::{debug, info};

const QUIT_KEY: i32 = 'q' as i32;

/// The "CCTV Monitor" window showing the current frame with detection
/// overlays. Interactive quit via the `q` key.
pub struct MonitorDisplay {
    window_name: String,
}

impl MonitorDisplay {
    pub fn new(window_name: &str) -> Result<Self, VisionError> {
        highgui::named_window(window_name, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| VisionError::OpenCv(format!("failed to create window: {}", e)))?;
        info!("Preview window \"{}\" opened", window_name);
        Ok(Self {
            window_name: window_name.to_string(),
        })
    }

    /// Render a frame with its detections overlayed
    pub fn show(&self, frame: &Mat, detections: &[Detection]) -> Result<(), VisionError> {
        let mut annotated = frame
            .try_clone()
            .map_err(|e| VisionError::OpenCv(format!("failed to clone frame: {}", e)))?;
        draw_detections(&mut annotated, detections)?;
        highgui::imshow(&self.window_name, &annotated)
            .map_err(|e| VisionError::OpenCv(format!("failed to show frame: {}", e)))?;
        Ok(())
    }

    /// Pump the UI event loop and report whether the operator pressed quit
    pub fn poll_quit(&self) -> Result<bool, VisionError> {
        let key = highgui::wait_key(1)
            .map_err(|e| VisionError::OpenCv(format!("failed to poll keyboard: {}", e)))?;
        if key == QUIT_KEY {
            info!("Quit key pressed");
            return Ok(true);
        }
        Ok(false)
    }
}

impl Drop for MonitorDisplay {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.window_name) {
            debug!("Failed to destroy window \"{}\": {}", self.window_name, e);
        }
    }
}
