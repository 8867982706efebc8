//! Video capture source for the monitoring loop

use crate::error::VisionError;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{VideoCapture, CAP_ANY},
};
use tracing::{debug, info};

/// Where frames come from, parsed from a single configuration string.
///
/// An all-digit string is a local device index; anything else is handed to
/// the capture backend as-is (file path or network stream URL). There is no
/// fallback between kinds: a source that fails to open is reported, never
/// silently replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    /// Local capture device index (webcam)
    Device(i32),
    /// File path or network stream URL (e.g. RTSP)
    Uri(String),
}

impl StreamSource {
    /// Parse a source specification string
    pub fn parse(spec: &str) -> Result<Self, VisionError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(VisionError::Config("video source is empty".to_string()));
        }
        match spec.parse::<i32>() {
            Ok(index) if index >= 0 => Ok(StreamSource::Device(index)),
            Ok(_) => Err(VisionError::Config(format!(
                "device index must be non-negative: {}",
                spec
            ))),
            Err(_) => Ok(StreamSource::Uri(spec.to_string())),
        }
    }
}

impl std::fmt::Display for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamSource::Device(index) => write!(f, "device {}", index),
            StreamSource::Uri(uri) => write!(f, "{}", uri),
        }
    }
}

/// Owns the capture handle for its lifetime and produces frames normalized
/// to a fixed resolution. The handle is released on drop, on every exit path.
pub struct FrameSource {
    capture: VideoCapture,
    source: StreamSource,
    resolution: (u32, u32),
}

impl FrameSource {
    /// Open a capture source. Failure here is fatal to the monitoring loop.
    pub fn open(spec: &str, resolution: (u32, u32)) -> Result<Self, VisionError> {
        let source = StreamSource::parse(spec)?;

        let capture = match &source {
            StreamSource::Device(index) => VideoCapture::new(*index, CAP_ANY),
            StreamSource::Uri(uri) => VideoCapture::from_file(uri, CAP_ANY),
        }
        .map_err(|e| VisionError::StreamUnavailable(format!("{}: {}", source, e)))?;

        let opened = capture
            .is_opened()
            .map_err(|e| VisionError::StreamUnavailable(format!("{}: {}", source, e)))?;
        if !opened {
            return Err(VisionError::StreamUnavailable(format!(
                "{} failed to open",
                source
            )));
        }

        info!(
            "Opened video source {} (frames normalized to {}x{})",
            source, resolution.0, resolution.1
        );

        Ok(Self {
            capture,
            source,
            resolution,
        })
    }

    /// Pull the next frame, resized to the configured resolution.
    ///
    /// `Ok(None)` signals end of stream; `Err(StreamRead)` a mid-stream read
    /// failure. Both terminate the monitoring loop.
    pub fn next_frame(&mut self) -> Result<Option<Mat>, VisionError> {
        let mut raw = Mat::default();
        let grabbed = self
            .capture
            .read(&mut raw)
            .map_err(|e| VisionError::StreamRead(format!("{}: {}", self.source, e)))?;

        if !grabbed || raw.cols() <= 0 || raw.rows() <= 0 {
            debug!("End of stream on {}", self.source);
            return Ok(None);
        }

        let mut resized = Mat::default();
        imgproc::resize(
            &raw,
            &mut resized,
            opencv::core::Size::new(self.resolution.0 as i32, self.resolution.1 as i32),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| VisionError::Processing(format!("failed to resize frame: {}", e)))?;

        Ok(Some(resized))
    }

    /// The parsed source this handle was opened from
    pub fn source(&self) -> &StreamSource {
        &self.source
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            debug!("Capture release failed for {}: {}", self.source, e);
        } else {
            info!("Released video source {}", self.source);
        }
    }
}
