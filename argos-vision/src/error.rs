//! Error types for argos-vision

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    /// The capture source could not be opened. Fatal: the loop never starts.
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),

    /// A mid-stream frame read failed. Fatal: the loop terminates.
    #[error("stream read failed: {0}")]
    StreamRead(String),

    /// A detector invocation failed. Absorbed: the frame counts as empty.
    #[error("detector error: {0}")]
    Detector(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ONNX Runtime error: {0}")]
    Ort(String),

    #[error("OpenCV error: {0}")]
    OpenCv(String),
}

impl From<opencv::Error> for VisionError {
    fn from(err: opencv::Error) -> Self {
        VisionError::OpenCv(err.message)
    }
}
