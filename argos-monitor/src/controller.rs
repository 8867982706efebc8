//! The monitoring loop controller

use crate::window::DetectionWindow;
use argos_llm::AnomalyReasoner;
use argos_vision::display::MonitorDisplay;
use argos_vision::{summarize, Detection, DetectionStage, FrameSource, VisionError};
use opencv::prelude::Mat;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Seam for the frame producer so scenario tests can drive the loop with a
/// scripted stream.
pub trait FrameStream {
    /// `Ok(None)` is end of stream; an error is a fatal mid-stream failure.
    fn next_frame(&mut self) -> Result<Option<Mat>, VisionError>;
}

impl FrameStream for FrameSource {
    fn next_frame(&mut self) -> Result<Option<Mat>, VisionError> {
        FrameSource::next_frame(self)
    }
}

/// Seam for the operator preview, so display failure handling is testable
/// without a real window.
pub trait Preview {
    fn show(&self, frame: &Mat, detections: &[Detection]) -> Result<(), VisionError>;
    /// `Ok(true)` means the operator pressed quit
    fn poll_quit(&self) -> Result<bool, VisionError>;
}

impl Preview for MonitorDisplay {
    fn show(&self, frame: &Mat, detections: &[Detection]) -> Result<(), VisionError> {
        MonitorDisplay::show(self, frame, detections)
    }

    fn poll_quit(&self) -> Result<bool, VisionError> {
        MonitorDisplay::poll_quit(self)
    }
}

/// Counters reported when the loop terminates
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorStats {
    pub frames_processed: u64,
    pub windows_flushed: u64,
    pub verdicts_logged: u64,
    pub reasoner_failures: u64,
}

/// Drives one iteration per available frame: pull, detect, summarize,
/// accumulate, flush-and-reason when the window interval elapses, render,
/// check the stop signal.
pub struct MonitorLoop<S: FrameStream> {
    stream: S,
    detection: DetectionStage,
    reasoner: AnomalyReasoner,
    window: DetectionWindow,
    display: Option<Box<dyn Preview>>,
    stop: Arc<AtomicBool>,
}

impl<S: FrameStream> MonitorLoop<S> {
    pub fn new(
        stream: S,
        detection: DetectionStage,
        reasoner: AnomalyReasoner,
        window: DetectionWindow,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            stream,
            detection,
            reasoner,
            window,
            display: None,
            stop,
        }
    }

    /// Attach the operator preview window
    pub fn with_display(mut self, display: impl Preview + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Run until end of stream, a fatal read failure, or the stop signal.
    ///
    /// Detector and reasoner failures are absorbed; only stream failures
    /// unwind the loop.
    pub async fn run(mut self) -> Result<MonitorStats, VisionError> {
        info!("Monitoring loop started");
        let mut stats = MonitorStats::default();

        loop {
            // No new frame pulls after the stop signal is observed
            if self.stop.load(Ordering::Relaxed) {
                info!("Stop signal observed, terminating");
                break;
            }

            let frame = match self.stream.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("End of stream after {} frames", stats.frames_processed);
                    break;
                }
                Err(e) => {
                    error!("Fatal stream failure: {}", e);
                    return Err(e);
                }
            };
            stats.frames_processed += 1;

            let detections = self.detection.detect(&frame);
            if let Some(summary) = summarize(&detections) {
                debug!("{}", summary);
                self.window.push(summary);
            }

            if let Some(text) = self.window.try_flush(Instant::now()) {
                stats.windows_flushed += 1;
                // Synchronous round trip; the window is already cleared, so
                // a failure here costs one verdict, never the loop.
                match self.reasoner.assess(&text).await {
                    Ok(verdict) => {
                        stats.verdicts_logged += 1;
                        info!(window = stats.windows_flushed, "Verdict: {}", verdict.text);
                    }
                    Err(e) => {
                        stats.reasoner_failures += 1;
                        warn!(window = stats.windows_flushed, "Anomaly reasoning failed: {}", e);
                    }
                }
            }

            // Display failures are absorbed like detector failures: drop the
            // window and keep monitoring headless.
            if let Some(display) = &self.display {
                let polled = display
                    .show(&frame, &detections)
                    .and_then(|_| display.poll_quit());
                match polled {
                    Ok(true) => self.stop.store(true, Ordering::Relaxed),
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Preview window failed, continuing headless: {}", e);
                        self.display = None;
                    }
                }
            }
        }

        info!(
            frames = stats.frames_processed,
            windows = stats.windows_flushed,
            verdicts = stats.verdicts_logged,
            "Monitoring loop finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argos_llm::{AnomalyReasoner, GenerateRequest, LlmConfig, PromptTemplate, Provider};
    use argos_vision::{Detection, Detector};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedStream {
        frames: VecDeque<Result<Option<Mat>, VisionError>>,
    }

    impl ScriptedStream {
        fn of_empty_frames(count: usize) -> Self {
            let mut frames = VecDeque::new();
            for _ in 0..count {
                frames.push_back(Ok(Some(Mat::default())));
            }
            Self { frames }
        }
    }

    impl FrameStream for ScriptedStream {
        fn next_frame(&mut self) -> Result<Option<Mat>, VisionError> {
            self.frames.pop_front().unwrap_or(Ok(None))
        }
    }

    struct ScriptedDetector {
        per_frame: Mutex<VecDeque<Vec<Detection>>>,
    }

    impl Detector for ScriptedDetector {
        fn detect(&self, _frame: &Mat) -> Result<Vec<Detection>, VisionError> {
            Ok(self.per_frame.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct RecordingProvider {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn generate(&self, request: GenerateRequest) -> argos_llm::Result<String> {
            self.prompts.lock().unwrap().push(request.prompt);
            Ok("no unusual activity".to_string())
        }
    }

    fn reasoner_with(prompts: Arc<Mutex<Vec<String>>>) -> AnomalyReasoner {
        AnomalyReasoner::new(
            Arc::new(RecordingProvider { prompts }),
            PromptTemplate::default(),
            LlmConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_loop_ends_at_end_of_stream() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let detector = ScriptedDetector {
            per_frame: Mutex::new(VecDeque::new()),
        };
        let controller = MonitorLoop::new(
            ScriptedStream::of_empty_frames(3),
            DetectionStage::new(Arc::new(detector)),
            reasoner_with(prompts.clone()),
            DetectionWindow::new(Duration::from_secs(10)),
            Arc::new(AtomicBool::new(false)),
        );

        let stats = controller.run().await.unwrap();
        assert_eq!(stats.frames_processed, 3);
        assert_eq!(stats.windows_flushed, 0);
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_signal_prevents_frame_pulls() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let detector = ScriptedDetector {
            per_frame: Mutex::new(VecDeque::new()),
        };
        let controller = MonitorLoop::new(
            ScriptedStream::of_empty_frames(100),
            DetectionStage::new(Arc::new(detector)),
            reasoner_with(prompts),
            DetectionWindow::new(Duration::from_secs(10)),
            Arc::new(AtomicBool::new(true)),
        );

        let stats = controller.run().await.unwrap();
        assert_eq!(stats.frames_processed, 0);
    }

    /// Preview stub that replays scripted poll results and counts frames shown
    struct ScriptedPreview {
        polls: Mutex<VecDeque<Result<bool, VisionError>>>,
        frames_shown: Arc<Mutex<u64>>,
    }

    impl Preview for ScriptedPreview {
        fn show(&self, _frame: &Mat, _detections: &[Detection]) -> Result<(), VisionError> {
            *self.frames_shown.lock().unwrap() += 1;
            Ok(())
        }

        fn poll_quit(&self) -> Result<bool, VisionError> {
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(false))
        }
    }

    #[tokio::test]
    async fn test_preview_poll_failure_drops_display_not_the_loop() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let detector = ScriptedDetector {
            per_frame: Mutex::new(VecDeque::new()),
        };
        let frames_shown = Arc::new(Mutex::new(0));
        let preview = ScriptedPreview {
            polls: Mutex::new(VecDeque::from([Err(VisionError::OpenCv(
                "wait_key failed".to_string(),
            ))])),
            frames_shown: frames_shown.clone(),
        };
        let controller = MonitorLoop::new(
            ScriptedStream::of_empty_frames(5),
            DetectionStage::new(Arc::new(detector)),
            reasoner_with(prompts),
            DetectionWindow::new(Duration::from_secs(10)),
            Arc::new(AtomicBool::new(false)),
        )
        .with_display(preview);

        let stats = controller.run().await.unwrap();
        // The failed poll costs the window, never the monitoring loop
        assert_eq!(stats.frames_processed, 5);
        assert_eq!(*frames_shown.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_quit_key_stops_the_loop() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let detector = ScriptedDetector {
            per_frame: Mutex::new(VecDeque::new()),
        };
        let frames_shown = Arc::new(Mutex::new(0));
        let preview = ScriptedPreview {
            polls: Mutex::new(VecDeque::from([Ok(false), Ok(true)])),
            frames_shown: frames_shown.clone(),
        };
        let controller = MonitorLoop::new(
            ScriptedStream::of_empty_frames(100),
            DetectionStage::new(Arc::new(detector)),
            reasoner_with(prompts),
            DetectionWindow::new(Duration::from_secs(10)),
            Arc::new(AtomicBool::new(false)),
        )
        .with_display(preview);

        let stats = controller.run().await.unwrap();
        // Quit observed on the second frame; no third pull happens
        assert_eq!(stats.frames_processed, 2);
    }

    #[tokio::test]
    async fn test_fatal_read_failure_unwinds_loop() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let mut frames: VecDeque<Result<Option<Mat>, VisionError>> = VecDeque::new();
        frames.push_back(Ok(Some(Mat::default())));
        frames.push_back(Err(VisionError::StreamRead("device lost".to_string())));
        let detector = ScriptedDetector {
            per_frame: Mutex::new(VecDeque::new()),
        };
        let controller = MonitorLoop::new(
            ScriptedStream { frames },
            DetectionStage::new(Arc::new(detector)),
            reasoner_with(prompts),
            DetectionWindow::new(Duration::from_secs(10)),
            Arc::new(AtomicBool::new(false)),
        );

        match controller.run().await {
            Err(VisionError::StreamRead(_)) => {}
            other => panic!("expected StreamRead, got {:?}", other.map(|s| s.frames_processed)),
        }
    }
}
