//! YOLO object detection model

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::utils::mat_to_chw_tensor;
use opencv::imgproc;
use opencv::prelude::*;
use ort::{Session, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// COCO class names (80 classes)
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack",
    "umbrella", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball",
    "kite", "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple",
    "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair",
    "couch", "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator",
    "book", "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Resolve a model class id to its name. Unresolved ids map to the literal
/// "unknown" label, never an error.
pub fn class_name(class_id: usize) -> &'static str {
    COCO_CLASSES.get(class_id).copied().unwrap_or("unknown")
}

/// One class-labeled object instance found in a single frame
#[derive(Debug, Clone)]
pub struct Detection {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f32,
    /// x, y, width, height in frame pixel coordinates
    pub bbox: (f32, f32, f32, f32),
}

impl Detection {
    /// Convenience constructor resolving the class name from the id
    pub fn with_class_id(class_id: usize, confidence: f32, bbox: (f32, f32, f32, f32)) -> Self {
        Self {
            class_id,
            class_name: class_name(class_id).to_string(),
            confidence,
            bbox,
        }
    }
}

/// YOLO model for object detection
pub struct YoloModel {
    session: Arc<Session>,
    input_size: (u32, u32),
    confidence_threshold: f32,
    nms_threshold: f32,
    max_detections: usize,
}

impl YoloModel {
    /// Load a YOLO ONNX model from disk
    pub fn new(model_path: &Path, config: &VisionConfig) -> Result<Self, VisionError> {
        let session = Session::builder()
            .map_err(|e| VisionError::Ort(format!("Failed to create session builder: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| VisionError::Ort(format!("Failed to load YOLO model: {}", e)))?;

        info!("YOLO model loaded from {:?}", model_path);

        Ok(Self {
            session: Arc::new(session),
            input_size: (640, 640), // YOLO standard input size
            confidence_threshold: config.confidence_threshold,
            nms_threshold: config.nms_threshold,
            max_detections: config.max_detections,
        })
    }

    /// Detect objects in a frame
    pub fn detect(&self, frame: &Mat) -> Result<Vec<Detection>, VisionError> {
        debug!("Running YOLO detection on frame");

        let input = self.preprocess(frame)?;

        let outputs = self
            .session
            .run(vec![input])
            .map_err(|e| VisionError::Ort(format!("YOLO inference failed: {}", e)))?;

        self.postprocess(&outputs, frame)
    }

    /// Preprocess a frame into the model's [1, 3, H, W] input tensor
    fn preprocess(&self, frame: &Mat) -> Result<Value, VisionError> {
        let (width, height) = (self.input_size.0 as i32, self.input_size.1 as i32);

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            opencv::core::Size::new(width, height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| VisionError::OpenCv(format!("Failed to resize frame: {}", e)))?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)
            .map_err(|e| VisionError::OpenCv(format!("Failed to convert color: {}", e)))?;

        let chw = mat_to_chw_tensor(&rgb, self.input_size.0, self.input_size.1)?;
        let input_shape = vec![
            1i64,
            3,
            self.input_size.1 as i64,
            self.input_size.0 as i64,
        ];

        let array = ort::ndarray::Array::from_shape_vec(
            ort::ndarray::IxDyn(&[1, 3, self.input_size.1 as usize, self.input_size.0 as usize]),
            chw,
        )
        .map_err(|e| VisionError::Ort(format!("Failed to create input array: {}", e)))?;

        debug!("YOLO input shape: {:?}", input_shape);

        Value::from_array(array)
            .map_err(|e| VisionError::Ort(format!("Failed to create input value: {}", e)))
    }

    /// Decode the YOLOv8 output layout [1, 4 + classes, anchors]
    fn postprocess(&self, outputs: &[Value], frame: &Mat) -> Result<Vec<Detection>, VisionError> {
        let output = match outputs.first() {
            Some(output) => output,
            None => return Ok(vec![]),
        };

        let output_array = output
            .try_extract_tensor::<f32>()
            .map_err(|e| VisionError::Ort(format!("Failed to extract output tensor: {}", e)))?;

        let shape = output_array.shape();
        debug!("YOLO output shape: {:?}", shape);
        if shape.len() != 3 || shape[1] <= 4 {
            return Ok(vec![]);
        }

        let num_classes = (shape[1] - 4).min(COCO_CLASSES.len());
        let num_anchors = shape[2];

        // Scale from model input space back to frame pixels
        let frame_width = frame.cols() as f32;
        let frame_height = frame.rows() as f32;
        if frame_width <= 0.0 || frame_height <= 0.0 {
            return Ok(vec![]);
        }
        let scale_x = frame_width / self.input_size.0 as f32;
        let scale_y = frame_height / self.input_size.1 as f32;

        let mut detections = Vec::new();
        for anchor in 0..num_anchors {
            let mut best_class = 0usize;
            let mut best_score = 0.0f32;
            for class_idx in 0..num_classes {
                if let Some(score) = output_array.get([0, 4 + class_idx, anchor]) {
                    if *score > best_score {
                        best_score = *score;
                        best_class = class_idx;
                    }
                }
            }

            if best_score < self.confidence_threshold || !best_score.is_finite() {
                continue;
            }

            let cx = output_array.get([0, 0, anchor]).copied().unwrap_or(0.0);
            let cy = output_array.get([0, 1, anchor]).copied().unwrap_or(0.0);
            let w = output_array.get([0, 2, anchor]).copied().unwrap_or(0.0);
            let h = output_array.get([0, 3, anchor]).copied().unwrap_or(0.0);
            if !cx.is_finite() || !cy.is_finite() || !w.is_finite() || !h.is_finite() {
                continue;
            }

            // Center form to corner form, clamped to the frame
            let bbox_x = ((cx - w / 2.0) * scale_x).max(0.0);
            let bbox_y = ((cy - h / 2.0) * scale_y).max(0.0);
            let bbox_w = (w * scale_x).min(frame_width - bbox_x);
            let bbox_h = (h * scale_y).min(frame_height - bbox_y);
            if bbox_w <= 0.0 || bbox_h <= 0.0 {
                continue;
            }

            detections.push(Detection::with_class_id(
                best_class,
                best_score,
                (bbox_x, bbox_y, bbox_w, bbox_h),
            ));
        }

        let mut detections = apply_nms(detections, self.nms_threshold);
        if detections.len() > self.max_detections {
            detections.truncate(self.max_detections);
        }

        debug!("YOLO detected {} objects", detections.len());
        Ok(detections)
    }
}

/// Apply non-maximum suppression; input need not be sorted
pub(crate) fn apply_nms(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.retain(|d| d.confidence.is_finite());
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if compute_iou(&detections[i].bbox, &detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}

/// Compute IoU between two (x, y, w, h) boxes
pub(crate) fn compute_iou(bbox1: &(f32, f32, f32, f32), bbox2: &(f32, f32, f32, f32)) -> f32 {
    let (x1, y1, w1, h1) = *bbox1;
    let (x2, y2, w2, h2) = *bbox2;

    if w1 <= 0.0 || h1 <= 0.0 || w2 <= 0.0 || h2 <= 0.0 {
        return 0.0;
    }

    let inter_x_min = x1.max(x2);
    let inter_y_min = y1.max(y2);
    let inter_x_max = (x1 + w1).min(x2 + w2);
    let inter_y_max = (y1 + h1).min(y2 + h2);

    if inter_x_max <= inter_x_min || inter_y_max <= inter_y_min {
        return 0.0;
    }

    let inter_area = (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min);
    let union_area = w1 * h1 + w2 * h2 - inter_area;
    if union_area <= 0.0 || !union_area.is_finite() {
        return 0.0;
    }

    let iou = inter_area / union_area;
    if iou.is_finite() {
        iou.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_known() {
        assert_eq!(class_name(0), "person");
        assert_eq!(class_name(2), "car");
        assert_eq!(class_name(79), "toothbrush");
    }

    #[test]
    fn test_class_name_unresolved_maps_to_unknown() {
        assert_eq!(class_name(80), "unknown");
        assert_eq!(class_name(usize::MAX), "unknown");
    }

    #[test]
    fn test_detection_with_class_id() {
        let det = Detection::with_class_id(0, 0.9, (1.0, 2.0, 3.0, 4.0));
        assert_eq!(det.class_name, "person");
        let det = Detection::with_class_id(9999, 0.9, (1.0, 2.0, 3.0, 4.0));
        assert_eq!(det.class_name, "unknown");
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = (0.0, 0.0, 10.0, 10.0);
        let b = (20.0, 20.0, 10.0, 10.0);
        assert_eq!(compute_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = (5.0, 5.0, 10.0, 10.0);
        let iou = compute_iou(&a, &a);
        assert!((iou - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = (0.0, 0.0, 10.0, 10.0);
        let b = (5.0, 0.0, 10.0, 10.0);
        // intersection 50, union 150
        let iou = compute_iou(&a, &b);
        assert!((iou - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_degenerate_boxes() {
        let a = (0.0, 0.0, 0.0, 10.0);
        let b = (0.0, 0.0, 10.0, 10.0);
        assert_eq!(compute_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_nms_suppresses_overlapping_lower_confidence() {
        let dets = vec![
            Detection::with_class_id(0, 0.6, (0.0, 0.0, 10.0, 10.0)),
            Detection::with_class_id(0, 0.9, (1.0, 1.0, 10.0, 10.0)),
            Detection::with_class_id(2, 0.8, (100.0, 100.0, 10.0, 10.0)),
        ];
        let kept = apply_nms(dets, 0.4);
        assert_eq!(kept.len(), 2);
        // Highest confidence of the overlapping pair survives
        assert_eq!(kept[0].confidence, 0.9);
        assert!(kept.iter().any(|d| d.class_name == "car"));
    }

    #[test]
    fn test_nms_empty_input() {
        let kept = apply_nms(vec![], 0.4);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_nms_drops_non_finite_confidence() {
        let dets = vec![Detection::with_class_id(0, f32::NAN, (0.0, 0.0, 1.0, 1.0))];
        let kept = apply_nms(dets, 0.4);
        assert!(kept.is_empty());
    }
}
