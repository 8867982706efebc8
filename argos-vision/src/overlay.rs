//! Detection overlays for the operator display

use crate::error::VisionError;
use crate::models::yolo::Detection;
use opencv::core::{Point, Rect, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

const BOX_COLOR: (f64, f64, f64) = (0.0, 220.0, 0.0); // BGR green
const LABEL_COLOR: (f64, f64, f64) = (0.0, 220.0, 0.0);

/// Draw bounding boxes and `name confidence` labels onto a frame in place
pub fn draw_detections(frame: &mut Mat, detections: &[Detection]) -> Result<(), VisionError> {
    let frame_width = frame.cols();
    let frame_height = frame.rows();
    if frame_width <= 0 || frame_height <= 0 {
        return Ok(());
    }

    for det in detections {
        let (x, y, w, h) = det.bbox;
        let rect = Rect::new(
            (x as i32).clamp(0, frame_width - 1),
            (y as i32).clamp(0, frame_height - 1),
            (w as i32).max(1),
            (h as i32).max(1),
        );

        imgproc::rectangle(
            frame,
            rect,
            Scalar::new(BOX_COLOR.0, BOX_COLOR.1, BOX_COLOR.2, 0.0),
            2,
            imgproc::LINE_8,
            0,
        )
        .map_err(|e| VisionError::OpenCv(format!("failed to draw box: {}", e)))?;

        let label = format!("{} {:.2}", det.class_name, det.confidence);
        let label_origin = Point::new(rect.x, (rect.y - 4).max(12));
        imgproc::put_text(
            frame,
            &label,
            label_origin,
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            Scalar::new(LABEL_COLOR.0, LABEL_COLOR.1, LABEL_COLOR.2, 0.0),
            1,
            imgproc::LINE_8,
            false,
        )
        .map_err(|e| VisionError::OpenCv(format!("failed to draw label: {}", e)))?;
    }

    Ok(())
}
