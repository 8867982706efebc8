//! Per-frame detection summaries

use crate::models::yolo::Detection;
use std::collections::HashSet;

/// Reduce one frame's detections to a short textual description.
///
/// Returns `None` for an empty detection list (nothing to accumulate).
/// Duplicate class names within a frame collapse to a single mention, in
/// the order the class was first seen, so the output is byte-for-byte
/// reproducible for a given detection sequence.
pub fn summarize(detections: &[Detection]) -> Option<String> {
    if detections.is_empty() {
        return None;
    }

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for det in detections {
        if seen.insert(det.class_name.as_str()) {
            names.push(det.class_name.as_str());
        }
    }

    Some(format!("Detected: {}", names.join(", ")))
}
