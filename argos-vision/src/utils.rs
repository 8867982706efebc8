//! Pixel conversion helpers for model input

use crate::error::VisionError;
use opencv::prelude::*;

/// Convert an 8-bit RGB Mat (already resized to the target dimensions) into
/// a normalized [3, H, W] float tensor.
pub fn mat_to_chw_tensor(
    mat: &Mat,
    target_width: u32,
    target_height: u32,
) -> Result<Vec<f32>, VisionError> {
    if target_width == 0 || target_height == 0 {
        return Err(VisionError::Processing(
            "target dimensions cannot be zero".to_string(),
        ));
    }

    let total = (target_width as usize)
        .checked_mul(target_height as usize)
        .and_then(|p| p.checked_mul(3))
        .ok_or_else(|| VisionError::Processing("target dimensions overflow".to_string()))?;
    if total > 100_000_000 {
        return Err(VisionError::Processing(
            "target dimensions too large (max 100M elements)".to_string(),
        ));
    }

    let (width, height) = (mat.cols(), mat.rows());
    if width != target_width as i32 || height != target_height as i32 {
        return Err(VisionError::Processing(format!(
            "expected a {}x{} frame, got {}x{}",
            target_width, target_height, width, height
        )));
    }

    let channels = mat.channels();
    if channels != 3 {
        return Err(VisionError::Processing(format!(
            "expected 3 channels, got {}",
            channels
        )));
    }

    let data = mat
        .data_bytes()
        .map_err(|e| VisionError::OpenCv(format!("failed to get Mat data: {}", e)))?;

    let h = target_height as usize;
    let w = target_width as usize;
    if data.len() < h * w * 3 {
        return Err(VisionError::Processing(format!(
            "Mat data too short: {} bytes for {}x{}x3",
            data.len(),
            w,
            h
        )));
    }

    // Interleaved HWC u8 to planar CHW f32 in [0, 1]
    let mut chw = vec![0.0f32; total];
    for y in 0..h {
        for x in 0..w {
            let src = (y * w + x) * 3;
            for c in 0..3 {
                chw[c * h * w + y * w + x] = data[src + c] as f32 / 255.0;
            }
        }
    }

    Ok(chw)
}
