//! Frame stabilization (spec.md §4.5 step 2). A full feature-point
//! homography solver is disproportionate for the pixel-shift jitter this
//! pipeline actually needs to correct (minor camera or capture-device
//! wobble between frames of the same burst); this module estimates a
//! global integer-pixel translation against a reference frame by
//! brute-force search, which is the translation-only special case of
//! the same reprojection-confidence idea.

use sw_core::Raster;

const SEARCH_RADIUS: i32 = 4;

/// Mean absolute luma difference between `reference` and `frame` shifted
/// by `(dx, dy)`, sampled only over the region still in bounds after the
/// shift, normalized to `[0, 1]`.
fn shifted_mad(reference: &Raster, frame: &Raster, dx: i32, dy: i32) -> f64 {
    let width = reference.width as i32;
    let height = reference.height as i32;
    let x_start = dx.max(0);
    let x_end = width + dx.min(0);
    let y_start = dy.max(0);
    let y_end = height + dy.min(0);
    if x_end <= x_start || y_end <= y_start {
        return 1.0;
    }
    let mut total: u64 = 0;
    let mut count: u64 = 0;
    for y in y_start..y_end {
        for x in x_start..x_end {
            let rx = (x - dx) as usize;
            let ry = (y - dy) as usize;
            let r = reference.get(x as usize, y as usize) as i32;
            let f = frame.get(rx, ry) as i32;
            total += (r - f).unsigned_abs() as u64;
            count += 1;
        }
    }
    if count == 0 {
        1.0
    } else {
        (total as f64) / (count as f64) / 255.0
    }
}

/// Builds a new raster as `frame` shifted by `(dx, dy)`, clamping at the
/// edges (out-of-bounds source pixels repeat the nearest in-bounds one).
fn apply_shift(frame: &Raster, dx: i32, dy: i32) -> Raster {
    let width = frame.width;
    let height = frame.height;
    let mut out = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let sx = (x as i32 - dx).clamp(0, width as i32 - 1) as usize;
            let sy = (y as i32 - dy).clamp(0, height as i32 - 1) as usize;
            out[y * width + x] = frame.get(sx, sy);
        }
    }
    Raster::new(width, height, out)
}

pub struct StabilizedFrame {
    pub raster: Raster,
    /// `1 - minimal normalized MAD`, i.e. how well the best shift
    /// explains the frame as a translated copy of the reference.
    pub reprojection_confidence: f64,
}

/// Aligns `frame` against `reference` by searching integer shifts within
/// `SEARCH_RADIUS` pixels in both axes and keeping the one with lowest
/// residual difference. Frames whose dimensions don't match the
/// reference are returned unshifted with zero confidence.
pub fn stabilize(reference: &Raster, frame: &Raster) -> StabilizedFrame {
    if reference.width != frame.width || reference.height != frame.height {
        return StabilizedFrame { raster: frame.clone(), reprojection_confidence: 0.0 };
    }
    let mut best_mad = f64::MAX;
    let mut best_shift = (0i32, 0i32);
    for dy in -SEARCH_RADIUS..=SEARCH_RADIUS {
        for dx in -SEARCH_RADIUS..=SEARCH_RADIUS {
            let mad = shifted_mad(reference, frame, dx, dy);
            if mad < best_mad {
                best_mad = mad;
                best_shift = (dx, dy);
            }
        }
    }
    let raster = if best_shift == (0, 0) { frame.clone() } else { apply_shift(frame, best_shift.0, best_shift.1) };
    StabilizedFrame { raster, reprojection_confidence: 1.0 - best_mad }
}

/// Stabilizes every frame against `frames[0]`. A frame whose
/// reprojection confidence falls below `min_confidence` is replaced by
/// the reference itself, rather than contributing misaligned pixels to
/// the temporal median.
pub fn stabilize_all(frames: &[Raster], min_confidence: f64) -> Vec<Raster> {
    if frames.is_empty() {
        return Vec::new();
    }
    let reference = &frames[0];
    let mut out = Vec::with_capacity(frames.len());
    out.push(reference.clone());
    for frame in &frames[1..] {
        let stabilized = stabilize(reference, frame);
        if stabilized.reprojection_confidence < min_confidence {
            out.push(reference.clone());
        } else {
            out.push(stabilized.raster);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, value: u8) -> Raster {
        Raster::new(width, height, vec![value; width * height])
    }

    #[test]
    fn identical_frame_needs_no_shift() {
        let a = solid(6, 6, 128);
        let b = a.clone();
        let result = stabilize(&a, &b);
        assert!((result.reprojection_confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn shifted_frame_is_recovered() {
        let mut data = vec![10u8; 10 * 10];
        data[5 * 10 + 5] = 250;
        let reference = Raster::new(10, 10, data);
        let shifted = apply_shift(&reference, 2, 0);
        let result = stabilize(&reference, &shifted);
        assert!(result.reprojection_confidence > 0.9);
    }

    #[test]
    fn low_confidence_frame_falls_back_to_reference() {
        let reference = solid(5, 5, 0);
        let noise = Raster::new(5, 5, vec![10, 200, 30, 220, 5, 90, 250, 1, 40, 120, 60, 7, 255, 3, 88, 9, 140, 2, 77, 199, 4, 66, 201, 9, 150]);
        let stabilized = stabilize_all(&[reference.clone(), noise], 0.9);
        assert_eq!(stabilized[1], reference);
    }
}
