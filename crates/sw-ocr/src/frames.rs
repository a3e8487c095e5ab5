//! Subtitle-aware frame deduplication (spec.md §4.5 step 1). Adjacent
//! frames that differ only in encoder noise are dropped before any
//! further pipeline stage sees them, so stabilization and voting spend
//! their frame budget on genuinely distinct content.

use sw_core::Raster;

/// Region weights used to build the weighted similarity score: the
/// bottom quarter of the frame (where burned-in subtitles usually sit)
/// is weighted highest, so a changing caption is never mistaken for a
/// duplicate even when the rest of the frame is static.
const MAIN_REGION_WEIGHT: f64 = 0.30;
const BOTTOM_REGION_WEIGHT: f64 = 0.40;
const BRIGHT_DELTA_WEIGHT: f64 = 0.30;

const BOTTOM_REGION_START_FRAC: f64 = 0.75;
const BRIGHT_PIXEL_THRESHOLD: u8 = 200;

/// Mean absolute luma difference between two same-sized rasters, over
/// the row range `[y_start, y_end)`, normalized to `[0, 1]`.
fn region_diff(a: &Raster, b: &Raster, y_start: usize, y_end: usize) -> f64 {
    if a.width != b.width || a.height != b.height || y_start >= y_end {
        return 1.0;
    }
    let y_end = y_end.min(a.height);
    let mut total: u64 = 0;
    let mut count: u64 = 0;
    for y in y_start..y_end {
        for x in 0..a.width {
            let da = a.get(x, y) as i32;
            let db = b.get(x, y) as i32;
            total += (da - db).unsigned_abs() as u64;
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    (total as f64) / (count as f64) / 255.0
}

/// Fraction of pixels whose brightness crosses the bright/dark threshold
/// differently between the two frames — a proxy for flashing or
/// appearing/disappearing bright overlay text.
fn bright_pixel_delta(a: &Raster, b: &Raster) -> f64 {
    if a.width != b.width || a.height != b.height || a.luma.is_empty() {
        return 1.0;
    }
    let mut flips: u64 = 0;
    for (pa, pb) in a.luma.iter().zip(b.luma.iter()) {
        let bright_a = *pa >= BRIGHT_PIXEL_THRESHOLD;
        let bright_b = *pb >= BRIGHT_PIXEL_THRESHOLD;
        if bright_a != bright_b {
            flips += 1;
        }
    }
    flips as f64 / a.luma.len() as f64
}

/// Weighted distance between two frames in `[0, 1]`; 0 means identical.
pub fn weighted_distance(a: &Raster, b: &Raster) -> f64 {
    let bottom_start = ((a.height as f64) * BOTTOM_REGION_START_FRAC) as usize;
    let main_diff = region_diff(a, b, 0, bottom_start);
    let bottom_diff = region_diff(a, b, bottom_start, a.height);
    let bright_diff = bright_pixel_delta(a, b);
    MAIN_REGION_WEIGHT * main_diff + BOTTOM_REGION_WEIGHT * bottom_diff + BRIGHT_DELTA_WEIGHT * bright_diff
}

/// Indices of frames to keep, always retaining the first frame. A frame
/// is dropped when its weighted distance from the last *kept* frame
/// falls below `dedup_threshold`.
pub fn dedup_indices(frames: &[Raster], dedup_threshold: f64) -> Vec<usize> {
    let mut kept = Vec::new();
    let mut last_kept: Option<&Raster> = None;
    for (i, frame) in frames.iter().enumerate() {
        let keep = match last_kept {
            None => true,
            Some(prev) => weighted_distance(prev, frame) >= dedup_threshold,
        };
        if keep {
            kept.push(i);
            last_kept = Some(frame);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, value: u8) -> Raster {
        Raster::new(width, height, vec![value; width * height])
    }

    #[test]
    fn identical_frames_have_zero_distance() {
        let a = solid(4, 4, 100);
        let b = solid(4, 4, 100);
        assert_eq!(weighted_distance(&a, &b), 0.0);
    }

    #[test]
    fn dedup_always_keeps_first_frame() {
        let frames = vec![solid(2, 2, 50), solid(2, 2, 50), solid(2, 2, 50)];
        let kept = dedup_indices(&frames, 0.05);
        assert_eq!(kept.first(), Some(&0));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn dedup_keeps_frames_that_differ_enough() {
        let frames = vec![solid(2, 2, 0), solid(2, 2, 255)];
        let kept = dedup_indices(&frames, 0.05);
        assert_eq!(kept, vec![0, 1]);
    }

    #[test]
    fn bottom_region_change_is_not_deduped_away() {
        let mut b = vec![10u8; 8 * 8];
        for y in 6..8 {
            for x in 0..8 {
                b[y * 8 + x] = 240;
            }
        }
        let a = Raster::new(8, 8, vec![10u8; 64]);
        let b = Raster::new(8, 8, b);
        assert!(weighted_distance(&a, &b) > 0.1);
    }
}
