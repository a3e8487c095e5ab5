//! Temporal median compositing (spec.md §4.5 step 3): collapses the
//! stabilized frame stack into a single raster by taking the per-pixel
//! median, which suppresses independent per-frame noise and transient
//! occlusions (a blinking cursor, a passing shadow) while keeping
//! anything present in a majority of frames — including burned-in text.

use sw_core::Raster;

/// Builds the per-pixel median composite of `frames`. All frames must
/// share the same dimensions; panics on an empty slice (callers only
/// reach this stage once at least one frame survived dedup).
pub fn median_composite(frames: &[Raster]) -> Raster {
    assert!(!frames.is_empty(), "median_composite requires at least one frame");
    let width = frames[0].width;
    let height = frames[0].height;
    let mut out = vec![0u8; width * height];
    let mut column = Vec::with_capacity(frames.len());
    for i in 0..(width * height) {
        column.clear();
        for frame in frames {
            column.push(frame.luma[i]);
        }
        column.sort_unstable();
        out[i] = column[column.len() / 2];
    }
    Raster::new(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_is_its_own_median() {
        let frame = Raster::new(2, 2, vec![10, 20, 30, 40]);
        let composite = median_composite(&[frame.clone()]);
        assert_eq!(composite, frame);
    }

    #[test]
    fn outlier_pixel_is_suppressed() {
        let a = Raster::new(1, 1, vec![10]);
        let b = Raster::new(1, 1, vec![12]);
        let c = Raster::new(1, 1, vec![250]);
        let composite = median_composite(&[a, b, c]);
        assert_eq!(composite.luma[0], 12);
    }

    #[test]
    fn even_frame_count_picks_upper_median() {
        let frames = vec![Raster::new(1, 1, vec![0]), Raster::new(1, 1, vec![10]), Raster::new(1, 1, vec![20]), Raster::new(1, 1, vec![30])];
        let composite = median_composite(&frames);
        assert_eq!(composite.luma[0], 20);
    }
}
