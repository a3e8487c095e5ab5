//! Ties every pipeline stage together into the multi-frame OCR state
//! machine described in spec.md §4.5: dedup -> stabilize -> temporal
//! median -> primary pass -> early exit or temporal voting -> tiered
//! correction -> optional sentinel re-query.

use futures::stream::{self, StreamExt};
use sw_core::{BoundingBox, CoreError, CoreReason, ImageRef, OcrEngine, Raster, VisionModel};
use tracing::warn;

use crate::correction::{bigram_perplexity, tier1_correct, tier2_correct};
use crate::frames::dedup_indices;
use crate::quality::QualityMode;
use crate::sentinel::sentinel_reread;
use crate::stabilization::stabilize_all;
use crate::temporal_median::median_composite;
use crate::voting::vote;

const DEDUP_THRESHOLD: f64 = 0.05;
const STABILIZATION_MIN_CONFIDENCE: f64 = 0.6;
/// Below this post-correction confidence, a tier-3 sentinel re-query is
/// worth the extra model call (only reached when the mode enables it).
const SENTINEL_TRIGGER_CONFIDENCE: f64 = 0.6;
const MAX_CONFIDENCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FinalRegion {
    pub text: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub frame_support: usize,
    pub correction_tier: u8,
}

#[derive(Debug, Clone)]
pub struct OcrPipelineResult {
    pub regions: Vec<FinalRegion>,
    pub frames_used: usize,
    pub mode: QualityMode,
    pub early_exit: bool,
    /// Set when a collaborator call failed partway through; the regions
    /// collected before the failure are still returned rather than
    /// discarded (spec.md §4.5 "retains partial output on failure").
    pub partial: bool,
    pub error_detail: Option<String>,
}

/// Picks up to `max_frames` frames spread evenly across the whole
/// sequence (spec.md §4.5 step 6 "by even spacing"), rather than biasing
/// toward its start.
fn pick_evenly_spaced(frames: &[Raster], max_frames: usize) -> Vec<Raster> {
    let n = frames.len();
    let k = max_frames.min(n).max(1);
    (0..k).map(|i| frames[(i * n) / k].clone()).collect()
}

fn crop(raster: &Raster, bbox: BoundingBox) -> Raster {
    let x1 = (bbox.x1.max(0.0) as usize).min(raster.width.saturating_sub(1));
    let y1 = (bbox.y1.max(0.0) as usize).min(raster.height.saturating_sub(1));
    let x2 = (bbox.x2.max(0.0) as usize).clamp(x1 + 1, raster.width);
    let y2 = (bbox.y2.max(0.0) as usize).clamp(y1 + 1, raster.height);
    let width = x2 - x1;
    let height = y2 - y1;
    let mut luma = Vec::with_capacity(width * height);
    for y in y1..y2 {
        for x in x1..x2 {
            luma.push(raster.get(x, y));
        }
    }
    Raster::new(width, height, luma)
}

/// Applies tiers 1 and 2 to `text`, returning the corrected text and
/// which tier (0 = none, 1, or 2) actually changed it.
fn apply_sync_correction(text: &str) -> (String, u8) {
    let after_tier1 = tier1_correct(text);
    let after_tier2 = tier2_correct(&after_tier1);
    if after_tier2 != text {
        let tier = if after_tier2 == after_tier1 && after_tier1 != text { 1 } else { 2 };
        (after_tier2, tier)
    } else {
        (text.to_string(), 0)
    }
}

/// Runs the full multi-frame pipeline over an already-decoded,
/// same-dimension frame burst. `frames` must be non-empty.
/// `ocr_parallelism` bounds concurrent per-frame OCR calls during
/// temporal voting (spec.md §4.5 step 6 "in parallel, bounded by CPU
/// count").
pub async fn run(
    frames: &[Raster],
    ocr_engine: &dyn OcrEngine,
    vision_model: Option<&dyn VisionModel>,
    mode: QualityMode,
    ocr_parallelism: usize,
) -> Result<OcrPipelineResult, CoreError> {
    if frames.is_empty() {
        return Err(CoreError::from(CoreReason::WaveExecution).with_detail("ocr pipeline received no frames"));
    }
    let phases = mode.phase_table();

    let kept_indices = dedup_indices(frames, DEDUP_THRESHOLD);
    let deduped: Vec<Raster> = kept_indices.iter().map(|&i| frames[i].clone()).collect();

    let stabilized = if phases.run_stabilization {
        stabilize_all(&deduped, STABILIZATION_MIN_CONFIDENCE)
    } else {
        deduped.clone()
    };

    let composite = median_composite(&stabilized);
    let composite_ref = ImageRef::from_raster(composite);

    let mut partial = false;
    let mut error_detail = None;

    let primary_regions = match ocr_engine.extract_text_with_coordinates(&composite_ref).await {
        Ok(regions) => regions,
        Err(e) => {
            warn!(error = %e, "primary OCR pass failed, falling back to temporal voting");
            partial = true;
            error_detail = Some(e.to_string());
            Vec::new()
        }
    };

    let primary_confidence = if primary_regions.is_empty() {
        0.0
    } else {
        primary_regions.iter().map(|r| r.confidence).sum::<f64>() / primary_regions.len() as f64
    };

    if !primary_regions.is_empty() && primary_confidence >= phases.early_exit_threshold {
        let regions = primary_regions
            .into_iter()
            .map(|r| {
                let (text, tier) = if phases.run_tier2_correction {
                    apply_sync_correction(&r.text)
                } else {
                    (r.text.clone(), 0)
                };
                FinalRegion { text, confidence: r.confidence, bbox: r.bbox, frame_support: stabilized.len(), correction_tier: tier }
            })
            .collect();
        return Ok(OcrPipelineResult { regions, frames_used: stabilized.len(), mode, early_exit: true, partial, error_detail });
    }

    let voting_frames = pick_evenly_spaced(&stabilized, phases.max_frames_for_voting);
    let concurrency = ocr_parallelism.max(1);
    let mut indexed_results: Vec<_> = stream::iter(voting_frames.iter().cloned().enumerate())
        .map(|(index, frame)| async move {
            let frame_ref = ImageRef::from_raster(frame);
            (index, ocr_engine.extract_text_with_coordinates(&frame_ref).await)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;
    indexed_results.sort_by_key(|(index, _)| *index);

    let mut per_frame_regions = Vec::with_capacity(indexed_results.len());
    for (_, result) in indexed_results {
        match result {
            Ok(regions) => per_frame_regions.push(regions),
            Err(e) => {
                warn!(error = %e, "per-frame OCR failed during temporal voting, skipping frame");
                partial = true;
                error_detail.get_or_insert_with(|| e.to_string());
            }
        }
    }

    if per_frame_regions.is_empty() {
        return Ok(OcrPipelineResult { regions: Vec::new(), frames_used: 0, mode, early_exit: false, partial: true, error_detail });
    }

    let voted = vote(&per_frame_regions);
    let mut regions = Vec::with_capacity(voted.len());
    for v in voted {
        let (mut text, mut tier) = if phases.run_tier2_correction {
            apply_sync_correction(&v.text)
        } else {
            (v.text.clone(), 0)
        };
        let mut confidence = v.confidence;

        if phases.run_tier3_correction && confidence < SENTINEL_TRIGGER_CONFIDENCE {
            if let Some(model) = vision_model {
                let crop_ref = ImageRef::from_raster(crop(&stabilized[0], v.bbox));
                let sentinel_text = sentinel_reread(model, &crop_ref, &text).await;
                if sentinel_text != text {
                    text = sentinel_text;
                    tier = 3;
                    confidence = MAX_CONFIDENCE.min(confidence + 0.2);
                }
            }
        }

        regions.push(FinalRegion { text, confidence, bbox: v.bbox, frame_support: v.frame_support, correction_tier: tier });
    }

    Ok(OcrPipelineResult { regions, frames_used: voting_frames.len(), mode, early_exit: false, partial, error_detail })
}

/// Exposed so callers (the contradiction validator's text-likeliness
/// check) can score arbitrary text without re-running the pipeline.
pub fn naturalness_score(text: &str) -> f64 {
    bigram_perplexity(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sw_core::{CollaboratorError, OcrRegion};
    use tokio::sync::Mutex;

    struct StubEngine {
        responses: Mutex<Vec<Vec<OcrRegion>>>,
    }

    #[async_trait]
    impl OcrEngine for StubEngine {
        async fn extract_text_with_coordinates(&self, _image: &ImageRef) -> Result<Vec<OcrRegion>, CollaboratorError> {
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(responses.remove(0))
            }
        }
    }

    fn solid(value: u8) -> Raster {
        Raster::new(4, 4, vec![value; 16])
    }

    fn region(text: &str, confidence: f64) -> OcrRegion {
        OcrRegion { text: text.to_string(), confidence, bbox: BoundingBox { x1: 0.0, y1: 0.0, x2: 4.0, y2: 4.0 } }
    }

    #[tokio::test]
    async fn high_confidence_primary_pass_exits_early() {
        let engine = StubEngine { responses: Mutex::new(vec![vec![region("EXIT", 0.99)]]) };
        let frames = vec![solid(10), solid(12), solid(9)];
        let result = run(&frames, &engine, None, QualityMode::Balanced, 4).await.unwrap();
        assert!(result.early_exit);
        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].text, "EXIT");
    }

    #[tokio::test]
    async fn low_confidence_primary_pass_falls_through_to_voting() {
        let engine = StubEngine {
            responses: Mutex::new(vec![
                vec![region("EX1T", 0.4)],
                vec![region("EXIT", 0.9)],
                vec![region("EXIT", 0.9)],
            ]),
        };
        let frames = vec![solid(10), solid(12), solid(9)];
        let result = run(&frames, &engine, None, QualityMode::Fast, 4).await.unwrap();
        assert!(!result.early_exit);
        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].text, "EXIT");
    }

    #[tokio::test]
    async fn empty_frame_slice_is_rejected() {
        let engine = StubEngine { responses: Mutex::new(vec![]) };
        let frames: Vec<Raster> = Vec::new();
        let result = run(&frames, &engine, None, QualityMode::Fast, 4).await;
        assert!(result.is_err());
    }
}
