//! AutoRoutingWave (priority 98, tag `route`): the auto-router. Runs an
//! inline ≤20ms text detector, scores quality/fast indicators from
//! upstream identity/color/quality signals, and emits `route.selected`,
//! `route.text_tier`, and `route.skip.<wave>` signals (spec.md §4.4).
//!
//! Routing-decision memoization across runs is achieved by the
//! `SignalStore` profile cache (the whole profile, including these
//! `route.*` signals, is reused on a cache hit) rather than a separate
//! store write here — see DESIGN.md.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{priority, AnalysisContext, CoreError, CoreReason, ImageRef, Route, Signal, TextRegionDetector, TextTier, Wave};

pub struct AutoRoutingWave {
    detector: Arc<dyn TextRegionDetector>,
    tags: Vec<String>,
}

impl AutoRoutingWave {
    pub fn new(detector: Arc<dyn TextRegionDetector>) -> Self {
        AutoRoutingWave { detector, tags: vec!["route".to_string()] }
    }
}

struct RouteInputs {
    is_animated: bool,
    frame_count: i64,
    pixel_count: i64,
    text_likeliness: f64,
    edge_density: f64,
    content_type: String,
    text_coverage: f64,
    text_region_count: usize,
    has_subtitles: bool,
}

fn score(inputs: &RouteInputs) -> (i32, i32, Vec<&'static str>) {
    let mut quality = 0;
    let mut fast = 0;
    let mut reasons = Vec::new();

    if inputs.text_coverage > 0.40 {
        quality += 3;
        reasons.push("document_text");
    } else if inputs.text_coverage > 0.20 {
        quality += 2;
    } else if inputs.text_coverage > 0.10 {
        quality += 1;
    }
    if inputs.text_region_count > 10 {
        quality += 2;
    }
    if inputs.is_animated && inputs.frame_count > 3 {
        if inputs.has_subtitles && inputs.text_coverage < 0.15 {
            fast += 1;
        } else {
            quality += 2;
        }
    }
    if inputs.text_likeliness > 0.5 && inputs.text_coverage < 0.05 {
        quality += 1;
    }
    if matches!(inputs.content_type.as_str(), "diagram" | "chart" | "scanned_document" | "screenshot") {
        quality += 2;
    }
    if inputs.edge_density > 0.15 && inputs.text_region_count > 5 {
        quality += 1;
    }
    if inputs.pixel_count > 2_000_000 && inputs.text_coverage > 0.05 {
        quality += 1;
    }

    if inputs.text_coverage < 0.10 && inputs.text_region_count <= 3 {
        fast += 2;
    }
    if !inputs.is_animated && inputs.text_coverage < 0.15 {
        fast += 1;
    }
    if inputs.text_region_count == 0 && inputs.text_likeliness < 0.1 {
        fast += 2;
    }
    if inputs.has_subtitles && inputs.text_coverage < 0.15 {
        fast += 1;
    }
    if inputs.pixel_count < 100_000 {
        fast += 1;
    }

    (quality, fast, reasons)
}

fn select_route(quality: i32, fast: i32) -> Route {
    if quality >= 3 {
        Route::Quality
    } else if fast >= 3 || (fast >= 2 && quality == 0) {
        Route::Fast
    } else {
        Route::Balanced
    }
}

#[async_trait]
impl Wave for AutoRoutingWave {
    fn name(&self) -> &str {
        "AutoRouting"
    }

    fn priority(&self) -> i32 {
        priority::AUTO_ROUTING
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let image = ImageRef::from_path(image_path);
        let detection = self
            .detector
            .detect(&image)
            .map_err(|e| CoreError::from(CoreReason::WaveExecution).with_detail(e.to_string()))?;

        ctx.set_cached("ocr.opencv.text_regions", detection.regions.clone());

        let inputs = RouteInputs {
            is_animated: ctx.get_bool("identity.is_animated", false),
            frame_count: ctx.get_i64("identity.frame_count", 1),
            pixel_count: ctx.get_i64("identity.pixel_count", 0),
            text_likeliness: ctx.get_f64("content.text_likeliness", 0.0),
            edge_density: ctx.get_f64("quality.edge_density", 0.0),
            content_type: ctx.get_string("content.type", ""),
            text_coverage: detection.text_coverage,
            text_region_count: detection.text_region_count,
            has_subtitles: detection.has_subtitles,
        };

        let (quality_points, fast_points, reasons) = score(&inputs);
        let route = select_route(quality_points, fast_points);
        let tier = TextTier::from_coverage(inputs.text_coverage);
        let skip_waves = sw_core::routing::skip_set_for(route, tier);
        let reason = reasons.first().copied().unwrap_or("scored").to_string();

        let mut signals = vec![
            Signal::new("route.selected", format!("{route:?}").to_lowercase(), 1.0, "AutoRouting")?,
            Signal::new("route.text_tier", format!("{tier:?}").to_lowercase(), 1.0, "AutoRouting")?,
            Signal::new("route.reason", reason, 1.0, "AutoRouting")?,
            Signal::new("content.text_coverage", inputs.text_coverage, 0.9, "AutoRouting")?,
            Signal::new("content.text_region_count", inputs.text_region_count as i64, 0.9, "AutoRouting")?,
            Signal::new("content.has_subtitles", inputs.has_subtitles, 0.9, "AutoRouting")?,
        ];
        for wave_name in &skip_waves {
            signals.push(Signal::new(format!("route.skip.{wave_name}"), true, 1.0, "AutoRouting")?);
        }
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_text_routes_to_quality() {
        let inputs = RouteInputs {
            is_animated: false,
            frame_count: 1,
            pixel_count: 500_000,
            text_likeliness: 0.0,
            edge_density: 0.0,
            content_type: String::new(),
            text_coverage: 0.5,
            text_region_count: 12,
            has_subtitles: false,
        };
        let (q, f, _) = score(&inputs);
        assert_eq!(select_route(q, f), Route::Quality);
        assert!(f < 3);
    }

    #[test]
    fn sparse_static_image_routes_to_fast() {
        let inputs = RouteInputs {
            is_animated: false,
            frame_count: 1,
            pixel_count: 50_000,
            text_likeliness: 0.0,
            edge_density: 0.0,
            content_type: String::new(),
            text_coverage: 0.0,
            text_region_count: 0,
            has_subtitles: false,
        };
        let (q, f, _) = score(&inputs);
        assert_eq!(select_route(q, f), Route::Fast);
    }

    #[test]
    fn subtitled_animation_with_low_coverage_stays_fast_leaning() {
        let inputs = RouteInputs {
            is_animated: true,
            frame_count: 6,
            pixel_count: 300_000,
            text_likeliness: 0.0,
            edge_density: 0.0,
            content_type: String::new(),
            text_coverage: 0.05,
            text_region_count: 2,
            has_subtitles: true,
        };
        let (q, _f, _) = score(&inputs);
        assert_eq!(q, 0);
    }
}
