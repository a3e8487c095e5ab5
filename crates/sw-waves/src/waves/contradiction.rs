//! ContradictionValidatorWave (priority 5, runs last): evaluates the
//! configured [`ContradictionRule`] set against the final signal map
//! (spec.md §4.6).
//!
//! [`RuleKind::Custom`] rules can't carry a serializable closure, so the
//! built-in custom rules are dispatched by `rule_id` to a small table of
//! named predicate functions below — see DESIGN.md.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use sw_core::{
    priority, AnalysisContext, ContradictionResult, ContradictionRule, CoreError, ResolutionPolicy, RuleKind,
    Severity, Signal, SignalValue, ValidationStatus, Wave,
};

#[derive(Default)]
pub struct ContradictionValidatorWave {
    rules: Vec<ContradictionRule>,
    reject_on_critical: bool,
    tags: Vec<String>,
}

impl ContradictionValidatorWave {
    pub fn new(reject_on_critical: bool) -> Self {
        ContradictionValidatorWave {
            rules: built_in_rules(),
            reject_on_critical,
            tags: vec!["validation".to_string()],
        }
    }

    pub fn with_rules(mut self, rules: Vec<ContradictionRule>) -> Self {
        self.rules = rules;
        self
    }
}

fn text_len(ctx: &AnalysisContext, key: &str) -> usize {
    ctx.get_string(key, "").trim().len()
}

/// Dispatches the handful of built-in rules that need custom predicate
/// logic beyond the five literal `RuleKind` shapes. Returns `None` when
/// the rule does not fire.
fn evaluate_custom(rule_id: &str, ctx: &AnalysisContext) -> Option<String> {
    match rule_id {
        "ocr_vs_vision_text" => {
            let ocr_len = text_len(ctx, "ocr.corrected.text").max(text_len(ctx, "ocr.simple.full_text"));
            let vision_len = text_len(ctx, "vision.llm.text");
            if (ocr_len > 3) != (vision_len > 3) {
                Some(format!("OCR text length {ocr_len} vs vision-LLM text length {vision_len} disagree on text presence"))
            } else {
                None
            }
        }
        "text_likeliness_vs_ocr" => {
            let likeliness = ctx.get_f64("content.text_likeliness", 0.0);
            let ocr_len = text_len(ctx, "ocr.corrected.text").max(text_len(ctx, "ocr.simple.full_text"));
            if likeliness > 0.6 && ocr_len == 0 {
                Some(format!("text_likeliness={likeliness:.2} but OCR found no text"))
            } else {
                None
            }
        }
        "grayscale_vs_colors" => {
            let is_grayscale = ctx.get_bool("color.is_grayscale", false);
            let dominant = ctx.get_string("color.dominant", "");
            let distinct_colors = dominant.split(',').filter(|s| !s.trim().is_empty()).count();
            if is_grayscale && distinct_colors > 1 {
                Some(format!("color.is_grayscale=true but {distinct_colors} distinct dominant colors reported"))
            } else {
                None
            }
        }
        "screenshot_vs_photo_noise" => {
            let content_type = ctx.get_string("content.type", "");
            let noise = ctx.get_f64("forensics.noise_level", 0.0);
            if content_type == "screenshot" && noise > 0.85 {
                Some(format!("content.type=screenshot but forensics.noise_level={noise:.2} resembles sensor noise"))
            } else {
                None
            }
        }
        "llm_vs_heuristic_type" => {
            let caption = ctx.get_string("vision.llm.caption", "").to_lowercase();
            let content_type = ctx.get_string("content.type", "");
            if !content_type.is_empty() && !caption.is_empty() && !caption.contains(&content_type) {
                let mentions_other = ["photo", "diagram", "chart", "screenshot", "document"]
                    .iter()
                    .any(|t| *t != content_type && caption.contains(t));
                if mentions_other {
                    Some(format!("vision caption suggests a different type than heuristic content.type={content_type}"))
                } else {
                    None
                }
            } else {
                None
            }
        }
        "face_vs_icon" => {
            let face_count = ctx.get_i64("face.count", 0);
            let content_type = ctx.get_string("content.type", "");
            if face_count > 0 && content_type == "diagram" {
                Some(format!("face.count={face_count} but content.type=diagram"))
            } else {
                None
            }
        }
        "exif_format_mismatch" => {
            if !ctx.contains_key("exif.container_format") || !ctx.contains_key("identity.format") {
                return None;
            }
            let exif_format = ctx.get_string("exif.container_format", "");
            let identity_format = ctx.get_string("identity.format", "");
            if exif_format != "unknown" && identity_format != "unknown" && exif_format != identity_format {
                Some(format!("exif.container_format={exif_format} but identity.format={identity_format}"))
            } else {
                None
            }
        }
        "blur_vs_edges" => {
            let blur = ctx.get_f64("quality.blur_score", 0.0);
            let edges = ctx.get_f64("quality.edge_density", 0.0);
            if blur > 0.7 && edges > 0.3 {
                Some(format!("quality.blur_score={blur:.2} but quality.edge_density={edges:.2}"))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn evaluate_literal(rule: &ContradictionRule, ctx: &AnalysisContext) -> Option<String> {
    let signal_a = ctx.signal(&rule.signal_key_a)?;
    match rule.kind {
        RuleKind::ValueConflict => {
            let signal_b = ctx.signal(&rule.signal_key_b)?;
            let expected = rule.expected_values_a.as_ref()?;
            let contradictory = rule.contradictory_values_b.as_ref()?;
            if expected.contains(&signal_a.value) && contradictory.contains(&signal_b.value) {
                Some(format!("{} and {} hold conflicting values", rule.signal_key_a, rule.signal_key_b))
            } else {
                None
            }
        }
        RuleKind::NumericDivergence => {
            let a = signal_a.value.as_f64()?;
            let b = ctx.signal(&rule.signal_key_b)?.value.as_f64()?;
            let threshold = rule.threshold.unwrap_or(0.0);
            if (a - b).abs() > threshold {
                Some(format!("|{} - {}| = {:.3} exceeds threshold {threshold:.3}", rule.signal_key_a, rule.signal_key_b, (a - b).abs()))
            } else {
                None
            }
        }
        RuleKind::BooleanOpposite => {
            let a = signal_a.value.as_bool()?;
            let b = ctx.signal(&rule.signal_key_b)?.value.as_bool()?;
            if a != b {
                Some(format!("{}={a} contradicts {}={b}", rule.signal_key_a, rule.signal_key_b))
            } else {
                None
            }
        }
        RuleKind::MutuallyExclusive => {
            let a = signal_a.value.as_bool()?;
            let b = ctx.signal(&rule.signal_key_b)?.value.as_bool()?;
            if a && b {
                Some(format!("{} and {} are both truthy but mutually exclusive", rule.signal_key_a, rule.signal_key_b))
            } else {
                None
            }
        }
        RuleKind::MissingImplied => {
            let a = signal_a.value.as_bool().unwrap_or(false);
            if a && !ctx.contains_key(&rule.signal_key_b) {
                Some(format!("{} is truthy but {} is missing", rule.signal_key_a, rule.signal_key_b))
            } else {
                None
            }
        }
        RuleKind::Custom => evaluate_custom(&rule.rule_id, ctx),
    }
}

/// The eight required built-in rules (spec.md §4.6). `signal_key_a`/`b`
/// document the primary signals each rule compares; dispatch for
/// `Custom` rules is by `rule_id`, not these fields.
pub fn built_in_rules() -> Vec<ContradictionRule> {
    vec![
        ContradictionRule::new("ocr_vs_vision_text", "ocr.corrected.text", "vision.llm.text", RuleKind::Custom, Severity::Warning, ResolutionPolicy::PreferHigherConfidence),
        ContradictionRule::new("text_likeliness_vs_ocr", "content.text_likeliness", "ocr.corrected.text", RuleKind::Custom, Severity::Warning, ResolutionPolicy::ManualReview),
        ContradictionRule::new("grayscale_vs_colors", "color.is_grayscale", "color.dominant", RuleKind::Custom, Severity::Info, ResolutionPolicy::PreferHigherConfidence),
        ContradictionRule::new("screenshot_vs_photo_noise", "content.type", "forensics.noise_level", RuleKind::Custom, Severity::Warning, ResolutionPolicy::ManualReview),
        ContradictionRule::new("llm_vs_heuristic_type", "vision.llm.caption", "content.type", RuleKind::Custom, Severity::Info, ResolutionPolicy::PreferHigherConfidence),
        ContradictionRule::new("face_vs_icon", "face.count", "content.type", RuleKind::Custom, Severity::Error, ResolutionPolicy::ManualReview),
        ContradictionRule::new("exif_format_mismatch", "exif.container_format", "identity.format", RuleKind::Custom, Severity::Critical, ResolutionPolicy::EscalateToLlm),
        ContradictionRule::new("blur_vs_edges", "quality.blur_score", "quality.edge_density", RuleKind::Custom, Severity::Warning, ResolutionPolicy::MarkConflicting),
    ]
}

#[async_trait]
impl Wave for ContradictionValidatorWave {
    fn name(&self) -> &str {
        "Contradiction"
    }

    fn priority(&self) -> i32 {
        priority::CONTRADICTION
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    async fn analyze(
        &self,
        _image_path: &str,
        ctx: &mut AnalysisContext,
        _cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError> {
        let mut results: Vec<ContradictionResult> = Vec::new();
        let mut worst: Option<Severity> = None;

        for rule in &self.rules {
            if !rule.enabled {
                continue;
            }
            let Some(signal_a) = ctx.signal(&rule.signal_key_a) else { continue };
            if signal_a.confidence < rule.min_confidence_threshold {
                continue;
            }
            let both_low_confidence = match ctx.signal(&rule.signal_key_b) {
                Some(signal_b) => signal_a.confidence < 0.5 && signal_b.confidence < 0.5,
                None => signal_a.confidence < 0.5,
            };

            let Some(explanation) = evaluate_literal(rule, ctx) else { continue };

            let effective_severity = if both_low_confidence { rule.severity.downgrade() } else { rule.severity };
            worst = Some(worst.map_or(effective_severity, |w| w.max(effective_severity)));

            results.push(ContradictionResult {
                rule_id: rule.rule_id.clone(),
                signal_a_key: rule.signal_key_a.clone(),
                signal_b_key: Some(rule.signal_key_b.clone()),
                explanation,
                effective_severity,
                recommended_resolution: rule.resolution,
                detected_at: signal_a.timestamp,
            });
        }

        let status: ValidationStatus = worst.map(ValidationStatus::from).unwrap_or(ValidationStatus::Clean);
        let status_str = match status {
            ValidationStatus::Clean => "clean",
            ValidationStatus::Info => "info",
            ValidationStatus::Warning => "warning",
            ValidationStatus::Error => "error",
            ValidationStatus::Critical => "critical",
        };

        let mut signals = vec![
            Signal::new("validation.contradiction.count", results.len() as i64, 1.0, "Contradiction")?,
            Signal::new("validation.contradiction.status", status_str, 1.0, "Contradiction")?,
        ];

        for result in &results {
            let mut metadata = std::collections::BTreeMap::new();
            metadata.insert("signal_a".to_string(), result.signal_a_key.clone());
            if let Some(b) = &result.signal_b_key {
                metadata.insert("signal_b".to_string(), b.clone());
            }
            let mut signal = Signal::new(
                format!("validation.rule.{}", result.rule_id),
                SignalValue::Str(result.explanation.clone()),
                1.0,
                "Contradiction",
            )?;
            signal.metadata = metadata;
            signals.push(signal);
        }

        if self.reject_on_critical && worst == Some(Severity::Critical) {
            signals.push(Signal::new("validation.contradiction.rejected", true, 1.0, "Contradiction")?);
        }

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::{AggregationStrategy, Signal as CoreSignal};

    fn ctx_with(signals: Vec<CoreSignal>) -> AnalysisContext {
        let mut ctx = AnalysisContext::new("deadbeef");
        for s in signals {
            ctx.set_value(s, AggregationStrategy::HighestConfidence).unwrap();
        }
        ctx
    }

    #[test]
    fn exif_mismatch_fires_when_formats_differ() {
        let ctx = ctx_with(vec![
            CoreSignal::new("exif.container_format", "jpeg", 0.9, "ExifForensics").unwrap(),
            CoreSignal::new("identity.format", "png", 0.9, "Identity").unwrap(),
        ]);
        assert!(evaluate_custom("exif_format_mismatch", &ctx).is_some());
    }

    #[test]
    fn exif_match_does_not_fire() {
        let ctx = ctx_with(vec![
            CoreSignal::new("exif.container_format", "jpeg", 0.9, "ExifForensics").unwrap(),
            CoreSignal::new("identity.format", "jpeg", 0.9, "Identity").unwrap(),
        ]);
        assert!(evaluate_custom("exif_format_mismatch", &ctx).is_none());
    }

    #[tokio::test]
    async fn critical_rule_sets_rejected_signal_when_configured() {
        let mut ctx = ctx_with(vec![
            CoreSignal::new("exif.container_format", "jpeg", 0.9, "ExifForensics").unwrap(),
            CoreSignal::new("identity.format", "png", 0.9, "Identity").unwrap(),
        ]);
        let wave = ContradictionValidatorWave::new(true);
        let cancel = CancellationToken::new();
        let signals = wave.analyze("unused", &mut ctx, &cancel).await.unwrap();
        assert!(signals.iter().any(|s| s.key == "validation.contradiction.rejected"));
    }

    #[tokio::test]
    async fn grayscale_vs_colors_reports_info_even_at_high_confidence() {
        let mut ctx = ctx_with(vec![
            CoreSignal::new("color.is_grayscale", true, 0.95, "Color").unwrap(),
            CoreSignal::new("color.dominant", "Red,Blue", 0.9, "Color").unwrap(),
        ]);
        let wave = ContradictionValidatorWave::new(false);
        let cancel = CancellationToken::new();
        let signals = wave.analyze("unused", &mut ctx, &cancel).await.unwrap();
        let status = signals.iter().find(|s| s.key == "validation.contradiction.status").unwrap();
        assert_eq!(status.value.as_str_coerced().unwrap(), "info");
        let rule_signal = signals.iter().find(|s| s.key == "validation.rule.grayscale_vs_colors");
        assert!(rule_signal.is_some());
    }

    #[tokio::test]
    async fn clean_signal_set_reports_clean_status() {
        let mut ctx = AnalysisContext::new("deadbeef");
        let wave = ContradictionValidatorWave::new(false);
        let cancel = CancellationToken::new();
        let signals = wave.analyze("unused", &mut ctx, &cancel).await.unwrap();
        let status = signals.iter().find(|s| s.key == "validation.contradiction.status").unwrap();
        assert_eq!(status.value.as_str_coerced().unwrap(), "clean");
    }
}
