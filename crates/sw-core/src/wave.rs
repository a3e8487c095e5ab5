//! The [`Wave`] trait and [`WaveRegistry`] (spec.md §4.3).

use std::collections::BTreeSet;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::context::AnalysisContext;
use crate::error::CoreError;
use crate::signal::Signal;

/// The authoritative priority bands from spec.md §4.3. Ordering affects
/// which signals later waves can observe, so these are load-bearing, not
/// decorative.
pub mod priority {
    pub const IDENTITY: i32 = 110;
    pub const COLOR: i32 = 100;
    pub const AUTO_ROUTING: i32 = 98;
    pub const EXIF_FORENSICS: i32 = 90;
    pub const DIGITAL_FINGERPRINT: i32 = 85;
    pub const TEXT_DETECTION: i32 = 82;
    pub const OCR_TESSERACT: i32 = 80;
    pub const FACE_DETECTION: i32 = 75;
    pub const CLIP_EMBEDDING_PRIMARY: i32 = 70;
    pub const OCR_SIMPLE: i32 = 60;
    pub const ADVANCED_OCR: i32 = 59;
    pub const OCR_QUALITY: i32 = 58;
    pub const OCR_VERIFICATION: i32 = 55;
    pub const STRUCTURE: i32 = 52;
    pub const VISION_LLM: i32 = 50;
    pub const MOTION: i32 = 48;
    pub const CLIP_EMBEDDING: i32 = 45;
    pub const COMPLEX_MODE: i32 = 45;
    pub const TEXT_LIKELINESS: i32 = 40;
    pub const QUALITY: i32 = 30;
    pub const ML_OCR: i32 = 28;
    pub const CONTRADICTION: i32 = 5;
}

/// A pluggable analyzer. `analyze` may suspend on I/O and must observe
/// `cancel` at every suspension point (spec.md §4.3, §5).
#[async_trait]
pub trait Wave: Send + Sync {
    fn name(&self) -> &str;
    fn priority(&self) -> i32;
    fn tags(&self) -> &[String];

    /// Default `true`; a wave may override to skip itself based on context
    /// state beyond what routing already expresses.
    fn should_run(&self, _image_path: &str, _ctx: &AnalysisContext) -> bool {
        true
    }

    async fn analyze(
        &self,
        image_path: &str,
        ctx: &mut AnalysisContext,
        cancel: &CancellationToken,
    ) -> Result<Vec<Signal>, CoreError>;
}

/// Holds all registered waves; returns them sorted by descending priority,
/// ties broken by registration order (spec.md §4.3 step 2).
pub struct WaveRegistry {
    waves: Vec<Box<dyn Wave>>,
}

impl Default for WaveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveRegistry {
    pub fn new() -> Self {
        WaveRegistry { waves: Vec::new() }
    }

    pub fn register(&mut self, wave: Box<dyn Wave>) {
        self.waves.push(wave);
    }

    /// All waves, sorted by descending priority, ties broken by the order
    /// they were registered in (a stable sort preserves this).
    pub fn ordered(&self) -> Vec<&dyn Wave> {
        let mut indexed: Vec<(usize, &dyn Wave)> =
            self.waves.iter().enumerate().map(|(i, w)| (i, w.as_ref())).collect();
        indexed.sort_by(|a, b| b.1.priority().cmp(&a.1.priority()).then(a.0.cmp(&b.0)));
        indexed.into_iter().map(|(_, w)| w).collect()
    }

    /// `ordered()` filtered to waves whose tag set intersects
    /// `required_tags`. `None` means "no filtering, run every wave."
    pub fn ordered_for_tags<'a>(
        &'a self,
        required_tags: Option<&BTreeSet<&'static str>>,
    ) -> Vec<&'a dyn Wave> {
        let ordered = self.ordered();
        match required_tags {
            None => ordered,
            Some(required) => ordered
                .into_iter()
                .filter(|w| w.tags().iter().any(|t| required.contains(t.as_str())))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubWave {
        name: String,
        priority: i32,
        tags: Vec<String>,
    }

    #[async_trait]
    impl Wave for StubWave {
        fn name(&self) -> &str {
            &self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn tags(&self) -> &[String] {
            &self.tags
        }
        async fn analyze(
            &self,
            _image_path: &str,
            _ctx: &mut AnalysisContext,
            _cancel: &CancellationToken,
        ) -> Result<Vec<Signal>, CoreError> {
            Ok(vec![])
        }
    }

    fn stub(name: &str, priority: i32, tags: &[&str]) -> Box<dyn Wave> {
        Box::new(StubWave {
            name: name.to_string(),
            priority,
            tags: tags.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn orders_by_descending_priority() {
        let mut reg = WaveRegistry::new();
        reg.register(stub("low", 10, &["a"]));
        reg.register(stub("high", 100, &["a"]));
        reg.register(stub("mid", 50, &["a"]));
        let names: Vec<&str> = reg.ordered().iter().map(|w| w.name()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn ties_break_by_registration_order() {
        let mut reg = WaveRegistry::new();
        reg.register(stub("first", 50, &["a"]));
        reg.register(stub("second", 50, &["a"]));
        let names: Vec<&str> = reg.ordered().iter().map(|w| w.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn tag_filtering_drops_disjoint_waves() {
        let mut reg = WaveRegistry::new();
        reg.register(stub("motion_wave", 50, &["motion"]));
        reg.register(stub("color_wave", 60, &["color"]));
        let mut required = BTreeSet::new();
        required.insert("color");
        let names: Vec<&str> = reg.ordered_for_tags(Some(&required)).iter().map(|w| w.name()).collect();
        assert_eq!(names, vec!["color_wave"]);
    }
}
