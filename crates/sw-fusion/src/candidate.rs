//! Salience candidates: one per category, carrying a raw value and
//! confidence, formatted per spec.md §4.7's category-specific truncation
//! rules.

use crate::purpose::{weight_for, Category, Purpose};

#[derive(Debug, Clone)]
pub enum CandidateValue {
    Text(String),
    /// Ranked labels, descending confidence (entities: top 5).
    Labels(Vec<String>),
    /// Named colors, descending prevalence (colors: top 3).
    Colors(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SalienceCandidate {
    pub category: Category,
    pub value: CandidateValue,
    pub raw_confidence: f64,
}

impl SalienceCandidate {
    pub fn new(category: Category, value: CandidateValue, raw_confidence: f64) -> Self {
        SalienceCandidate { category, value, raw_confidence }
    }

    pub fn score(&self, purpose: Purpose) -> f64 {
        weight_for(purpose, self.category) * self.raw_confidence
    }

    /// `[Category] short_value`, with category-specific truncation:
    /// text truncates to 60 chars with an ellipsis, colors take the top 3
    /// names, entities the top 5 labels (spec.md §4.7).
    pub fn format(&self) -> String {
        let label = category_label(self.category);
        let short = match &self.value {
            CandidateValue::Text(t) => truncate_with_ellipsis(t, 60),
            CandidateValue::Labels(items) => items.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
            CandidateValue::Colors(items) => items.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
        };
        format!("[{label}] {short}")
    }
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Subjects => "Subjects",
        Category::Entities => "Entities",
        Category::Motion => "Motion",
        Category::Text => "Text",
        Category::Scene => "Scene",
        Category::Colors => "Colors",
        Category::Quality => "Quality",
        Category::Identity => "Identity",
        Category::CaptionFromLlm => "Caption",
    }
}

pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_truncates_with_ellipsis() {
        let long = "a".repeat(100);
        let c = SalienceCandidate::new(Category::Text, CandidateValue::Text(long), 0.9);
        let formatted = c.format();
        assert!(formatted.starts_with("[Text] "));
        assert!(formatted.ends_with('…'));
        assert!(formatted.chars().count() <= "[Text] ".len() + 60);
    }

    #[test]
    fn entities_take_top_five() {
        let labels = (0..10).map(|i| format!("e{i}")).collect();
        let c = SalienceCandidate::new(Category::Entities, CandidateValue::Labels(labels), 0.5);
        let formatted = c.format();
        assert_eq!(formatted, "[Entities] e0, e1, e2, e3, e4");
    }

    #[test]
    fn colors_take_top_three() {
        let colors = vec!["Red".into(), "Blue".into(), "Green".into(), "Yellow".into()];
        let c = SalienceCandidate::new(Category::Colors, CandidateValue::Colors(colors), 0.5);
        assert_eq!(c.format(), "[Colors] Red, Blue, Green");
    }
}
