//! [`SalienceFusion`] — ranks candidates by `weight(purpose) x confidence`
//! and emits the bounded-length joined output (spec.md §4.7).

use crate::candidate::SalienceCandidate;
use crate::purpose::Purpose;

pub const DEFAULT_MAX_SIGNALS: usize = 6;

/// Rank `candidates` for `purpose` and join the top `max_signals` as
/// `[Category] value | [Category] value | ...`.
pub fn render(candidates: &[SalienceCandidate], purpose: Purpose, max_signals: usize) -> String {
    let mut scored: Vec<(&SalienceCandidate, f64)> =
        candidates.iter().map(|c| (c, c.score(purpose))).collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(max_signals)
        .map(|(c, _)| c.format())
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn render_default(candidates: &[SalienceCandidate], purpose: Purpose) -> String {
    render(candidates, purpose, DEFAULT_MAX_SIGNALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateValue;
    use crate::purpose::Category;

    #[test]
    fn ranks_by_weighted_score_descending() {
        let candidates = vec![
            SalienceCandidate::new(Category::Quality, CandidateValue::Text("blurry".into()), 0.9),
            SalienceCandidate::new(Category::Subjects, CandidateValue::Text("a dog".into()), 0.9),
        ];
        // Under AltText, quality has weight 0.0 so subjects must win.
        let out = render(&candidates, Purpose::AltText, 1);
        assert!(out.contains("Subjects"));
    }

    #[test]
    fn caps_output_at_max_signals() {
        let candidates: Vec<_> = Category::ALL
            .iter()
            .map(|&c| SalienceCandidate::new(c, CandidateValue::Text("x".into()), 0.5))
            .collect();
        let out = render_default(&candidates, Purpose::Default);
        assert_eq!(out.split(" | ").count(), DEFAULT_MAX_SIGNALS);
    }
}
