//! Optional OCR verification (spec.md §4.5 step 8): checks whether an
//! independent vision-LLM reading agrees with the voted OCR text using
//! Jaccard concordance over normalized tokens, and decides whether to
//! trust the LLM's reading when they disagree.

use std::collections::HashSet;

/// Lowercases, strips punctuation, and splits on whitespace.
fn normalize_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|token| token.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|token| !token.is_empty())
        .collect()
}

/// Jaccard similarity between the normalized token sets of `a` and `b`,
/// in `[0, 1]`. Two empty texts are considered fully concordant.
pub fn jaccard_concordance(a: &str, b: &str) -> f64 {
    let set_a = normalize_tokens(a);
    let set_b = normalize_tokens(b);
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Below this concordance, the OCR vote and the vision LLM's reading are
/// considered to disagree (spec.md §4.5 step 8).
pub const CONCORDANCE_TRUST_THRESHOLD: f64 = 0.5;
/// Below this average OCR confidence, a disagreement is resolved in the
/// LLM's favor rather than the OCR vote's.
pub const OCR_CONFIDENCE_TRUST_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    TrustOcr,
    TrustLlm,
}

/// Decides which reading to trust: `concordance < 0.5 ∧ avg_ocr_conf <
/// 0.6` trusts the LLM, otherwise the OCR vote wins (spec.md §4.5 step
/// 8's compound condition, applied exactly).
pub fn verify(ocr_text: &str, llm_text: &str, avg_ocr_conf: f64) -> VerificationOutcome {
    let concordance = jaccard_concordance(ocr_text, llm_text);
    if concordance < CONCORDANCE_TRUST_THRESHOLD && avg_ocr_conf < OCR_CONFIDENCE_TRUST_THRESHOLD {
        VerificationOutcome::TrustLlm
    } else {
        VerificationOutcome::TrustOcr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_fully_concordant() {
        assert_eq!(jaccard_concordance("Open Door", "open door"), 1.0);
    }

    #[test]
    fn completely_different_text_has_zero_concordance() {
        assert_eq!(jaccard_concordance("exit now", "welcome home"), 0.0);
    }

    #[test]
    fn partial_overlap_is_scored_between_zero_and_one() {
        let score = jaccard_concordance("open the door now", "open the window now");
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn high_concordance_trusts_ocr_regardless_of_confidence() {
        assert_eq!(verify("open the door", "open the door please", 0.1), VerificationOutcome::TrustOcr);
    }

    #[test]
    fn low_concordance_with_confident_ocr_still_trusts_ocr() {
        assert_eq!(verify("open the door", "totally unrelated text here", 0.9), VerificationOutcome::TrustOcr);
    }

    #[test]
    fn low_concordance_with_low_ocr_confidence_trusts_llm() {
        assert_eq!(verify("open the door", "totally unrelated text here", 0.2), VerificationOutcome::TrustLlm);
    }
}
