//! `to_alt_text_context(max_length)` — the alt-text budget algorithm
//! (spec.md §4.7). OCR text must never be silently dropped.

/// Inputs assembled from signals before formatting; kept separate from
/// the `sw-core` signal set so this module stays a pure function of
/// plain values (spec.md §8 "Alt-text budget" testable property).
#[derive(Debug, Clone, Default)]
pub struct AltTextInputs {
    /// Subject phrase: who/how many people, inferred clusters if smaller
    /// than the detected face count (spec.md §4.7 priority 1).
    pub subject: Option<String>,
    /// Action phrase, only used for animated inputs (priority 2).
    pub action: Option<String>,
    /// OCR text, if present (priority 3). Must never be silently dropped.
    pub ocr_text: Option<String>,
    pub is_animated: bool,
}

/// Assemble an alt-text string within `max_length`, prioritizing subject,
/// then action (animated only), then OCR text. Falls back to an
/// "OCR-first" layout when the naive assembly would exceed `max_length`
/// and OCR text exists (spec.md §4.7).
pub fn to_alt_text_context(inputs: &AltTextInputs, max_length: usize) -> String {
    let mut parts = Vec::new();
    if let Some(subject) = &inputs.subject {
        parts.push(subject.clone());
    }
    if inputs.is_animated {
        if let Some(action) = &inputs.action {
            parts.push(action.clone());
        }
    }
    if let Some(ocr) = &inputs.ocr_text {
        if !ocr.is_empty() {
            parts.push(format!(r#"Text: "{ocr}""#));
        }
    }
    let naive = parts.join(". ");

    if naive.chars().count() <= max_length {
        return truncate_chars(&naive, max_length);
    }

    match &inputs.ocr_text {
        Some(ocr) if !ocr.is_empty() => ocr_first_layout(inputs, ocr, max_length),
        _ => truncate_chars(&naive, max_length),
    }
}

/// "OCR-first" layout: a brief context of at most
/// `max(30, max_length - ocr_len - 15)` chars, followed by
/// `Text: "<ocr>"` (spec.md §4.7).
fn ocr_first_layout(inputs: &AltTextInputs, ocr: &str, max_length: usize) -> String {
    let ocr_len = ocr.chars().count();
    let context_budget = (max_length.saturating_sub(ocr_len).saturating_sub(15)).max(30);

    let context = inputs.subject.clone().unwrap_or_default();
    let context = truncate_chars(&context, context_budget);

    let text_segment = format!(r#"Text: "{ocr}""#);
    let assembled = if context.is_empty() {
        text_segment.clone()
    } else {
        format!("{context}. {text_segment}")
    };

    if assembled.chars().count() <= max_length {
        return assembled;
    }

    // Still over budget: the OCR text itself must survive intact, so trim
    // the context down to nothing rather than truncate the quoted text.
    if text_segment.chars().count() <= max_length {
        text_segment
    } else {
        truncate_chars(&text_segment, max_length)
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_max_length() {
        for n in [20, 30, 50, 80, 125, 200] {
            let inputs = AltTextInputs {
                subject: Some("A woman standing in a park holding an umbrella".into()),
                action: None,
                ocr_text: Some("Lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod".into()),
                is_animated: false,
            };
            let out = to_alt_text_context(&inputs, n);
            assert!(out.chars().count() <= n, "len {} exceeds budget {n}: {out:?}", out.chars().count());
        }
    }

    #[test]
    fn ocr_text_never_dropped_when_present() {
        let inputs = AltTextInputs {
            subject: Some("A long winding description of a complex scene with many subjects".into()),
            action: None,
            ocr_text: Some("STOP".into()),
            is_animated: false,
        };
        let out = to_alt_text_context(&inputs, 40);
        assert!(out.contains(r#"Text: "STOP""#));
    }

    #[test]
    fn no_ocr_text_is_just_subject() {
        let inputs = AltTextInputs {
            subject: Some("A dog in a field".into()),
            action: None,
            ocr_text: None,
            is_animated: false,
        };
        let out = to_alt_text_context(&inputs, 125);
        assert!(!out.contains("Text:"));
        assert_eq!(out, "A dog in a field");
    }
}
