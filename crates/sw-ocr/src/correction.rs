//! Tiers 1 and 2 of the post-correction cascade (spec.md §4.5 step 7).
//! Tier 1 applies a fixed table of character- and pattern-level OCR
//! confusions, but only per-occurrence and only when the corrected word
//! is itself a real dictionary entry (spec.md:211-212 "guarded by
//! dictionary membership") — a substitution that doesn't resolve to a
//! known word is left alone. Tier 2 scores whole candidates with a
//! character-bigram model and prefers whichever candidate (raw or
//! tier-1-corrected) looks more like natural text. Tier 3 (vision-LLM
//! sentinel re-query) lives in `sentinel.rs` since it needs an async
//! collaborator call.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Multi-character OCR confusions, tried as a whole-word substring
/// replace before the per-character digit confusions below.
const TIER1_MULTI_CHAR_PATTERNS: &[(&str, &str)] = &[("rn", "m"), ("vv", "w"), ("cl", "d"), ("li", "h")];

/// Letters a given OCR-confusable digit might actually be. Lowercase and
/// uppercase forms are both listed; [`substitute_digits`] picks whichever
/// case matches the rest of the word.
fn confusable_variants(c: char) -> &'static [char] {
    match c {
        '0' => &['o', 'O'],
        '1' => &['i', 'l', 'I', 'L'],
        '5' => &['s', 'S'],
        '8' => &['b', 'B'],
        _ => &[],
    }
}

fn common_words() -> &'static std::collections::HashSet<&'static str> {
    static WORDS: OnceLock<std::collections::HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "the", "a", "an", "is", "are", "was", "were", "be", "to", "of", "and", "in", "on",
            "at", "for", "with", "this", "that", "it", "as", "by", "from", "or", "not", "no",
            "yes", "open", "close", "exit", "menu", "file", "edit", "view", "help", "save",
            "cancel", "ok", "error", "warning", "breaking", "news", "live", "today", "now",
            "report", "story", "update", "new", "you", "your", "we", "our", "can", "will",
            "has", "have", "had", "do", "does", "did", "he", "she", "they", "them", "his",
            "her", "out", "up", "down", "left", "right", "next", "back", "home", "page",
            "door", "scanned", "document",
        ]
        .into_iter()
        .collect()
    })
}

fn is_dictionary_word(word: &str) -> bool {
    common_words().contains(word.to_lowercase().as_str())
}

/// Replaces every confusable digit in `word` with the letter it most
/// plausibly stands for, choosing lowercase when the word's other
/// letters are lowercase and uppercase when they're uppercase. Returns
/// `None` if the word has no alphabetic context to judge case from, or
/// no confusable digit was present.
fn substitute_digits(word: &str) -> Option<String> {
    let has_lower = word.chars().any(|c| c.is_lowercase());
    let has_alpha = word.chars().any(|c| c.is_alphabetic());
    if !has_alpha {
        return None;
    }
    let mut out = String::with_capacity(word.len());
    let mut changed = false;
    for c in word.chars() {
        let variants = confusable_variants(c);
        if variants.is_empty() {
            out.push(c);
            continue;
        }
        changed = true;
        let chosen = if has_lower {
            variants.iter().find(|v| v.is_lowercase()).copied().unwrap_or(c)
        } else {
            variants.iter().find(|v| v.is_uppercase()).copied().unwrap_or(c)
        };
        out.push(chosen);
    }
    changed.then_some(out)
}

/// Tries every tier-1 substitution (multi-character patterns, then
/// per-character digit confusions layered on top of each pattern
/// candidate) and keeps the first one that resolves to a real
/// dictionary word. Leaves `word` untouched if none do.
fn correct_word(word: &str) -> String {
    if word.is_empty() || is_dictionary_word(word) {
        return word.to_string();
    }

    let mut candidates = vec![word.to_string()];
    for (pattern, replacement) in TIER1_MULTI_CHAR_PATTERNS {
        if word.contains(pattern) {
            candidates.push(word.replace(pattern, replacement));
        }
    }
    let digit_candidates: Vec<String> = candidates.iter().filter_map(|c| substitute_digits(c)).collect();
    candidates.extend(digit_candidates);

    candidates
        .into_iter()
        .find(|candidate| candidate != word && is_dictionary_word(candidate))
        .unwrap_or_else(|| word.to_string())
}

/// A cheap spell-check score in `[0, 1]`: the fraction of whitespace
/// tokens that are either a known common word or plausible as a proper
/// noun/number (alphabetic, or alphanumeric of length > 1).
pub fn spell_check_score(text: &str) -> f64 {
    let tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace())
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return 0.0;
    }
    let plausible = tokens
        .iter()
        .filter(|t| {
            common_words().contains(&t.to_lowercase().as_str())
                || t.chars().next().is_some_and(|c| c.is_uppercase())
        })
        .count();
    plausible as f64 / tokens.len() as f64
}

/// Splits `text` into alphanumeric-run "words" versus everything else
/// (whitespace, punctuation, which pass through unchanged), correcting
/// each word independently and in isolation so one occurrence's
/// dictionary match can't leak into an unrelated word elsewhere in the
/// string.
fn apply_tier1_substitutions(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut current_word = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() {
            current_word.push(c);
        } else {
            if !current_word.is_empty() {
                out.push_str(&correct_word(&current_word));
                current_word.clear();
            }
            out.push(c);
        }
    }
    if !current_word.is_empty() {
        out.push_str(&correct_word(&current_word));
    }
    out
}

/// Tier 1: per-occurrence, dictionary-guarded substitution (spec.md
/// §4.5 step 7). Each word is corrected independently of the others.
pub fn tier1_correct(text: &str) -> String {
    apply_tier1_substitutions(text)
}

/// Common English letter bigrams, weighted by rough relative frequency.
/// Unlisted bigrams score 0 and pull the overall perplexity toward the
/// neutral baseline rather than penalizing unfamiliar but valid text
/// (proper nouns, numbers).
fn bigram_weights() -> &'static HashMap<(char, char), f64> {
    static WEIGHTS: OnceLock<HashMap<(char, char), f64>> = OnceLock::new();
    WEIGHTS.get_or_init(|| {
        let pairs: &[(&str, f64)] = &[
            ("th", 15.0), ("he", 14.0), ("in", 10.0), ("er", 10.0), ("an", 9.0), ("re", 8.5),
            ("on", 8.0), ("at", 7.5), ("en", 7.0), ("nd", 6.5), ("ti", 6.0), ("es", 6.0),
            ("or", 5.5), ("te", 5.5), ("of", 5.0), ("ed", 5.0), ("is", 5.0), ("it", 5.0),
            ("al", 4.5), ("ar", 4.5), ("st", 4.5), ("to", 4.5), ("nt", 4.0), ("ng", 4.0),
            ("se", 4.0), ("ha", 4.0), ("as", 4.0), ("ou", 3.5), ("io", 3.5), ("le", 3.5),
            ("ve", 3.5), ("co", 3.0), ("me", 3.0), ("de", 3.0), ("hi", 3.0), ("ri", 3.0),
            ("ro", 3.0), ("ic", 2.5), ("ne", 2.5), ("ea", 2.5), ("ra", 2.5), ("ce", 2.5),
        ];
        pairs
            .iter()
            .map(|(bigram, weight)| {
                let mut chars = bigram.chars();
                ((chars.next().unwrap(), chars.next().unwrap()), *weight)
            })
            .collect()
    })
}

const NEUTRAL_PERPLEXITY: f64 = 50.0;

/// A rough "naturalness" score where `NEUTRAL_PERPLEXITY` (50) is the
/// baseline for text with no recognizable bigrams (short tokens,
/// numbers) and higher values indicate increasingly common English
/// letter sequences.
pub fn bigram_perplexity(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let letters: Vec<char> = lowered.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 2 {
        return NEUTRAL_PERPLEXITY;
    }
    let weights = bigram_weights();
    let mut total = 0.0;
    let mut count = 0;
    for pair in letters.windows(2) {
        let key = (pair[0], pair[1]);
        total += weights.get(&key).copied().unwrap_or(0.0);
        count += 1;
    }
    if count == 0 {
        NEUTRAL_PERPLEXITY
    } else {
        NEUTRAL_PERPLEXITY + (total / count as f64) * 2.0
    }
}

/// Tier 2: pick whichever of `raw` or its tier-1-corrected form scores
/// higher under the bigram model, breaking ties toward the tier-1
/// candidate (every word in it already passed a dictionary check to get
/// this far).
pub fn tier2_correct(raw: &str) -> String {
    let tier1 = tier1_correct(raw);
    if tier1 == raw {
        return raw.to_string();
    }
    let raw_score = bigram_perplexity(raw);
    let tier1_score = bigram_perplexity(&tier1);
    if tier1_score >= raw_score {
        tier1
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_zero_corrected_to_letter_o_in_word_context() {
        assert_eq!(tier1_correct("0PEN D00R"), "OPEN DOOR");
    }

    #[test]
    fn bare_digits_are_left_alone() {
        assert_eq!(tier1_correct("12345"), "12345");
    }

    #[test]
    fn rn_confusion_corrected_to_m() {
        assert_eq!(tier1_correct("rnenu"), "menu");
    }

    #[test]
    fn scanned_document_scenario_corrects_every_confusable_word() {
        assert_eq!(tier1_correct("Th1s 1s a 5canned d0cument"), "This is a scanned document");
    }

    #[test]
    fn unrecognized_lowercase_word_is_left_alone() {
        // "morning" contains an "rn" cluster; since neither reading is a
        // known word or capitalized, the substitution must not win.
        assert_eq!(tier1_correct("morning"), "morning");
    }

    #[test]
    fn common_word_scores_above_threshold() {
        assert!(spell_check_score("the menu is open") >= 0.5);
    }

    #[test]
    fn neutral_perplexity_for_digits_only() {
        assert_eq!(bigram_perplexity("42"), NEUTRAL_PERPLEXITY);
    }

    #[test]
    fn common_english_text_scores_above_neutral() {
        assert!(bigram_perplexity("the quick brown fox") > NEUTRAL_PERPLEXITY);
    }
}
