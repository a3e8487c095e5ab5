//! Signal-key glob matching and the `@collection` catalog (spec.md §4.1).

use std::collections::BTreeSet;

use wildmatch::WildMatch;

use crate::error::{CoreError, CoreReason};

/// Expands `@name` collections into their underlying key patterns. Order
/// matches the table in spec.md §4.1.
fn expand_collection(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "identity" => Some(&["identity.*"]),
        "motion" => Some(&["motion.*", "complexity.*"]),
        "color" => Some(&["color.*"]),
        "quality" => Some(&["quality.*"]),
        "text" => Some(&["content.text*", "ocr.*", "vision.llm.text"]),
        "vision" => Some(&["vision.*"]),
        "alttext" => Some(&["vision.llm.caption", "content.text*", "motion.summary"]),
        "tool" => Some(&[
            "identity.*",
            "color.dominant*",
            "motion.*",
            "vision.llm.*",
            "ocr.voting.*",
        ]),
        "all" => Some(&["*"]),
        _ => None,
    }
}

/// Parses a comma-separated requested-signals query (spec.md §6) into a
/// flat list of glob patterns, expanding `@collection` references.
pub fn parse_patterns(query: &str) -> Result<Vec<String>, CoreError> {
    let mut patterns = Vec::new();
    for raw in query.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some(name) = raw.strip_prefix('@') {
            match expand_collection(name) {
                Some(expanded) => patterns.extend(expanded.iter().map(|s| s.to_string())),
                None => {
                    return Err(CoreError::from(CoreReason::GlobPattern)
                        .with_detail(format!("unknown collection @{name}")))
                }
            }
        } else {
            patterns.push(raw.to_string());
        }
    }
    Ok(patterns)
}

/// A single compiled glob pattern over signal keys. Keys are dotted,
/// lowercase, ASCII; `*` matches any suffix, `name*` is a prefix match,
/// anything without a `*` is a literal.
#[derive(Debug, Clone)]
pub struct KeyGlob {
    raw: String,
    matcher: WildMatch,
}

impl KeyGlob {
    pub fn new(pattern: impl Into<String>) -> Self {
        let raw = pattern.into();
        KeyGlob {
            matcher: WildMatch::new(&raw),
            raw,
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        self.matcher.matches(key)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Maps a signal-key prefix to the minimum wave tags able to produce it
/// (the authoritative table in spec.md §4.1).
fn tag_for_prefix(prefix: &str) -> Option<&'static [&'static str]> {
    match prefix {
        p if p.starts_with("motion.") || p.starts_with("complexity.") => Some(&["motion"]),
        p if p.starts_with("color.") => Some(&["color"]),
        p if p.starts_with("ocr.") || p.starts_with("content.text") => Some(&["ocr", "content"]),
        p if p.starts_with("vision.") => Some(&["vision", "llm"]),
        p if p.starts_with("identity.") => Some(&["identity"]),
        p if p.starts_with("quality.") => Some(&["quality"]),
        p if p.starts_with("face.") => Some(&["face"]),
        p if p.starts_with("clip.") => Some(&["clip", "embedding"]),
        _ => None,
    }
}

/// Given the patterns from a requested-signals query, compute the union of
/// wave tags needed to satisfy them. A bare `*` or `@all` pattern (not
/// tied to a known prefix) returns `None`, meaning "run every wave".
pub fn required_wave_tags(patterns: &[String]) -> Option<BTreeSet<&'static str>> {
    let mut tags = BTreeSet::new();
    for pattern in patterns {
        match tag_for_prefix(pattern) {
            Some(found) => tags.extend(found.iter().copied()),
            None => return None,
        }
    }
    Some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_collection() {
        let patterns = parse_patterns("@identity,@color").unwrap();
        assert_eq!(patterns, vec!["identity.*", "color.*"]);
    }

    #[test]
    fn rejects_unknown_collection() {
        assert!(parse_patterns("@nonexistent").is_err());
    }

    #[test]
    fn wildcard_matches_suffix() {
        let g = KeyGlob::new("motion.*");
        assert!(g.matches("motion.summary"));
        assert!(!g.matches("color.dominant"));
    }

    #[test]
    fn prefix_without_dot_star_matches_literal_prefix() {
        let g = KeyGlob::new("content.text*");
        assert!(g.matches("content.text_likeliness"));
        assert!(g.matches("content.text"));
    }

    #[test]
    fn required_tags_union_across_patterns() {
        let patterns = vec!["motion.*".to_string(), "color.*".to_string()];
        let tags = required_wave_tags(&patterns).unwrap();
        assert!(tags.contains("motion"));
        assert!(tags.contains("color"));
    }

    #[test]
    fn all_collection_means_every_wave() {
        let patterns = parse_patterns("@all").unwrap();
        assert_eq!(required_wave_tags(&patterns), None);
    }
}
