//! Purpose-driven weight table (spec.md §4.7, table reproduced verbatim
//! for behavioural equivalence).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    AltText,
    Caption,
    SocialMedia,
    Verbose,
    Markdown,
    Technical,
    Tool,
    Default,
}

/// The nine salience categories, in the order the weight table is written
/// in spec.md §4.7: subjects, entities, motion, text, scene, colors,
/// quality, identity, caption-from-llm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Subjects,
    Entities,
    Motion,
    Text,
    Scene,
    Colors,
    Quality,
    Identity,
    CaptionFromLlm,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Subjects,
        Category::Entities,
        Category::Motion,
        Category::Text,
        Category::Scene,
        Category::Colors,
        Category::Quality,
        Category::Identity,
        Category::CaptionFromLlm,
    ];
}

/// `weight(purpose, category)` from the fixed table in spec.md §4.7.
/// `caption`/`socialmedia` share a row, as do `verbose`/`markdown` and
/// `technical`/`tool`.
pub fn weight_for(purpose: Purpose, category: Category) -> f64 {
    use Category::*;
    use Purpose::*;
    let row: [f64; 9] = match purpose {
        AltText => [1.0, 0.9, 0.85, 0.7, 0.5, 0.1, 0.0, 0.0, 0.95],
        Caption | SocialMedia => [1.0, 0.85, 0.8, 0.6, 0.7, 0.3, 0.1, 0.1, 0.9],
        Verbose | Markdown => [1.0, 0.9, 0.85, 0.8, 0.75, 0.6, 0.5, 0.7, 0.85],
        Technical | Tool => [0.5, 0.6, 0.7, 0.8, 0.5, 0.9, 1.0, 1.0, 0.3],
        Default => [0.9, 0.8, 0.8, 0.7, 0.6, 0.4, 0.3, 0.3, 0.85],
    };
    let index = match category {
        Subjects => 0,
        Entities => 1,
        Motion => 2,
        Text => 3,
        Scene => 4,
        Colors => 5,
        Quality => 6,
        Identity => 7,
        CaptionFromLlm => 8,
    };
    row[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alttext_favors_subjects_over_quality() {
        assert_eq!(weight_for(Purpose::AltText, Category::Subjects), 1.0);
        assert_eq!(weight_for(Purpose::AltText, Category::Quality), 0.0);
    }

    #[test]
    fn technical_favors_quality_over_subjects() {
        assert_eq!(weight_for(Purpose::Technical, Category::Quality), 1.0);
        assert_eq!(weight_for(Purpose::Technical, Category::Subjects), 0.5);
    }

    #[test]
    fn caption_and_socialmedia_share_weights() {
        for c in Category::ALL {
            assert_eq!(weight_for(Purpose::Caption, c), weight_for(Purpose::SocialMedia, c));
        }
    }
}
