//! Salience fusion, the temporal-verb gate, and the alt-text budget
//! algorithm (spec.md §4.7).

pub mod alttext;
pub mod candidate;
pub mod fusion;
pub mod gate;
pub mod purpose;

pub use alttext::{to_alt_text_context, AltTextInputs};
pub use candidate::{CandidateValue, SalienceCandidate};
pub use fusion::{render, render_default, DEFAULT_MAX_SIGNALS};
pub use gate::{apply as apply_temporal_verb_gate, GATED_VERBS};
pub use purpose::{weight_for, Category, Purpose};
