//! Multi-frame OCR: frame dedup, stabilization, temporal median
//! compositing, temporal voting, and the tiered correction cascade
//! (spec.md §4.5, "the hardest subsystem").

pub mod correction;
pub mod frames;
pub mod pipeline;
pub mod quality;
pub mod sentinel;
pub mod stabilization;
pub mod temporal_median;
pub mod verification;
pub mod voting;

pub use correction::{bigram_perplexity, spell_check_score, tier1_correct, tier2_correct};
pub use frames::dedup_indices;
pub use pipeline::{run, FinalRegion, OcrPipelineResult};
pub use quality::{PhaseTable, QualityMode};
pub use sentinel::sentinel_reread;
pub use stabilization::{stabilize, stabilize_all, StabilizedFrame};
pub use temporal_median::median_composite;
pub use verification::{jaccard_concordance, verify, VerificationOutcome};
pub use voting::{vote, VotedRegion};
