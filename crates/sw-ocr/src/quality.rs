//! The quality-mode phase table driving how much work the multi-frame
//! pipeline does per image (spec.md §4.5 "quality modes").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMode {
    Fast,
    Balanced,
    Quality,
    Ultra,
}

impl Default for QualityMode {
    fn default() -> Self {
        QualityMode::Balanced
    }
}

/// Per-mode knobs: how many frames feed temporal voting before the
/// pipeline stops accumulating evidence, and the primary-pass confidence
/// above which it exits early without ever running the voting stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTable {
    pub max_frames_for_voting: usize,
    pub early_exit_threshold: f64,
    pub run_stabilization: bool,
    pub run_tier2_correction: bool,
    pub run_tier3_correction: bool,
}

impl QualityMode {
    pub fn phase_table(self) -> PhaseTable {
        match self {
            QualityMode::Fast => PhaseTable {
                max_frames_for_voting: 5,
                early_exit_threshold: 0.90,
                run_stabilization: false,
                run_tier2_correction: false,
                run_tier3_correction: false,
            },
            QualityMode::Balanced => PhaseTable {
                max_frames_for_voting: 8,
                early_exit_threshold: 0.95,
                run_stabilization: true,
                run_tier2_correction: true,
                run_tier3_correction: false,
            },
            QualityMode::Quality => PhaseTable {
                max_frames_for_voting: 10,
                early_exit_threshold: 0.98,
                run_stabilization: true,
                run_tier2_correction: true,
                run_tier3_correction: true,
            },
            QualityMode::Ultra => PhaseTable {
                max_frames_for_voting: 15,
                early_exit_threshold: 1.0,
                run_stabilization: true,
                run_tier2_correction: true,
                run_tier3_correction: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ultra_never_exits_early() {
        assert_eq!(QualityMode::Ultra.phase_table().early_exit_threshold, 1.0);
    }

    #[test]
    fn frame_budget_increases_with_mode() {
        let fast = QualityMode::Fast.phase_table().max_frames_for_voting;
        let balanced = QualityMode::Balanced.phase_table().max_frames_for_voting;
        let quality = QualityMode::Quality.phase_table().max_frames_for_voting;
        let ultra = QualityMode::Ultra.phase_table().max_frames_for_voting;
        assert!(fast < balanced && balanced < quality && quality < ultra);
    }
}
