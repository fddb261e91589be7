use serde::{Deserialize, Serialize};

use super::config::DEFAULT_EVIDENCE;

/// Maps answer ordinals to signed evidence certainty factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceTable([f64; 4]);

impl EvidenceTable {
    pub fn new(values: [f64; 4]) -> Self {
        Self(values)
    }

    /// Evidence for an ordinal; anything outside 0..=3 is no evidence.
    pub fn evidence_for(&self, ordinal: i64) -> f64 {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| self.0.get(index).copied())
            .unwrap_or(0.0)
    }
}

impl Default for EvidenceTable {
    fn default() -> Self {
        Self(DEFAULT_EVIDENCE)
    }
}
