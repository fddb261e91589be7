use serde::{Deserialize, Serialize};

use super::evidence::EvidenceTable;

/// Evidence CF assigned to ordinals 0..=3.
pub const DEFAULT_EVIDENCE: [f64; 4] = [-1.0, -0.5, 0.5, 1.0];

/// Evidence with a smaller magnitude disables the rule for that answer.
pub const EVIDENCE_THRESHOLD: f64 = 0.2;

/// Contributions with a smaller magnitude never reach the combinator.
pub const CONTRIBUTION_THRESHOLD: f64 = 0.2;

/// Tunables for the certainty-factor pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub evidence: EvidenceTable,
    pub evidence_threshold: f64,
    pub contribution_threshold: f64,
    pub ranking: RankingOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evidence: EvidenceTable::default(),
            evidence_threshold: EVIDENCE_THRESHOLD,
            contribution_threshold: CONTRIBUTION_THRESHOLD,
            ranking: RankingOptions::default(),
        }
    }
}

/// Post-ranking filters. Both are off by default, so the full sorted list is
/// returned regardless of `top_n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingOptions {
    /// Keep only the first `top_n` results.
    pub truncate: bool,
    /// Drop results whose rounded CF is not strictly positive.
    pub positive_only: bool,
}

/// Selects which scoring pipeline answers are run through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    #[default]
    CertaintyFactor,
    Weighted,
}

impl ScoringMethod {
    pub fn label(&self) -> &'static str {
        match self {
            ScoringMethod::CertaintyFactor => "certainty_factor",
            ScoringMethod::Weighted => "weighted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "certainty_factor" | "cf" => Some(Self::CertaintyFactor),
            "weighted" => Some(Self::Weighted),
            _ => None,
        }
    }
}
