use serde::{Deserialize, Serialize};

use super::combine::CertaintyAccumulator;
use super::config::RankingOptions;
use super::ProfessionSlots;
use crate::knowledge::ProfessionId;

/// Final belief in one profession, ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub id: ProfessionId,
    pub name: String,
    pub description: String,
    /// Accumulated certainty factor rounded to four places.
    pub raw_cf: f64,
    /// `raw_cf` scaled to 0..=100, with disconfirmed professions shown as zero.
    pub percentage: f64,
}

pub(crate) fn rank(
    slots: &ProfessionSlots<'_>,
    accumulator: &CertaintyAccumulator,
    top_n: usize,
    options: RankingOptions,
) -> Vec<RecommendationResult> {
    let mut results: Vec<RecommendationResult> = slots
        .iter()
        .map(|(slot, profession)| {
            let cf = accumulator.get(slot);
            RecommendationResult {
                id: profession.id.clone(),
                name: profession.name.clone(),
                description: profession.description.clone(),
                raw_cf: round_to(cf, 4),
                percentage: round_to((cf * 100.0).max(0.0), 1),
            }
        })
        .collect();

    // stable: ties keep knowledge-base order
    results.sort_by(|left, right| right.raw_cf.total_cmp(&left.raw_cf));

    if options.positive_only {
        results.retain(|result| result.raw_cf > 0.0);
    }
    if options.truncate {
        results.truncate(top_n);
    }
    results
}

/// Rounds the exact binary value to `places` decimals, ties to even, and folds
/// `-0.0` into `0.0`.
pub(crate) fn round_to(value: f64, places: usize) -> f64 {
    let rounded = format!("{value:.places$}")
        .parse::<f64>()
        .unwrap_or(value);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
