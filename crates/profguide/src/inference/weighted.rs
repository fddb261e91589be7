//! Linear weighted scoring, the predecessor of the certainty-factor pipeline.
//!
//! Every answered rule adds `ordinal * weight` to a profession's score and
//! `3 * |weight|` to its ceiling. No noise filtering is applied.

use serde::{Deserialize, Serialize};

use super::ranking::round_to;
use super::ProfessionSlots;
use crate::knowledge::{AnswerSet, KnowledgeBase, ProfessionId};

const MAX_ORDINAL: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedRecommendation {
    pub id: ProfessionId,
    pub name: String,
    pub description: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    score: f64,
    max_score: f64,
}

/// Scores every profession and returns the best `top_n` by percentage.
pub fn weighted_scores(
    knowledge_base: &KnowledgeBase,
    answers: &AnswerSet,
    top_n: usize,
) -> Vec<WeightedRecommendation> {
    let slots = ProfessionSlots::new(&knowledge_base.professions);
    let mut tallies = vec![Tally::default(); slots.len()];

    for rule in &knowledge_base.rules {
        let Some(ordinal) = answers.get(&rule.question_id) else {
            continue;
        };

        for (profession, weight) in rule.professions.iter() {
            if let Some(tally) = slots.slot(profession).and_then(|slot| tallies.get_mut(slot)) {
                tally.score += ordinal as f64 * weight;
                tally.max_score += MAX_ORDINAL * weight.abs();
            }
        }
    }

    let mut results: Vec<WeightedRecommendation> = slots
        .iter()
        .map(|(slot, profession)| {
            let tally = tallies[slot];
            let percentage = if tally.max_score > 0.0 {
                tally.score / tally.max_score * 100.0
            } else {
                0.0
            };
            WeightedRecommendation {
                id: profession.id.clone(),
                name: profession.name.clone(),
                description: profession.description.clone(),
                score: tally.score,
                max_score: tally.max_score,
                percentage: round_to(percentage, 1),
            }
        })
        .collect();

    results.sort_by(|left, right| right.percentage.total_cmp(&left.percentage));
    results.truncate(top_n);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{Profession, QuestionId, Rule, WeightMap};

    fn knowledge_base() -> KnowledgeBase {
        let professions = ["pA", "pB", "pC"]
            .iter()
            .map(|id| Profession {
                id: ProfessionId::from(*id),
                name: id.to_string(),
                description: String::new(),
            })
            .collect();
        KnowledgeBase {
            questions: Vec::new(),
            professions,
            rules: vec![
                Rule {
                    question_id: QuestionId::from("q1"),
                    professions: [("pA", 0.5), ("pB", -1.0)].into_iter().collect::<WeightMap>(),
                },
                Rule {
                    question_id: QuestionId::from("q2"),
                    professions: [("pB", 1.0)].into_iter().collect::<WeightMap>(),
                },
            ],
        }
    }

    #[test]
    fn percentage_is_score_over_ceiling() {
        let answers: AnswerSet = [("q1", 2)].into_iter().collect();
        let results = weighted_scores(&knowledge_base(), &answers, 5);

        let first = &results[0];
        assert_eq!(first.id.as_str(), "pA");
        assert_eq!(first.score, 1.0);
        assert_eq!(first.max_score, 1.5);
        assert_eq!(first.percentage, 66.7);
    }

    #[test]
    fn truncates_to_top_n_and_keeps_untouched_professions_at_zero() {
        let answers: AnswerSet = [("q1", 3), ("q2", 3)].into_iter().collect();
        let results = weighted_scores(&knowledge_base(), &answers, 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id.as_str(), "pA");
        assert_eq!(results[0].percentage, 100.0);
        // pB: (-3 + 3) / 6 and pC: untouched, both 0.0; pB comes first
        assert_eq!(results[1].id.as_str(), "pB");
        assert_eq!(results[1].percentage, 0.0);
    }
}
