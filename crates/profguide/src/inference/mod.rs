//! Certainty-factor inference over a knowledge-base snapshot.
//!
//! Answers flow one way through the pipeline: the evidence table turns each
//! ordinal into a signed CF, the rule evaluator derives per-profession
//! contributions, the combinator folds them into one belief per profession,
//! and the ranker orders the result.

mod combine;
mod config;
mod evidence;
mod ranking;
mod rules;
mod weighted;

pub use combine::combine;
pub use config::{
    EngineConfig, RankingOptions, ScoringMethod, CONTRIBUTION_THRESHOLD, DEFAULT_EVIDENCE,
    EVIDENCE_THRESHOLD,
};
pub use evidence::EvidenceTable;
pub use ranking::RecommendationResult;
pub use weighted::{weighted_scores, WeightedRecommendation};

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::knowledge::{AnswerSet, KnowledgeBase, Profession, ProfessionId};
use combine::CertaintyAccumulator;

/// Stateless engine bound to one immutable knowledge-base snapshot.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    knowledge_base: Arc<KnowledgeBase>,
    config: EngineConfig,
}

impl InferenceEngine {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, config: EngineConfig) -> Self {
        Self {
            knowledge_base,
            config,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranks every profession by accumulated certainty.
    ///
    /// `top_n` only takes effect when [`RankingOptions::truncate`] is set.
    pub fn get_recommendations(
        &self,
        answers: &AnswerSet,
        top_n: usize,
    ) -> Vec<RecommendationResult> {
        let slots = ProfessionSlots::new(&self.knowledge_base.professions);
        let mut accumulator = CertaintyAccumulator::new(slots.len());

        let contributions =
            rules::contributions(&self.knowledge_base.rules, &slots, answers, &self.config);
        for contribution in contributions {
            accumulator.absorb(contribution.slot, contribution.cf);
        }

        ranking::rank(&slots, &accumulator, top_n, self.config.ranking)
    }

    /// Runs the linear weighted scorer over the same snapshot.
    pub fn weighted_recommendations(
        &self,
        answers: &AnswerSet,
        top_n: usize,
    ) -> Vec<WeightedRecommendation> {
        weighted_scores(&self.knowledge_base, answers, top_n)
    }

    pub fn recommend(
        &self,
        answers: &AnswerSet,
        method: ScoringMethod,
        top_n: usize,
    ) -> RecommendationList {
        match method {
            ScoringMethod::CertaintyFactor => {
                RecommendationList::CertaintyFactor(self.get_recommendations(answers, top_n))
            }
            ScoringMethod::Weighted => {
                RecommendationList::Weighted(self.weighted_recommendations(answers, top_n))
            }
        }
    }
}

/// Output of either scoring method, serialized as a bare list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendationList {
    CertaintyFactor(Vec<RecommendationResult>),
    Weighted(Vec<WeightedRecommendation>),
}

impl RecommendationList {
    pub fn len(&self) -> usize {
        match self {
            RecommendationList::CertaintyFactor(results) => results.len(),
            RecommendationList::Weighted(results) => results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Accumulator slot assignment for the professions of one snapshot.
///
/// A repeated profession id keeps the slot of its first occurrence.
pub(crate) struct ProfessionSlots<'a> {
    ordered: Vec<&'a Profession>,
    index: HashMap<&'a ProfessionId, usize>,
}

impl<'a> ProfessionSlots<'a> {
    pub(crate) fn new(professions: &'a [Profession]) -> Self {
        let mut ordered = Vec::with_capacity(professions.len());
        let mut index = HashMap::with_capacity(professions.len());
        for profession in professions {
            if index.contains_key(&profession.id) {
                debug!(profession = %profession.id, "duplicate profession id ignored");
                continue;
            }
            index.insert(&profession.id, ordered.len());
            ordered.push(profession);
        }
        Self { ordered, index }
    }

    pub(crate) fn slot(&self, id: &ProfessionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &'a Profession)> + '_ {
        self.ordered.iter().copied().enumerate()
    }
}
