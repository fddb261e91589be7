use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use super::domain::{
    KnowledgeBase, KnowledgeBaseStats, Profession, ProfessionId, Question, QuestionId, Rule,
    WeightMap, ANSWER_LABEL_COUNT, DEFAULT_ANSWER_LABELS,
};
use super::repository::{KnowledgeBaseStore, StoreError};
use crate::inference::{EngineConfig, InferenceEngine, RecommendationList, ScoringMethod};
use crate::knowledge::AnswerSet;

/// Number of recommendations requested when the caller does not say.
pub const DEFAULT_TOP_N: usize = 5;

/// Engine tuning plus request defaults applied by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub engine: EngineConfig,
    pub default_top_n: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

/// Owns the current knowledge-base snapshot and serializes edits to it.
///
/// Edits are copy-on-write: the snapshot is cloned, changed, persisted, and
/// swapped in. Engines built before the swap keep their original snapshot.
/// Edits queue on `edits`; readers only contend with the final swap.
pub struct KnowledgeBaseService<S> {
    store: Arc<S>,
    edits: Mutex<()>,
    current: RwLock<Arc<KnowledgeBase>>,
    settings: ServiceSettings,
}

impl<S> KnowledgeBaseService<S>
where
    S: KnowledgeBaseStore + 'static,
{
    /// Loads the stored knowledge base, starting empty when none exists.
    pub fn open(store: Arc<S>, settings: ServiceSettings) -> Result<Self, KnowledgeBaseError> {
        let knowledge_base = store.load()?.unwrap_or_default();
        let stats = knowledge_base.stats();
        info!(
            questions = stats.questions,
            professions = stats.professions,
            rules = stats.rules,
            "knowledge base loaded"
        );
        Ok(Self::with_snapshot(store, knowledge_base, settings))
    }

    pub fn with_snapshot(
        store: Arc<S>,
        knowledge_base: KnowledgeBase,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            edits: Mutex::new(()),
            current: RwLock::new(Arc::new(knowledge_base)),
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stats(&self) -> KnowledgeBaseStats {
        self.snapshot().stats()
    }

    /// Engine bound to the snapshot current at the time of the call.
    pub fn engine(&self) -> InferenceEngine {
        InferenceEngine::new(self.snapshot(), self.settings.engine.clone())
    }

    pub fn recommend(
        &self,
        answers: &AnswerSet,
        method: ScoringMethod,
        top_n: Option<usize>,
    ) -> RecommendationList {
        let top_n = top_n.unwrap_or(self.settings.default_top_n);
        self.engine().recommend(answers, method, top_n)
    }

    /// Adds a question with the next sequential id (`q{N+1}`).
    pub fn add_question(
        &self,
        text: String,
        answers: Option<Vec<String>>,
    ) -> Result<Question, KnowledgeBaseError> {
        let answers = answers.unwrap_or_else(|| {
            DEFAULT_ANSWER_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect()
        });
        ensure_label_count(&answers)?;

        self.edit(|kb| {
            let question = Question {
                id: QuestionId(format!("q{}", kb.questions.len() + 1)),
                text,
                answers,
            };
            kb.questions.push(question.clone());
            Ok(question)
        })
    }

    pub fn update_question(
        &self,
        id: &QuestionId,
        text: Option<String>,
        answers: Option<Vec<String>>,
    ) -> Result<Question, KnowledgeBaseError> {
        if let Some(answers) = &answers {
            ensure_label_count(answers)?;
        }

        self.edit(|kb| {
            let question = kb
                .questions
                .iter_mut()
                .find(|question| question.id == *id)
                .ok_or_else(|| KnowledgeBaseError::QuestionNotFound(id.clone()))?;
            if let Some(text) = text {
                question.text = text;
            }
            if let Some(answers) = answers {
                question.answers = answers;
            }
            Ok(question.clone())
        })
    }

    /// Removes the question together with every rule attached to it.
    pub fn delete_question(&self, id: &QuestionId) -> Result<(), KnowledgeBaseError> {
        self.edit(|kb| {
            kb.questions.retain(|question| question.id != *id);
            kb.rules.retain(|rule| rule.question_id != *id);
            Ok(())
        })
    }

    pub fn add_profession(&self, profession: Profession) -> Result<Profession, KnowledgeBaseError> {
        self.edit(|kb| {
            if kb.profession(&profession.id).is_some() {
                return Err(KnowledgeBaseError::DuplicateProfession(profession.id));
            }
            kb.professions.push(profession.clone());
            Ok(profession)
        })
    }

    pub fn update_profession(
        &self,
        id: &ProfessionId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Profession, KnowledgeBaseError> {
        self.edit(|kb| {
            let profession = kb
                .professions
                .iter_mut()
                .find(|profession| profession.id == *id)
                .ok_or_else(|| KnowledgeBaseError::ProfessionNotFound(id.clone()))?;
            if let Some(name) = name {
                profession.name = name;
            }
            if let Some(description) = description {
                profession.description = description;
            }
            Ok(profession.clone())
        })
    }

    /// Removes the profession and strips it from every rule.
    pub fn delete_profession(&self, id: &ProfessionId) -> Result<(), KnowledgeBaseError> {
        self.edit(|kb| {
            kb.professions.retain(|profession| profession.id != *id);
            for rule in &mut kb.rules {
                rule.professions.remove(id);
            }
            Ok(())
        })
    }

    pub fn add_rule(&self, rule: Rule) -> Result<Rule, KnowledgeBaseError> {
        ensure_weights_in_range(&rule.professions)?;
        self.edit(|kb| {
            kb.rules.push(rule.clone());
            Ok(rule)
        })
    }

    /// Replaces the weights of the first rule attached to `question_id`.
    pub fn update_rule(
        &self,
        question_id: &QuestionId,
        professions: WeightMap,
    ) -> Result<Rule, KnowledgeBaseError> {
        ensure_weights_in_range(&professions)?;
        self.edit(|kb| {
            let rule = kb
                .rules
                .iter_mut()
                .find(|rule| rule.question_id == *question_id)
                .ok_or_else(|| KnowledgeBaseError::RuleNotFound(question_id.clone()))?;
            rule.professions = professions;
            Ok(rule.clone())
        })
    }

    /// Removes every rule attached to `question_id`.
    pub fn delete_rule(&self, question_id: &QuestionId) -> Result<(), KnowledgeBaseError> {
        self.edit(|kb| {
            kb.rules.retain(|rule| rule.question_id != *question_id);
            Ok(())
        })
    }

    /// Swaps in an uploaded knowledge base wholesale.
    pub fn replace(
        &self,
        knowledge_base: KnowledgeBase,
    ) -> Result<KnowledgeBaseStats, KnowledgeBaseError> {
        self.edit(|kb| {
            *kb = knowledge_base;
            Ok(kb.stats())
        })
    }

    /// Starts over with an empty knowledge base.
    pub fn reset(&self) -> Result<Arc<KnowledgeBase>, KnowledgeBaseError> {
        self.edit(|kb| {
            *kb = KnowledgeBase::empty();
            Ok(())
        })?;
        Ok(self.snapshot())
    }

    fn edit<T>(
        &self,
        apply: impl FnOnce(&mut KnowledgeBase) -> Result<T, KnowledgeBaseError>,
    ) -> Result<T, KnowledgeBaseError> {
        let _edit = self.edits.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = KnowledgeBase::clone(&self.snapshot());
        let outcome = apply(&mut next)?;
        self.store.save(&next)?;

        let stats = next.stats();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
        info!(
            questions = stats.questions,
            professions = stats.professions,
            rules = stats.rules,
            "knowledge base snapshot replaced"
        );
        Ok(outcome)
    }
}

fn ensure_label_count(answers: &[String]) -> Result<(), KnowledgeBaseError> {
    if answers.len() == ANSWER_LABEL_COUNT {
        Ok(())
    } else {
        Err(KnowledgeBaseError::InvalidAnswerLabels(answers.len()))
    }
}

fn ensure_weights_in_range(weights: &WeightMap) -> Result<(), KnowledgeBaseError> {
    match weights
        .iter()
        .find(|(_, weight)| !(-1.0..=1.0).contains(weight))
    {
        Some((profession, weight)) => Err(KnowledgeBaseError::InvalidWeight {
            profession: profession.clone(),
            weight,
        }),
        None => Ok(()),
    }
}

/// Error raised by knowledge-base edits.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("question not found: {0}")]
    QuestionNotFound(QuestionId),
    #[error("profession not found: {0}")]
    ProfessionNotFound(ProfessionId),
    #[error("rule not found for question: {0}")]
    RuleNotFound(QuestionId),
    #[error("profession already exists: {0}")]
    DuplicateProfession(ProfessionId),
    #[error("questions need exactly 4 answer labels, got {0}")]
    InvalidAnswerLabels(usize),
    #[error("weight {weight} for profession {profession} is outside [-1, 1]")]
    InvalidWeight { profession: ProfessionId, weight: f64 },
    #[error("invalid knowledge base upload: {0}")]
    InvalidUpload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
