//! Questionnaire knowledge base: domain model, storage seam, editing service,
//! and the HTTP surface over both.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AnswerSet, KnowledgeBase, KnowledgeBaseStats, Profession, ProfessionId, Question, QuestionId,
    Rule, WeightMap, ANSWER_LABEL_COUNT, DEFAULT_ANSWER_LABELS,
};
pub use repository::{KnowledgeBaseStore, StoreError};
pub use router::knowledge_router;
pub use service::{KnowledgeBaseError, KnowledgeBaseService, ServiceSettings, DEFAULT_TOP_N};
