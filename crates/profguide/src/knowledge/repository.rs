use super::domain::KnowledgeBase;

/// Durable home of the knowledge base, so the service can be exercised in isolation.
pub trait KnowledgeBaseStore: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<KnowledgeBase>, StoreError>;
    fn save(&self, knowledge_base: &KnowledgeBase) -> Result<(), StoreError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("knowledge base storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored knowledge base is malformed: {0}")]
    Format(#[from] serde_json::Error),
    #[error("knowledge base storage unavailable: {0}")]
    Unavailable(String),
}
