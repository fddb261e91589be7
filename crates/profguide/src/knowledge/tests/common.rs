use std::sync::{mpsc, Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::knowledge::repository::{KnowledgeBaseStore, StoreError};
use crate::knowledge::{
    knowledge_router, KnowledgeBase, KnowledgeBaseService, Profession, ProfessionId, Question,
    QuestionId, Rule, ServiceSettings, WeightMap,
};

pub(super) fn question(id: &str, text: &str) -> Question {
    Question {
        id: QuestionId::from(id),
        text: text.to_string(),
        answers: ["Definitely not", "Probably not", "Probably yes", "Yes"]
            .iter()
            .map(|label| label.to_string())
            .collect(),
    }
}

pub(super) fn profession(id: &str, name: &str) -> Profession {
    Profession {
        id: ProfessionId::from(id),
        name: name.to_string(),
        description: format!("{name} description"),
    }
}

pub(super) fn rule(question_id: &str, weights: &[(&str, f64)]) -> Rule {
    Rule {
        question_id: QuestionId::from(question_id),
        professions: weights.iter().copied().collect::<WeightMap>(),
    }
}

/// Two questions, three professions; `designer` is never referenced by a rule.
pub(super) fn knowledge_base() -> KnowledgeBase {
    KnowledgeBase {
        questions: vec![
            question("q1", "Do you enjoy solving logic puzzles?"),
            question("q2", "Do you like working with people?"),
        ],
        professions: vec![
            profession("developer", "Software developer"),
            profession("teacher", "Teacher"),
            profession("designer", "Designer"),
        ],
        rules: vec![
            rule("q1", &[("developer", 0.8), ("teacher", -0.3)]),
            rule("q2", &[("teacher", 0.9), ("developer", -0.4)]),
        ],
    }
}

pub(super) fn build_service() -> (KnowledgeBaseService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::seeded(knowledge_base()));
    let service = KnowledgeBaseService::open(store.clone(), ServiceSettings::default())
        .expect("service opens");
    (service, store)
}

pub(super) fn router_with_service(service: KnowledgeBaseService<MemoryStore>) -> axum::Router {
    knowledge_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) saved: Arc<Mutex<Option<KnowledgeBase>>>,
    pub(super) saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub(super) fn seeded(knowledge_base: KnowledgeBase) -> Self {
        Self {
            saved: Arc::new(Mutex::new(Some(knowledge_base))),
            saves: Arc::default(),
        }
    }

    pub(super) fn stored(&self) -> Option<KnowledgeBase> {
        self.saved.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn save_count(&self) -> usize {
        *self.saves.lock().expect("store mutex poisoned")
    }
}

impl KnowledgeBaseStore for MemoryStore {
    fn load(&self) -> Result<Option<KnowledgeBase>, StoreError> {
        Ok(self.stored())
    }

    fn save(&self, knowledge_base: &KnowledgeBase) -> Result<(), StoreError> {
        *self.saved.lock().expect("store mutex poisoned") = Some(knowledge_base.clone());
        *self.saves.lock().expect("store mutex poisoned") += 1;
        Ok(())
    }
}

pub(super) struct ReadOnlyStore;

impl KnowledgeBaseStore for ReadOnlyStore {
    fn load(&self) -> Result<Option<KnowledgeBase>, StoreError> {
        Ok(Some(knowledge_base()))
    }

    fn save(&self, _knowledge_base: &KnowledgeBase) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read only".to_string()))
    }
}

/// Store whose `save` signals entry and then waits to be released.
pub(super) struct GatedStore {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl GatedStore {
    pub(super) fn new(entered: mpsc::Sender<()>, release: mpsc::Receiver<()>) -> Self {
        Self {
            entered: Mutex::new(entered),
            release: Mutex::new(release),
        }
    }
}

impl KnowledgeBaseStore for GatedStore {
    fn load(&self) -> Result<Option<KnowledgeBase>, StoreError> {
        Ok(Some(knowledge_base()))
    }

    fn save(&self, _knowledge_base: &KnowledgeBase) -> Result<(), StoreError> {
        let _ = self.entered.lock().expect("gate mutex poisoned").send(());
        let _ = self.release.lock().expect("gate mutex poisoned").recv();
        Ok(())
    }
}
