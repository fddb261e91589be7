use metrics_exporter_prometheus::PrometheusHandle;
use profguide::error::AppError;
use profguide::knowledge::{AnswerSet, KnowledgeBase, KnowledgeBaseStore, StoreError};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Knowledge base persisted as one pretty-printed JSON document.
#[derive(Debug, Clone)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl KnowledgeBaseStore for JsonFileStore {
    fn load(&self) -> Result<Option<KnowledgeBase>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, knowledge_base: &KnowledgeBase) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(knowledge_base)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Volatile store backing the demo command.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemoryStore {
    document: Arc<Mutex<Option<KnowledgeBase>>>,
}

impl InMemoryStore {
    pub(crate) fn seeded(knowledge_base: KnowledgeBase) -> Self {
        Self {
            document: Arc::new(Mutex::new(Some(knowledge_base))),
        }
    }
}

impl KnowledgeBaseStore for InMemoryStore {
    fn load(&self) -> Result<Option<KnowledgeBase>, StoreError> {
        let guard = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, knowledge_base: &KnowledgeBase) -> Result<(), StoreError> {
        let mut guard = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(knowledge_base.clone());
        Ok(())
    }
}

/// Reads a knowledge base file, failing when it is absent.
pub(crate) fn read_knowledge_base(path: &Path) -> Result<KnowledgeBase, AppError> {
    JsonFileStore::new(path)
        .load()?
        .ok_or_else(|| AppError::Input(format!("{} does not exist", path.display())))
}

/// Reads a `{"question_id": ordinal}` answers file.
pub(crate) fn load_answers(path: &Path) -> Result<AnswerSet, AppError> {
    let raw = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&raw)
        .map_err(|err| AppError::Input(format!("{}: {err}", path.display())))?;
    let answers: Map<String, Value> = match document {
        Value::Object(answers) => answers,
        _ => {
            return Err(AppError::Input(format!(
                "{}: answers file must be a JSON object",
                path.display()
            )))
        }
    };
    Ok(AnswerSet::from_raw(answers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use profguide::knowledge::{Profession, ProfessionId, QuestionId};
    use tempfile::tempdir;

    fn sample() -> KnowledgeBase {
        KnowledgeBase {
            professions: vec![Profession {
                id: ProfessionId::from("chef"),
                name: "Chef".to_string(),
                description: "Runs a kitchen".to_string(),
            }],
            ..KnowledgeBase::empty()
        }
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.load().expect("load succeeds").is_none());
    }

    #[test]
    fn save_then_load_restores_document() {
        let dir = tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("nested").join("kb.json"));
        store.save(&sample()).expect("save succeeds");

        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().expect("load succeeds"), Some(sample()));
    }

    #[test]
    fn malformed_document_is_a_format_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("kb.json");
        fs::write(&path, "{ not json").expect("write fixture");

        let error = JsonFileStore::new(path).load().expect_err("parse fails");
        assert!(matches!(error, StoreError::Format(_)));
    }

    #[test]
    fn read_knowledge_base_requires_the_file() {
        let dir = tempdir().expect("tempdir");
        let error = read_knowledge_base(&dir.path().join("kb.json")).expect_err("missing");
        assert!(matches!(error, AppError::Input(_)));
    }

    #[test]
    fn answers_file_accepts_numbers_and_numeric_strings() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("answers.json");
        fs::write(&path, r#"{"q1": 3, "q2": "1", "q3": "maybe"}"#).expect("write fixture");

        let answers = load_answers(&path).expect("answers load");
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get(&QuestionId::from("q1")), Some(3));
        assert_eq!(answers.get(&QuestionId::from("q2")), Some(1));
    }

    #[test]
    fn answers_file_must_be_an_object() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("answers.json");
        fs::write(&path, "[3, 1]").expect("write fixture");

        assert!(matches!(load_answers(&path), Err(AppError::Input(_))));
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryStore::default();
        assert!(store.load().expect("load").is_none());
        store.save(&sample()).expect("save");
        assert_eq!(store.load().expect("load"), Some(sample()));
        assert_eq!(InMemoryStore::seeded(sample()).load().expect("load"), Some(sample()));
    }
}
