use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::domain::{
    AnswerSet, KnowledgeBase, Profession, ProfessionId, QuestionId, Rule, WeightMap,
};
use super::repository::KnowledgeBaseStore;
use super::service::{KnowledgeBaseError, KnowledgeBaseService};
use crate::inference::ScoringMethod;

const KNOWLEDGE_BASE_SECTIONS: [&str; 3] = ["questions", "professions", "rules"];

/// Router builder exposing the questionnaire, editing, and analysis endpoints.
pub fn knowledge_router<S>(service: Arc<KnowledgeBaseService<S>>) -> Router
where
    S: KnowledgeBaseStore + 'static,
{
    Router::new()
        .route(
            "/api/questions",
            get(list_questions_handler::<S>).post(add_question_handler::<S>),
        )
        .route(
            "/api/questions/:question_id",
            put(update_question_handler::<S>).delete(delete_question_handler::<S>),
        )
        .route(
            "/api/professions",
            get(list_professions_handler::<S>).post(add_profession_handler::<S>),
        )
        .route(
            "/api/professions/:profession_id",
            put(update_profession_handler::<S>).delete(delete_profession_handler::<S>),
        )
        .route(
            "/api/rules",
            get(list_rules_handler::<S>).post(add_rule_handler::<S>),
        )
        .route(
            "/api/rules/:question_id",
            put(update_rule_handler::<S>).delete(delete_rule_handler::<S>),
        )
        .route("/api/knowledge-base", get(knowledge_base_handler::<S>))
        .route(
            "/api/knowledge-base/download",
            get(knowledge_base_handler::<S>),
        )
        .route(
            "/api/knowledge-base/create-new",
            post(create_new_handler::<S>),
        )
        .route("/api/knowledge-base/upload", post(upload_handler::<S>))
        .route("/api/analyze", post(analyze_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    #[serde(default)]
    pub(crate) answers: Map<String, Value>,
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
    #[serde(default)]
    pub(crate) method: ScoringMethod,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewQuestion {
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) answers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuestionChanges {
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) answers: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfessionChanges {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RuleChanges {
    pub(crate) professions: WeightMap,
}

pub(crate) async fn analyze_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    let answers = AnswerSet::from_raw(request.answers);
    let recommendations = service.recommend(&answers, request.method, request.top_n);
    let payload = json!({
        "success": true,
        "method": request.method.label(),
        "recommendations": recommendations,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn list_questions_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    Json(service.snapshot().questions.clone()).into_response()
}

pub(crate) async fn add_question_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Json(request): Json<NewQuestion>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.add_question(request.text, request.answers) {
        Ok(question) => success_response(json!({ "success": true, "question": question })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_question_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Path(question_id): Path<String>,
    Json(changes): Json<QuestionChanges>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    let id = QuestionId(question_id);
    match service.update_question(&id, changes.text, changes.answers) {
        Ok(question) => success_response(json!({ "success": true, "question": question })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_question_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Path(question_id): Path<String>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.delete_question(&QuestionId(question_id)) {
        Ok(()) => success_response(json!({ "success": true })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_professions_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    Json(service.snapshot().professions.clone()).into_response()
}

pub(crate) async fn add_profession_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Json(profession): Json<Profession>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.add_profession(profession) {
        Ok(profession) => success_response(json!({ "success": true, "profession": profession })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_profession_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Path(profession_id): Path<String>,
    Json(changes): Json<ProfessionChanges>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    let id = ProfessionId(profession_id);
    match service.update_profession(&id, changes.name, changes.description) {
        Ok(profession) => success_response(json!({ "success": true, "profession": profession })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_profession_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Path(profession_id): Path<String>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.delete_profession(&ProfessionId(profession_id)) {
        Ok(()) => success_response(json!({ "success": true })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_rules_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    Json(service.snapshot().rules.clone()).into_response()
}

pub(crate) async fn add_rule_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Json(rule): Json<Rule>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.add_rule(rule) {
        Ok(rule) => success_response(json!({ "success": true, "rule": rule })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_rule_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Path(question_id): Path<String>,
    Json(changes): Json<RuleChanges>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    let id = QuestionId(question_id);
    match service.update_rule(&id, changes.professions) {
        Ok(rule) => success_response(json!({ "success": true, "rule": rule })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_rule_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Path(question_id): Path<String>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.delete_rule(&QuestionId(question_id)) {
        Ok(()) => success_response(json!({ "success": true })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn knowledge_base_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    Json(KnowledgeBase::clone(&service.snapshot())).into_response()
}

pub(crate) async fn create_new_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    match service.reset() {
        Ok(knowledge_base) => success_response(json!({
            "success": true,
            "message": "new knowledge base created",
            "knowledge_base": knowledge_base.as_ref(),
        })),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_handler<S>(
    State(service): State<Arc<KnowledgeBaseService<S>>>,
    Json(document): Json<Value>,
) -> Response
where
    S: KnowledgeBaseStore + 'static,
{
    let outcome =
        parse_upload(document).and_then(|knowledge_base| service.replace(knowledge_base));
    match outcome {
        Ok(stats) => success_response(json!({
            "success": true,
            "message": "knowledge base uploaded",
            "stats": stats,
        })),
        Err(error) => error_response(error),
    }
}

/// Structural checks an uploaded document must pass before it replaces the snapshot.
pub(crate) fn parse_upload(document: Value) -> Result<KnowledgeBase, KnowledgeBaseError> {
    let Some(sections) = document.as_object() else {
        return Err(KnowledgeBaseError::InvalidUpload(
            "expected a JSON object".to_string(),
        ));
    };

    if KNOWLEDGE_BASE_SECTIONS
        .iter()
        .any(|section| !sections.contains_key(*section))
    {
        return Err(KnowledgeBaseError::InvalidUpload(
            "missing required fields: questions, professions, rules".to_string(),
        ));
    }

    if KNOWLEDGE_BASE_SECTIONS
        .iter()
        .any(|section| !sections[*section].is_array())
    {
        return Err(KnowledgeBaseError::InvalidUpload(
            "questions, professions and rules must be arrays".to_string(),
        ));
    }

    serde_json::from_value(document)
        .map_err(|error| KnowledgeBaseError::InvalidUpload(error.to_string()))
}

fn success_response(payload: Value) -> Response {
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) fn error_status(error: &KnowledgeBaseError) -> StatusCode {
    match error {
        KnowledgeBaseError::QuestionNotFound(_)
        | KnowledgeBaseError::ProfessionNotFound(_)
        | KnowledgeBaseError::RuleNotFound(_) => StatusCode::NOT_FOUND,
        KnowledgeBaseError::DuplicateProfession(_) => StatusCode::CONFLICT,
        KnowledgeBaseError::InvalidAnswerLabels(_)
        | KnowledgeBaseError::InvalidWeight { .. }
        | KnowledgeBaseError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
        KnowledgeBaseError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: KnowledgeBaseError) -> Response {
    let payload = json!({
        "success": false,
        "error": error.to_string(),
    });
    (error_status(&error), Json(payload)).into_response()
}
