use super::common::*;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::knowledge::router::{add_profession_handler, update_question_handler, QuestionChanges};

fn post_json(uri: &str, payload: &Value) -> Request<axum::body::Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(payload).expect("payload serializes"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn analyze_route_returns_full_ranking_for_string_answers() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/analyze",
            &json!({ "answers": { "q1": "3", "q2": 1, "q3": "skip me" } }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["method"], json!("certainty_factor"));

    let recommendations = payload["recommendations"]
        .as_array()
        .expect("recommendation list");
    let ids: Vec<&str> = recommendations
        .iter()
        .filter_map(|entry| entry["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["developer", "designer", "teacher"]);
    assert_eq!(recommendations[0]["raw_cf"], json!(0.84));
    assert_eq!(recommendations[0]["percentage"], json!(84.0));
    assert_eq!(recommendations[2]["percentage"], json!(0.0));
}

#[tokio::test]
async fn analyze_route_supports_weighted_scoring() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/analyze",
            &json!({ "answers": { "q1": 3 }, "method": "weighted", "top_n": 1 }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["method"], json!("weighted"));
    let recommendations = payload["recommendations"]
        .as_array()
        .expect("recommendation list");
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["id"], json!("developer"));
    assert_eq!(recommendations[0]["percentage"], json!(100.0));
    assert!(recommendations[0].get("max_score").is_some());
}

#[tokio::test]
async fn upload_route_rejects_missing_sections() {
    let (service, store) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/knowledge-base/upload",
            &json!({ "questions": [], "professions": [] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("missing required fields"));
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn upload_route_rejects_non_array_sections() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/knowledge-base/upload",
            &json!({ "questions": [], "professions": {}, "rules": [] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_route_replaces_knowledge_base_and_reports_stats() {
    let (service, store) = build_service();
    let router = router_with_service(service);

    let document = json!({
        "questions": [{ "id": "q1", "text": "Outdoors?", "answers": ["a", "b", "c", "d"] }],
        "professions": [{ "id": "ranger", "name": "Park ranger", "description": "Guards parks" }],
        "rules": [{ "question_id": "q1", "professions": { "ranger": 0.9, "ghost": 0.5 } }]
    });

    let response = router
        .clone()
        .oneshot(post_json("/api/knowledge-base/upload", &document))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["stats"],
        json!({ "questions": 1, "professions": 1, "rules": 1 })
    );
    assert_eq!(store.stored().map(|kb| kb.professions.len()), Some(1));

    let response = router
        .oneshot(
            Request::get("/api/knowledge-base/download")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload, document);
}

#[tokio::test]
async fn upload_route_keeps_weight_order_from_the_document() {
    let (service, store) = build_service();
    let service = Arc::new(service);
    let router = crate::knowledge::knowledge_router(service.clone());

    let body = r#"{
        "questions": [{ "id": "q1", "text": "Outdoors?", "answers": ["a", "b", "c", "d"] }],
        "professions": [
            { "id": "alpha", "name": "Alpha", "description": "" },
            { "id": "zeta", "name": "Zeta", "description": "" }
        ],
        "rules": [{ "question_id": "q1", "professions": { "zeta": 0.9, "alpha": 0.5 } }]
    }"#;
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/knowledge-base/upload")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(body))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let order = |rule: &crate::knowledge::Rule| -> Vec<String> {
        rule.professions
            .iter()
            .map(|(id, _)| id.as_str().to_string())
            .collect()
    };
    assert_eq!(order(&service.snapshot().rules[0]), vec!["zeta", "alpha"]);
    let stored = store.stored().expect("upload persisted");
    assert_eq!(order(&stored.rules[0]), vec!["zeta", "alpha"]);

    let response = router
        .oneshot(
            Request::get("/api/knowledge-base/download")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 body");
    let zeta = text.find("\"zeta\":0.9").expect("zeta weight present");
    let alpha = text.find("\"alpha\":0.5").expect("alpha weight present");
    assert!(zeta < alpha);
}

#[tokio::test]
async fn question_routes_list_and_create() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(post_json("/api/questions", &json!({ "text": "Night shifts?" })))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["question"]["id"], json!("q3"));

    let response = router
        .oneshot(
            Request::get("/api/questions")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn rule_delete_route_removes_rules_for_question() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            Request::delete("/api/rules/q2")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::get("/api/rules")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!([{ "question_id": "q1", "professions": { "developer": 0.8, "teacher": -0.3 } }])
    );
}

#[tokio::test]
async fn update_question_handler_returns_not_found() {
    let (service, _) = build_service();

    let response = update_question_handler::<MemoryStore>(
        State(Arc::new(service)),
        Path("q77".to_string()),
        axum::Json(QuestionChanges {
            text: Some("missing".to_string()),
            answers: None,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_profession_handler_returns_conflict_on_duplicate() {
    let (service, _) = build_service();

    let response = add_profession_handler::<MemoryStore>(
        State(Arc::new(service)),
        axum::Json(profession("developer", "Developer again")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
}
