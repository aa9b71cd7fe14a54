//! Route-level tests over an in-process router with a mock gateway

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use parley_api::{server, AppState};
use parley_llm::{MockBackend, ModelGateway};

fn app() -> Router {
    let gateway = Arc::new(ModelGateway::with_backend(Arc::new(MockBackend::constant(
        "a fine argument",
    ))));
    server::router(AppState::new(gateway))
}

fn agent_json(id: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
        "agent_id": id,
        "name": id.to_uppercase(),
        "stance": "Pro",
        "role": role,
        "system_prompt": "Argue well.",
        "temperature": 1.0,
        "max_tokens": 256,
        "model": {"provider": "ollama", "model_name": "llama3.1"}
    })
}

fn create_body() -> serde_json::Value {
    serde_json::json!({
        "config": {
            "topic": "Tabs are better than spaces",
            "num_rounds": 1,
            "agents": [agent_json("a1", "debater"), agent_json("a2", "debater")],
            "judge_config": agent_json("judge", "judge")
        }
    })
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

async fn create_debate(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/api/debates", create_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "created");
    json["debate_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "parley");
}

#[tokio::test]
async fn create_then_fetch_round_trips() {
    let app = app();
    let id = create_debate(&app).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/debates/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["debate"]["debate_id"], id.as_str());
    assert_eq!(json["debate"]["status"], "created");
    assert_eq!(json["debate"]["config"]["num_rounds"], 1);

    let response = app.clone().oneshot(get("/api/debates")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);

    let response = app
        .oneshot(get(&format!("/api/debates/{id}/status")))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["status"], "created");
    assert_eq!(json["total_rounds"], 1);
    assert_eq!(json["message_count"], 0);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let mut body = create_body();
    body["config"]["agents"] = serde_json::json!([agent_json("only", "debater")]);

    let response = app().oneshot(post_json("/api/debates", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_provider_tag_is_rejected_at_ingress() {
    let mut body = create_body();
    body["config"]["agents"][0]["model"]["provider"] = serde_json::json!("mystery");

    let response = app().oneshot(post_json("/api/debates", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_debate_is_404() {
    let response = app()
        .oneshot(get(&format!("/api/debates/{}", uuid::Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn start_twice_conflicts() {
    let app = app();
    let id = create_debate(&app).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/debates/{id}/start"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .oneshot(post_json(
            &format!("/api/debates/{id}/start"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn export_formats_and_rejections() {
    let app = app();
    let id = create_debate(&app).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/debates/{id}/export?format=markdown")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/markdown"
    );

    let response = app
        .clone()
        .oneshot(get(&format!("/api/debates/{id}/export")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );

    let response = app
        .oneshot(get(&format!("/api/debates/{id}/export?format=yaml")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_the_debate() {
    let app = app();
    let id = create_debate(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/debates/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get(&format!("/api/debates/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn provider_catalog_is_served() {
    let response = app().oneshot(get("/api/providers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 3);
    let ids: Vec<_> = json["providers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["provider_id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&"anthropic".to_string()));
    assert!(ids.contains(&"openai".to_string()));
    assert!(ids.contains(&"ollama".to_string()));
}

#[tokio::test]
async fn persona_catalog_and_lookup() {
    let response = app().oneshot(get("/api/personas")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["total"].as_u64().unwrap() >= 4);

    let response = app()
        .oneshot(get("/api/personas/prosecutor"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["persona_id"], "prosecutor");

    let response = app().oneshot(get("/api/personas/nobody")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
