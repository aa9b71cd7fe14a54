//! REST routes for the debate command surface

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::{DebateConfig, DebateState, DebateStatus};
use parley_engine::{
    export_debate, persona_by_id, persona_catalog, provider_catalog, ExportFormat, PersonaTemplate,
    ProviderInfo,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "parley".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Debate creation request
#[derive(Debug, Deserialize)]
pub struct CreateDebateRequest {
    pub config: DebateConfig,
}

/// Debate creation response
#[derive(Debug, Serialize)]
pub struct CreateDebateResponse {
    pub debate_id: Uuid,
    pub status: DebateStatus,
    pub message: String,
}

/// Create debate handler
pub async fn create_debate(
    State(state): State<AppState>,
    Json(request): Json<CreateDebateRequest>,
) -> ApiResult<(StatusCode, Json<CreateDebateResponse>)> {
    let debate = state.manager().create(request.config)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateDebateResponse {
            debate_id: debate.debate_id,
            status: debate.status,
            message: "Debate created successfully".to_string(),
        }),
    ))
}

/// Debate list response
#[derive(Debug, Serialize)]
pub struct DebateListResponse {
    pub debates: Vec<DebateState>,
    pub total: usize,
}

/// List debates handler
pub async fn list_debates(State(state): State<AppState>) -> Json<DebateListResponse> {
    let debates = state.store().list();
    let total = debates.len();
    Json(DebateListResponse { debates, total })
}

/// Single debate response
#[derive(Debug, Serialize)]
pub struct DebateResponse {
    pub debate: DebateState,
}

/// Get debate handler
pub async fn get_debate(
    State(state): State<AppState>,
    Path(debate_id): Path<Uuid>,
) -> ApiResult<Json<DebateResponse>> {
    let debate = state
        .store()
        .get(debate_id)
        .map_err(parley_engine::EngineError::from)?;
    Ok(Json(DebateResponse { debate }))
}

/// Debate status summary
#[derive(Debug, Serialize)]
pub struct DebateStatusResponse {
    pub debate_id: Uuid,
    pub status: DebateStatus,
    pub current_round: u32,
    pub current_turn: u32,
    pub total_rounds: u32,
    pub message_count: usize,
}

/// Get debate status handler
pub async fn get_debate_status(
    State(state): State<AppState>,
    Path(debate_id): Path<Uuid>,
) -> ApiResult<Json<DebateStatusResponse>> {
    let debate = state
        .store()
        .get(debate_id)
        .map_err(parley_engine::EngineError::from)?;
    Ok(Json(DebateStatusResponse {
        debate_id: debate.debate_id,
        status: debate.status,
        current_round: debate.current_round,
        current_turn: debate.current_turn,
        total_rounds: debate.config.num_rounds,
        message_count: debate.message_count(),
    }))
}

/// Start acknowledgement
#[derive(Debug, Serialize)]
pub struct StartDebateResponse {
    pub debate_id: Uuid,
    pub status: DebateStatus,
    pub message: String,
}

/// Start debate handler; execution continues in the background
pub async fn start_debate(
    State(state): State<AppState>,
    Path(debate_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<StartDebateResponse>)> {
    state.manager().start(debate_id)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(StartDebateResponse {
            debate_id,
            status: DebateStatus::InProgress,
            message: "Debate execution started. Subscribe for real-time updates.".to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "json".to_string()
}

/// Export debate handler
pub async fn export_debate_route(
    State(state): State<AppState>,
    Path(debate_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format = ExportFormat::parse(&query.format)?;
    let debate = state
        .store()
        .get(debate_id)
        .map_err(parley_engine::EngineError::from)?;
    let body = export_debate(&debate, format);
    Ok((
        [(header::CONTENT_TYPE, format.content_type())],
        body,
    )
        .into_response())
}

/// Delete debate handler; cancels a running debate first
pub async fn delete_debate(
    State(state): State<AppState>,
    Path(debate_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.manager().delete(debate_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Provider catalog response
#[derive(Debug, Serialize)]
pub struct ProviderCatalogResponse {
    pub providers: Vec<ProviderInfo>,
    pub total: usize,
}

/// List providers handler
pub async fn list_providers() -> Json<ProviderCatalogResponse> {
    let providers = provider_catalog();
    let total = providers.len();
    Json(ProviderCatalogResponse { providers, total })
}

/// Persona catalog response
#[derive(Debug, Serialize)]
pub struct PersonaCatalogResponse {
    pub personas: Vec<PersonaTemplate>,
    pub total: usize,
}

/// List personas handler
pub async fn list_personas() -> Json<PersonaCatalogResponse> {
    let personas = persona_catalog();
    let total = personas.len();
    Json(PersonaCatalogResponse { personas, total })
}

/// Get persona handler
pub async fn get_persona(Path(persona_id): Path<String>) -> ApiResult<Json<PersonaTemplate>> {
    persona_by_id(&persona_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Persona '{persona_id}' not found")))
}

/// Build the API router
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/debates", post(create_debate).get(list_debates))
        .route("/api/debates/{id}", get(get_debate).delete(delete_debate))
        .route("/api/debates/{id}/status", get(get_debate_status))
        .route("/api/debates/{id}/start", post(start_debate))
        .route("/api/debates/{id}/export", get(export_debate_route))
        .route("/api/providers", get(list_providers))
        .route("/api/personas", get(list_personas))
        .route("/api/personas/{id}", get(get_persona))
        .route("/api/ws/{id}", get(crate::ws::ws_handler))
        .with_state(state)
}
