//! HTTP Handlers
//!
//! Each endpoint maps to exactly one user action on one session. The
//! session lock is held for the whole action, so actions on the same
//! session run strictly one at a time.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use finance_advisor::{
    ActionKind, AdviceCategory, AdvisorError, FinancialProfile, Phase, ProfileForm,
    SessionAction, SessionState,
};
use llm_core::{LlmError, Session, SessionId};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub provider_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct AdviceOption {
    pub label: &'static str,
    pub slug: &'static str,
}

/// Everything a UI needs to render one session
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: Phase,
    pub analyzed_response: Option<String>,
    pub selected_advice: Option<AdviceCategory>,
    pub detailed_feedback: Option<String>,
    pub feedback_category: Option<AdviceCategory>,
    pub feedback_stale: bool,
    pub available_actions: Vec<ActionKind>,
}

impl SessionView {
    fn new(session: &Session<SessionState>) -> Self {
        let state = &session.state;
        Self {
            session_id: session.id.to_string(),
            phase: state.phase(),
            analyzed_response: state.analyzed_response().map(str::to_string),
            selected_advice: state.selected_advice(),
            detailed_feedback: state.detailed_feedback().map(str::to_string),
            feedback_category: state.feedback_category(),
            feedback_stale: state.feedback_is_stale(),
            available_actions: state.available_actions(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectAdviceRequest {
    pub category: AdviceCategory,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, code: &str, error: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            code: code.into(),
        }),
    )
}

/// Map domain failures onto HTTP statuses
pub fn advisor_error(err: &AdvisorError) -> ApiError {
    let (status, code) = match err {
        AdvisorError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        AdvisorError::Gateway(LlmError::Timeout(_)) => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
        AdvisorError::Gateway(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR"),
        AdvisorError::Configuration(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONFIGURATION_ERROR"),
        AdvisorError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR"),
    };
    if status.is_server_error() {
        tracing::error!("Advisor error: {}", err);
    }
    error_response(status, code, err.user_message())
}

fn session_error(err: &LlmError) -> ApiError {
    match err {
        LlmError::SessionNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", err.user_message())
        }
        _ => {
            tracing::error!("Session store error: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR", err.user_message())
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.advisor.provider();
    let provider_connected = provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: provider.name().to_string(),
        model: state.advisor.options().model.clone(),
        provider_connected,
    })
}

/// The six advice categories, in display order
pub async fn list_advice() -> Json<Vec<AdviceOption>> {
    Json(
        AdviceCategory::ALL
            .into_iter()
            .map(|c| AdviceOption {
                label: c.label(),
                slug: c.slug(),
            })
            .collect(),
    )
}

pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let (_, handle) = state.sessions.create().map_err(|e| session_error(&e))?;
    let session = handle.lock().await;
    Ok((StatusCode::CREATED, Json(SessionView::new(&session))))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state
        .sessions
        .get(&SessionId::from_string(id))
        .map_err(|e| session_error(&e))?;
    let session = handle.lock().await;
    Ok(Json(SessionView::new(&session)))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from_string(id);
    if state.sessions.remove(&id).map_err(|e| session_error(&e))? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_error(&LlmError::SessionNotFound(id.to_string())))
    }
}

/// Analyze a (possibly edited) profile
pub async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<SessionView>, ApiError> {
    let profile = FinancialProfile::try_from(form)
        .map_err(|e| advisor_error(&AdvisorError::Validation(e)))?;
    apply(&state, id, SessionAction::Analyze(profile)).await
}

/// Choose an advice category
pub async fn select_advice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SelectAdviceRequest>,
) -> Result<Json<SessionView>, ApiError> {
    apply(&state, id, SessionAction::SelectAdvice(payload.category)).await
}

/// Fetch detailed feedback for the selected category
pub async fn request_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    apply(&state, id, SessionAction::RequestFeedback).await
}

async fn apply(
    state: &AppState,
    id: String,
    action: SessionAction,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state
        .sessions
        .get(&SessionId::from_string(id))
        .map_err(|e| session_error(&e))?;

    let mut guard = handle.lock().await;
    let session = &mut *guard;
    let outcome = state.advisor.dispatch(&mut session.state, action).await;
    session.touch();

    outcome.map_err(|e| advisor_error(&e))?;
    Ok(Json(SessionView::new(session)))
}
