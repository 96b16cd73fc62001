//! REST endpoints.

use std::collections::BTreeMap;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AppState, Caller};
use crate::dialogue::{ConversationSession, ConversationState, UserInput};
use crate::error::SynthesisError;
use crate::templates::{SuggestedReply, TemplateDefinition};

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

/// A synthesis error rendered as `{ error, message, fields? }`.
pub struct ApiError(pub SynthesisError);

impl From<SynthesisError> for ApiError {
    fn from(e: SynthesisError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SynthesisError::InvalidInput { .. } | SynthesisError::InvalidTemplateType { .. } => {
                StatusCode::BAD_REQUEST
            }
            SynthesisError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            SynthesisError::GenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let fields = match &self.0 {
            SynthesisError::InvalidInput { fields, .. } if !fields.is_empty() => Some(fields.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.0.code(),
            message: self.0.to_string(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}

// ── Health ──────────────────────────────────────────────────────────────

pub(super) async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "jium"
    }))
}

// ── Templates ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateView {
    template_type: &'static str,
    menu_label: &'static str,
    steps: Vec<StepView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepView {
    question: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_key: Option<&'static str>,
    suggestions: Vec<SuggestedReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<usize>,
    terminal: bool,
}

impl From<&TemplateDefinition> for TemplateView {
    fn from(def: &TemplateDefinition) -> Self {
        Self {
            template_type: def.template_type.as_str(),
            menu_label: def.menu_label,
            steps: def
                .steps
                .iter()
                .map(|s| StepView {
                    question: s.question,
                    field_key: s.field_key,
                    suggestions: s.suggestions.clone(),
                    min_length: s.min_length,
                    terminal: s.terminal,
                })
                .collect(),
        }
    }
}

pub(super) async fn list_templates(State(state): State<AppState>) -> impl IntoResponse {
    let templates: Vec<TemplateView> = state
        .engine
        .registry()
        .iter()
        .map(TemplateView::from)
        .collect();
    Json(serde_json::json!({ "templates": templates }))
}

// ── Synthesis ───────────────────────────────────────────────────────────

/// `POST /api/generate-prompt`. The body is taken raw so that admission runs
/// before any parsing.
pub(super) async fn generate_prompt(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.handle_raw(&caller, &body).await?;
    Ok(Json(result))
}

// ── Stateless conversation step ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StepRequest {
    #[serde(default)]
    state: Option<ConversationState>,
    /// Absent input asks for the greeting.
    #[serde(default)]
    input: Option<UserInput>,
}

pub(super) async fn conversation_step(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request: StepRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Malformed conversation step");
        SynthesisError::malformed()
    })?;

    let conversation = request.state.unwrap_or_default();
    if let Err(reason) = conversation.check_consistent(state.engine.registry()) {
        warn!(caller = %caller, reason = %reason, "Rejected inconsistent conversation state");
        return Err(SynthesisError::InvalidInput {
            message: "대화 상태가 올바르지 않습니다.".to_string(),
            fields: BTreeMap::new(),
        }
        .into());
    }

    let mut session = ConversationSession::resume(
        state.engine.clone(),
        state.service.clone(),
        caller,
        conversation,
    );
    let outcome = match request.input {
        Some(input) => session.send(input).await,
        None => session.greet(),
    };
    Ok(Json(outcome))
}
