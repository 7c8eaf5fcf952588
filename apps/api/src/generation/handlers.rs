//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::prep::{ContinueResult, GenerationResult, Question};
use crate::state::AppState;

const CONTINUE_MODE: &str = "continue";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
    pub existing_questions: Option<Vec<Question>>,
    /// `"continue"` selects continuation when `existing_questions` is present. Any other
    /// value runs a full generation.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    Full(GenerationResult),
    Continue(ContinueResult),
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate
///
/// Full generation, or continuation when `mode == "continue"` and `existingQuestions` is
/// given. Continuation returns only the new questions; the caller merges them.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload?;

    match (request.mode.as_deref(), request.existing_questions) {
        (Some(CONTINUE_MODE), Some(existing)) => {
            info!("Continuation requested with {} existing questions", existing.len());
            let result = state
                .generator
                .continue_generate(&request.resume, &request.job_description, &existing)
                .await?;
            Ok(Json(GenerateResponse::Continue(result)))
        }
        _ => {
            let result = state
                .generator
                .generate(&request.resume, &request.job_description)
                .await?;
            Ok(Json(GenerateResponse::Full(result)))
        }
    }
}
