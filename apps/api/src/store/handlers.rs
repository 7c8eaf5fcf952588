//! Axum route handlers for saved inputs, history and the last-input slot.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::prep::GenerationResult;
use crate::models::records::{LastInput, SavedHistory, SavedInput};
use crate::state::AppState;
use crate::store::{HistoryPatch, InputPatch};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveInputRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHistoryRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
    pub result: GenerationResult,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastInputRequest {
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
}

fn saved_input_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Saved input {id} not found"))
}

fn history_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("History entry {id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Saved inputs
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/saved-inputs
pub async fn handle_list_inputs(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedInput>>, AppError> {
    let inputs = state
        .with_store(|store| Ok(store.saved_inputs().to_vec()))
        .await?;
    Ok(Json(inputs))
}

/// POST /api/saved-inputs
pub async fn handle_save_input(
    State(state): State<AppState>,
    payload: Result<Json<SaveInputRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedInput>), AppError> {
    let Json(req) = payload?;
    let input = state
        .with_store(move |store| store.save_input(req.resume, req.job_description, req.name))
        .await?;
    info!(id = %input.id, "Saved input");
    Ok((StatusCode::CREATED, Json(input)))
}

/// PATCH /api/saved-inputs/:id
pub async fn handle_update_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InputPatch>, JsonRejection>,
) -> Result<Json<SavedInput>, AppError> {
    let Json(patch) = payload?;
    let key = id.clone();
    state
        .with_store(move |store| store.update_input(&key, patch))
        .await?
        .map(Json)
        .ok_or_else(|| saved_input_not_found(&id))
}

/// DELETE /api/saved-inputs/:id
pub async fn handle_delete_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = id.clone();
    if state
        .with_store(move |store| store.delete_input(&key))
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(saved_input_not_found(&id))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// History
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/history
pub async fn handle_list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedHistory>>, AppError> {
    let history = state
        .with_store(|store| Ok(store.history().to_vec()))
        .await?;
    Ok(Json(history))
}

/// POST /api/history
pub async fn handle_save_history(
    State(state): State<AppState>,
    payload: Result<Json<SaveHistoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedHistory>), AppError> {
    let Json(req) = payload?;
    let entry = state
        .with_store(move |store| {
            store.save_to_history(req.resume, req.job_description, req.result, req.name)
        })
        .await?;
    info!(id = %entry.id, questions = entry.result.questions.len(), "Saved history entry");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.with_store(|store| store.clear_history()).await?;
    info!("Cleared history");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/history/:id
pub async fn handle_update_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<HistoryPatch>, JsonRejection>,
) -> Result<Json<SavedHistory>, AppError> {
    let Json(patch) = payload?;
    let key = id.clone();
    state
        .with_store(move |store| store.update_history(&key, patch))
        .await?
        .map(Json)
        .ok_or_else(|| history_not_found(&id))
}

/// DELETE /api/history/:id
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let key = id.clone();
    if state
        .with_store(move |store| store.delete_from_history(&key))
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(history_not_found(&id))
    }
}

/// POST /api/history/:id/more
///
/// Generates more questions from the entry's own inputs and appends them to its result.
/// The store lock is released while the model runs.
pub async fn handle_more_questions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedHistory>, AppError> {
    let key = id.clone();
    let entry = state
        .with_store(move |store| Ok(store.history_entry(&key).cloned()))
        .await?
        .ok_or_else(|| history_not_found(&id))?;

    let more = state
        .generator
        .continue_generate(&entry.resume, &entry.job_description, &entry.result.questions)
        .await?;

    // The entry may have been deleted while the model was running.
    let key = id.clone();
    let updated = state
        .with_store(move |store| store.append_history_questions(&key, more.questions))
        .await?
        .ok_or_else(|| history_not_found(&id))?;

    info!(
        id = %updated.id,
        questions = updated.result.questions.len(),
        "Appended questions to history entry"
    );
    Ok(Json(updated))
}

// ────────────────────────────────────────────────────────────────────────────
// Last input
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/last-input
///
/// `null` when nothing has been saved.
pub async fn handle_get_last_input(
    State(state): State<AppState>,
) -> Result<Json<Option<LastInput>>, AppError> {
    let last = state
        .with_store(|store| Ok(store.last_input().cloned()))
        .await?;
    Ok(Json(last))
}

/// PUT /api/last-input
pub async fn handle_save_last_input(
    State(state): State<AppState>,
    payload: Result<Json<LastInputRequest>, JsonRejection>,
) -> Result<Json<LastInput>, AppError> {
    let Json(req) = payload?;
    let input = state
        .with_store(move |store| store.save_last_input(req.resume, req.job_description))
        .await?;
    Ok(Json(input))
}

/// DELETE /api/last-input
pub async fn handle_clear_last_input(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.with_store(|store| store.clear_last_input()).await?;
    Ok(StatusCode::NO_CONTENT)
}
