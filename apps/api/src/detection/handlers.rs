use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::{detect, Detection, DetectionKind};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub text: String,
    pub kind: DetectionKind,
}

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    /// `null` when the text is too short or carries no signal.
    pub detection: Option<Detection>,
}

/// POST /api/detect
pub async fn handle_detect(
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, AppError> {
    let Json(request) = payload?;
    let detection = detect(&request.text, request.kind);
    debug!(
        kind = ?request.kind,
        detected = detection.is_some(),
        "Tag detection finished"
    );
    Ok(Json(DetectResponse { detection }))
}
