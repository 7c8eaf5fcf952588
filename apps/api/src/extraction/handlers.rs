use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::extract_text;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ParsedDocument {
    pub text: String,
}

/// POST /api/parse-pdf
///
/// Multipart upload with a `file` field. Returns the document's plain text.
pub async fn handle_parse_pdf(mut multipart: Multipart) -> Result<Json<ParsedDocument>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Malformed multipart body: {e}");
        AppError::Validation("No file provided".to_string())
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;

        let text = extract_text(data, content_type.as_deref(), file_name.as_deref())
            .await
            .map_err(|e| AppError::Extraction(e.to_string()))?;

        info!(chars = text.chars().count(), "Extracted uploaded document");
        return Ok(Json(ParsedDocument { text }));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
