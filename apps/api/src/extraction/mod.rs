//! Plain-text extraction for uploaded resumes and job descriptions.
//!
//! PDFs go through `pdf-extract` on the blocking pool (the parser is CPU-bound and may
//! panic on hostile input). Anything else must already be UTF-8 text.

pub mod handlers;

use bytes::Bytes;
use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("PDF extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("upload is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// True when the upload should be treated as a PDF.
pub fn is_pdf(data: &[u8], content_type: Option<&str>, file_name: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || file_name.is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        || data.starts_with(PDF_MAGIC)
}

pub async fn extract_text(
    data: Bytes,
    content_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<String, ExtractionError> {
    if !is_pdf(&data, content_type, file_name) {
        return Ok(String::from_utf8(data.to_vec())?);
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_detection_sources() {
        assert!(is_pdf(b"", Some("application/pdf"), None));
        assert!(is_pdf(b"", None, Some("Resume.PDF")));
        assert!(is_pdf(b"%PDF-1.7\n...", None, None));
        assert!(!is_pdf(b"plain text", Some("text/plain"), Some("notes.txt")));
    }

    #[tokio::test]
    async fn test_text_upload_passes_through() {
        let text = extract_text(
            Bytes::from_static("Senior engineer, Zürich".as_bytes()),
            Some("text/plain"),
            Some("jd.txt"),
        )
        .await
        .unwrap();
        assert_eq!(text, "Senior engineer, Zürich");
    }

    #[tokio::test]
    async fn test_invalid_utf8_text_is_rejected() {
        let err = extract_text(Bytes::from_static(&[0xff, 0xfe, 0x00]), None, Some("a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_an_error() {
        let result = extract_text(
            Bytes::from_static(b"%PDF-1.4\nthis is not a real document"),
            Some("application/pdf"),
            Some("resume.pdf"),
        )
        .await;
        assert!(result.is_err());
    }
}
