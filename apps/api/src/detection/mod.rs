pub mod detector;
pub mod handlers;
pub mod patterns;

use serde::{Deserialize, Serialize};

pub use detector::detect;

/// Which document the text is, selecting the pattern tables and caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectionKind {
    Resume,
    JobDescription,
}

/// Best-effort tags for a pasted document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    pub technologies: Vec<String>,
    /// 0..=100
    pub confidence: u8,
}
