use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::prep::GenerationResult;
use crate::store::Record;

/// Named snapshot of a resume + job description pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedInput {
    pub id: String,
    pub name: String,
    pub resume: String,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
}

/// One successful generation together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedHistory {
    pub id: String,
    pub name: String,
    pub resume: String,
    pub job_description: String,
    pub result: GenerationResult,
    pub created_at: DateTime<Utc>,
}

/// Most recently edited inputs, restored on reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastInput {
    pub resume: String,
    pub job_description: String,
}

impl Record for SavedInput {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for SavedHistory {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Local record id: `<unix-millis>-<9 hex chars>`. Unique enough for local lists only.
pub fn generate_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &random[..9])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        let (millis, random) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(random.len(), 9);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_id_is_unique_across_burst() {
        let ids: HashSet<String> = (0..500).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_saved_input_uses_camel_case_keys() {
        let input = SavedInput {
            id: "1-abc".into(),
            name: "Acme".into(),
            resume: "r".into(),
            job_description: "jd".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("jobDescription").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
