use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::models::prep::{GenerationResult, Question};
use crate::models::records::{generate_id, LastInput, SavedHistory, SavedInput};
use crate::store::{
    KeyValueStore, Persisted, RecordList, StoreError, HISTORY_KEY, LAST_INPUT_KEY,
    SAVED_INPUTS_KEY,
};

/// Partial update of a saved input. Absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPatch {
    pub name: Option<String>,
    pub resume: Option<String>,
    pub job_description: Option<String>,
}

/// Partial update of a history entry. `result` replaces the whole stored result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPatch {
    pub name: Option<String>,
    pub result: Option<GenerationResult>,
}

/// The three local collections. Constructed once at startup and shared through `AppState`.
pub struct PrepStore {
    saved_inputs: RecordList<SavedInput>,
    history: RecordList<SavedHistory>,
    last_input: Persisted<Option<LastInput>>,
}

impl PrepStore {
    pub fn open(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            saved_inputs: RecordList::load(backend.clone(), SAVED_INPUTS_KEY),
            history: RecordList::load(backend.clone(), HISTORY_KEY),
            last_input: Persisted::load(backend, LAST_INPUT_KEY),
        }
    }

    // ── saved inputs ────────────────────────────────────────────────────────

    pub fn saved_inputs(&self) -> &[SavedInput] {
        self.saved_inputs.all()
    }

    pub fn save_input(
        &mut self,
        resume: String,
        job_description: String,
        name: Option<String>,
    ) -> Result<SavedInput, StoreError> {
        let now = Utc::now();
        let input = SavedInput {
            id: generate_id(),
            name: non_blank(name).unwrap_or_else(|| format!("Saved {}", now.format("%Y-%m-%d"))),
            resume,
            job_description,
            created_at: now,
        };
        self.saved_inputs.insert(input.clone())?;
        Ok(input)
    }

    pub fn update_input(
        &mut self,
        id: &str,
        patch: InputPatch,
    ) -> Result<Option<SavedInput>, StoreError> {
        self.saved_inputs.update(id, |input| {
            if let Some(name) = patch.name {
                input.name = name;
            }
            if let Some(resume) = patch.resume {
                input.resume = resume;
            }
            if let Some(job_description) = patch.job_description {
                input.job_description = job_description;
            }
        })
    }

    pub fn delete_input(&mut self, id: &str) -> Result<bool, StoreError> {
        self.saved_inputs.remove(id)
    }

    // ── history ─────────────────────────────────────────────────────────────

    pub fn history(&self) -> &[SavedHistory] {
        self.history.all()
    }

    pub fn history_entry(&self, id: &str) -> Option<&SavedHistory> {
        self.history.get(id)
    }

    pub fn save_to_history(
        &mut self,
        resume: String,
        job_description: String,
        result: GenerationResult,
        name: Option<String>,
    ) -> Result<SavedHistory, StoreError> {
        let now = Utc::now();
        let entry = SavedHistory {
            id: generate_id(),
            name: non_blank(name)
                .unwrap_or_else(|| format!("Prep {}", now.format("%Y-%m-%d %H:%M:%S"))),
            resume,
            job_description,
            result,
            created_at: now,
        };
        self.history.insert(entry.clone())?;
        Ok(entry)
    }

    pub fn update_history(
        &mut self,
        id: &str,
        patch: HistoryPatch,
    ) -> Result<Option<SavedHistory>, StoreError> {
        self.history.update(id, |entry| {
            if let Some(name) = patch.name {
                entry.name = name;
            }
            if let Some(result) = patch.result {
                entry.result = result;
            }
        })
    }

    /// Appends continuation questions to a history entry by replacing its whole `result`.
    pub fn append_history_questions(
        &mut self,
        id: &str,
        questions: Vec<Question>,
    ) -> Result<Option<SavedHistory>, StoreError> {
        let Some(entry) = self.history.get(id) else {
            return Ok(None);
        };
        let mut result = entry.result.clone();
        result.append_questions(questions);
        self.update_history(
            id,
            HistoryPatch {
                name: None,
                result: Some(result),
            },
        )
    }

    pub fn delete_from_history(&mut self, id: &str) -> Result<bool, StoreError> {
        self.history.remove(id)
    }

    pub fn clear_history(&mut self) -> Result<(), StoreError> {
        self.history.clear()
    }

    // ── last input ──────────────────────────────────────────────────────────

    pub fn last_input(&self) -> Option<&LastInput> {
        self.last_input.get().as_ref()
    }

    pub fn save_last_input(
        &mut self,
        resume: String,
        job_description: String,
    ) -> Result<LastInput, StoreError> {
        let input = LastInput {
            resume,
            job_description,
        };
        self.last_input.replace(Some(input.clone()))?;
        Ok(input)
    }

    pub fn clear_last_input(&mut self) -> Result<(), StoreError> {
        self.last_input.clear()
    }
}

fn non_blank(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
