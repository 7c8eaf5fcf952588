//! Local persistence: a string key-value backend, a generic persisted collection on top of
//! it, and the three prep collections (saved inputs, history, last input).
//!
//! Every collection is read fully on open and written back wholesale on each mutation.
//! The new value is encoded and written before it replaces the in-memory copy, so a failed
//! write leaves the in-memory state untouched.

pub mod backend;
pub mod collection;
pub mod handlers;
pub mod prep_store;

use thiserror::Error;

pub use backend::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use collection::{Persisted, Record, RecordList};
pub use prep_store::{HistoryPatch, InputPatch, PrepStore};

pub const SAVED_INPUTS_KEY: &str = "hireprep_saved_inputs";
pub const HISTORY_KEY: &str = "hireprep_history";
pub const LAST_INPUT_KEY: &str = "hireprep_last_input";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Persisted JSON is corrupt. Recovered on load by resetting the collection.
    #[error("Failed to decode '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store lock poisoned")]
    Poisoned,
}
