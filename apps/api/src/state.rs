use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::generator::PrepGenerator;
use crate::store::{PrepStore, StoreError};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Holds the completion backend, or nothing when no credential is configured.
    pub generator: PrepGenerator,
    /// Single writer. Only locked inside `with_store`.
    pub store: Arc<Mutex<PrepStore>>,
}

impl AppState {
    pub fn new(config: Config, generator: PrepGenerator, store: PrepStore) -> Self {
        Self {
            config,
            generator,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `op` against the locked store on the blocking pool.
    ///
    /// Every mutation rewrites a whole collection to disk, so neither the lock nor the file
    /// I/O may sit on an executor thread.
    pub async fn with_store<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut PrepStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = store.lock().map_err(|_| StoreError::Poisoned)?;
            op(&mut guard)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("store task failed: {e}")))?;

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryKeyValueStore};

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn state(backend: Arc<dyn KeyValueStore>) -> AppState {
        let config = Config {
            openai_api_key: None,
            openai_base_url: "http://localhost".to_string(),
            llm_stream: false,
            llm_timeout_secs: 5,
            data_dir: None,
            max_upload_bytes: 1024,
            port: 0,
            rust_log: "debug".to_string(),
        };
        AppState::new(config, PrepGenerator::new(None), PrepStore::open(backend))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_store_work_runs_off_the_runtime_thread() {
        let state = state(Arc::new(MemoryKeyValueStore::new()));
        let runtime_thread = std::thread::current().id();

        let (store_thread, saved) = state
            .with_store(|store| {
                let saved = store.save_input("resume".into(), "jd".into(), None)?;
                Ok((std::thread::current().id(), saved))
            })
            .await
            .unwrap();

        assert_ne!(store_thread, runtime_thread);
        let listed = state
            .with_store(|store| Ok(store.saved_inputs().to_vec()))
            .await
            .unwrap();
        assert_eq!(listed, vec![saved]);
    }

    #[tokio::test]
    async fn test_store_write_failure_is_storage_error() {
        let state = state(Arc::new(ReadOnlyStore));

        let err = state
            .with_store(|store| store.save_last_input("resume".into(), "jd".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(StoreError::Io { .. })));
        let last = state
            .with_store(|store| Ok(store.last_input().cloned()))
            .await
            .unwrap();
        assert_eq!(last, None);
    }
}
