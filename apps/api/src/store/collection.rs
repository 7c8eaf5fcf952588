use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::store::{KeyValueStore, StoreError};

/// A value persisted as JSON under one fixed key.
///
/// Loading never fails: a missing key yields `V::default()`, and unreadable or corrupt data
/// is logged and replaced by `V::default()` as well.
pub struct Persisted<V> {
    key: &'static str,
    backend: Arc<dyn KeyValueStore>,
    value: V,
}

impl<V> Persisted<V>
where
    V: Serialize + DeserializeOwned + Default,
{
    pub fn load(backend: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        let value = match read::<V>(backend.as_ref(), key) {
            Ok(Some(value)) => value,
            Ok(None) => V::default(),
            Err(e) => {
                warn!("{e}; starting '{key}' empty");
                V::default()
            }
        };

        Self {
            key,
            backend,
            value,
        }
    }

    pub fn get(&self) -> &V {
        &self.value
    }

    /// Encodes and writes `next`, then makes it the in-memory value.
    pub fn replace(&mut self, next: V) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&next).map_err(|source| StoreError::Encode {
            key: self.key.to_string(),
            source,
        })?;
        self.backend.set(self.key, &encoded)?;
        self.value = next;
        Ok(())
    }

    /// Removes the key from the backend and resets the in-memory value.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(self.key)?;
        self.value = V::default();
        Ok(())
    }
}

fn read<V: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<V>, StoreError> {
    let Some(raw) = backend.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Anything stored in a `RecordList`.
pub trait Record {
    fn id(&self) -> &str;
}

/// Newest-first list of records addressed by id.
pub struct RecordList<T> {
    inner: Persisted<Vec<T>>,
}

impl<T> RecordList<T>
where
    T: Record + Clone + Serialize + DeserializeOwned,
{
    pub fn load(backend: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            inner: Persisted::load(backend, key),
        }
    }

    pub fn all(&self) -> &[T] {
        self.inner.get()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.all().iter().find(|r| r.id() == id)
    }

    /// Puts `record` at the front of the list.
    pub fn insert(&mut self, record: T) -> Result<(), StoreError> {
        let mut next = Vec::with_capacity(self.all().len() + 1);
        next.push(record);
        next.extend(self.all().iter().cloned());
        self.inner.replace(next)
    }

    /// Applies `apply` to the record with `id`. Returns the updated record, or `None` if no
    /// record has that id (nothing is written in that case).
    pub fn update<F>(&mut self, id: &str, apply: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&mut T),
    {
        let Some(index) = self.all().iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let mut next = self.all().to_vec();
        apply(&mut next[index]);
        let updated = next[index].clone();
        self.inner.replace(next)?;
        Ok(Some(updated))
    }

    /// Removes the record with `id`, keeping the others in order. Returns whether a record
    /// was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<T> = self.all().iter().filter(|r| r.id() != id).cloned().collect();
        self.inner.replace(next)?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.inner.clear()
    }
}
