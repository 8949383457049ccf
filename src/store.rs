use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

/// A single student row. `id` is client-supplied and acts as the uniqueness
/// key; the wire names match the multipart form fields the API accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "StudentID")]
    pub id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "FilePath")]
    pub image_path: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no record with id {0}")]
    NotFound(i32),
    /// More than one record shares an id. The uniqueness invariant makes
    /// this unreachable through the public API, but lookups refuse to pick
    /// a winner silently.
    #[error("{count} records share id {id}")]
    DuplicateId { id: i32, count: usize },
}

/// Storage seam for student records. Injected into handler state as a trait
/// object so the in-memory backing can be swapped without touching the API.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self) -> Vec<StudentRecord>;
    async fn get_by_id(&self, id: i32) -> Result<StudentRecord, StoreError>;
    /// Insert-if-absent, else full replace of every field.
    async fn upsert(&self, record: StudentRecord) -> StudentRecord;
    /// Remove and return the record, leaving the store untouched on a miss.
    async fn delete_by_id(&self, id: i32) -> Result<StudentRecord, StoreError>;
}

/// Process-lifetime store over a shared, unordered list. All mutation goes
/// through the write lock, so concurrent saves and deletes serialize.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<Vec<StudentRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self) -> Vec<StudentRecord> {
        self.records.read().await.clone()
    }

    async fn get_by_id(&self, id: i32) -> Result<StudentRecord, StoreError> {
        let records = self.records.read().await;
        let mut matches = records.iter().filter(|record| record.id == id);

        let Some(found) = matches.next() else {
            return Err(StoreError::NotFound(id));
        };

        let extras = matches.count();
        if extras > 0 {
            return Err(StoreError::DuplicateId {
                id,
                count: extras + 1,
            });
        }

        Ok(found.clone())
    }

    async fn upsert(&self, record: StudentRecord) -> StudentRecord {
        let mut records = self.records.write().await;
        records.retain(|existing| existing.id != record.id);
        records.push(record.clone());
        record
    }

    async fn delete_by_id(&self, id: i32) -> Result<StudentRecord, StoreError> {
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(records.remove(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i32, name: &str) -> StudentRecord {
        StudentRecord {
            id,
            name: name.to_string(),
            image_path: None,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_when_id_is_new() {
        let store = MemoryRecordStore::new();

        store.upsert(record(1, "Alice")).await;
        store.upsert(record(2, "Bob")).await;

        assert_eq!(store.list().await.len(), 2);
    }

    #[tokio::test]
    async fn upsert_replaces_every_field_for_an_existing_id() {
        let store = MemoryRecordStore::new();
        store
            .upsert(StudentRecord {
                id: 1,
                name: "Alice".to_string(),
                image_path: Some("http://localhost/home/get/a.jpeg".to_string()),
            })
            .await;

        store.upsert(record(1, "Alicia")).await;

        let records = store.list().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alicia");
        assert_eq!(records[0].image_path, None);
    }

    #[tokio::test]
    async fn get_by_id_roundtrips_a_saved_record() {
        let store = MemoryRecordStore::new();
        let saved = store.upsert(record(7, "Grace")).await;

        assert_eq!(store.get_by_id(7).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn get_by_id_misses_cleanly() {
        let store = MemoryRecordStore::new();

        assert_eq!(store.get_by_id(42).await, Err(StoreError::NotFound(42)));
    }

    #[tokio::test]
    async fn get_by_id_refuses_to_pick_between_duplicates() {
        let store = MemoryRecordStore::new();
        {
            // Bypass upsert to manufacture the integrity violation.
            let mut records = store.records.write().await;
            records.push(record(5, "first"));
            records.push(record(5, "second"));
        }

        assert_eq!(
            store.get_by_id(5).await,
            Err(StoreError::DuplicateId { id: 5, count: 2 })
        );
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_and_returns_it() {
        let store = MemoryRecordStore::new();
        store.upsert(record(1, "Alice")).await;
        store.upsert(record(2, "Bob")).await;

        let removed = store.delete_by_id(1).await.unwrap();

        assert_eq!(removed.name, "Alice");
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn delete_of_a_missing_id_leaves_the_store_untouched() {
        let store = MemoryRecordStore::new();
        store.upsert(record(1, "Alice")).await;

        assert_eq!(store.delete_by_id(9).await, Err(StoreError::NotFound(9)));
        assert_eq!(store.list().await.len(), 1);
    }

    #[tokio::test]
    async fn crud_lifecycle_scenario() {
        let store = MemoryRecordStore::new();

        store.upsert(record(1, "Alice")).await;
        assert_eq!(store.list().await.len(), 1);

        store.upsert(record(1, "Alicia")).await;
        let records = store.list().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alicia");

        store.delete_by_id(1).await.unwrap();
        assert!(store.list().await.is_empty());
        assert_eq!(store.get_by_id(1).await, Err(StoreError::NotFound(1)));
    }
}
