use crate::domain::model::{BreachRecord, SaveOutcome};
use crate::domain::ports::BreachStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process store keyed by email. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, BreachRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, email: &str) -> Option<BreachRecord> {
        self.records.lock().await.get(email).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl BreachStore for MemoryStore {
    async fn ensure_unique_index(&self) -> Result<()> {
        // HashMap 的 key 本身就是唯一約束
        Ok(())
    }

    async fn save(&self, record: &BreachRecord) -> Result<SaveOutcome> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.email) {
            return Ok(SaveOutcome::Duplicate);
        }
        records.insert(record.email.clone(), record.clone());
        Ok(SaveOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_save_is_duplicate_and_keeps_first() {
        let store = MemoryStore::new();
        let first = BreachRecord::new("alice@example.com", vec![]);
        assert_eq!(store.save(&first).await.unwrap(), SaveOutcome::Inserted);

        let breach: crate::domain::model::Breach =
            serde_json::from_value(serde_json::json!({"Name": "Adobe"})).unwrap();
        let second = BreachRecord::new("alice@example.com", vec![breach]);
        assert_eq!(store.save(&second).await.unwrap(), SaveOutcome::Duplicate);

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("alice@example.com").await, Some(first));
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store
            .save(&BreachRecord::new("bob@test.org", vec![]))
            .await
            .unwrap();
        assert!(!handle.is_empty().await);
    }
}
