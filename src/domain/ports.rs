use crate::domain::model::{BreachRecord, FetchOutcome, SaveOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait BreachSource: Send + Sync {
    async fn fetch(&self, email: &str, api_key: &str) -> FetchOutcome;
}

#[async_trait]
pub trait BreachStore: Send + Sync {
    /// Idempotent; an already existing email index is not an error.
    async fn ensure_unique_index(&self) -> Result<()>;

    async fn save(&self, record: &BreachRecord) -> Result<SaveOutcome>;
}
