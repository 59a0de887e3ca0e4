use crate::domain::model::{BreachRecord, SaveOutcome};
use crate::domain::ports::BreachStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

pub const DUPLICATE_KEY: i32 = 11000;
pub const INDEX_OPTIONS_CONFLICT: i32 = 85;

/// Server error code carried by a command or write failure.
pub fn server_error_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(e) => Some(e.code),
        ErrorKind::Write(WriteFailure::WriteError(e)) => Some(e.code),
        _ => None,
    }
}

/// 只有重複 key 視為正常結果，其他錯誤交給呼叫端
fn insert_failure_outcome(code: Option<i32>) -> Option<SaveOutcome> {
    match code {
        Some(DUPLICATE_KEY) => Some(SaveOutcome::Duplicate),
        _ => None,
    }
}

fn is_index_conflict(code: Option<i32>) -> bool {
    code == Some(INDEX_OPTIONS_CONFLICT)
}

/// An index on `email` alone that the server enforces as unique.
fn is_unique_email_index(index: &IndexModel) -> bool {
    index.keys.len() == 1
        && index.keys.contains_key("email")
        && index
            .options
            .as_ref()
            .and_then(|options| options.unique)
            .unwrap_or(false)
}

/// Breach records in a MongoDB collection with a unique index on `email`.
///
/// The client is opened once and reused for every operation.
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<BreachRecord>,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);

        // 驅動程式是延遲連線，這裡先 ping 一次確認伺服器可用
        db.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("🗄️ Connected to MongoDB ({}.{})", database, collection);

        Ok(Self {
            collection: db.collection(collection),
        })
    }

    async fn has_unique_email_index(&self) -> Result<bool> {
        let mut cursor = self.collection.list_indexes().await?;
        while cursor.advance().await? {
            if is_unique_email_index(&cursor.deserialize_current()?) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl BreachStore for MongoStore {
    async fn ensure_unique_index(&self) -> Result<()> {
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        // 相同的索引重複建立不會報錯；85 代表已有選項不同的 email 索引
        match self.collection.create_index(model).await {
            Ok(_) => {
                tracing::info!("Unique index on email field ensured");
                Ok(())
            }
            Err(e) if is_index_conflict(server_error_code(&e)) => {
                if self.has_unique_email_index().await? {
                    tracing::debug!("Unique email index already exists: {}", e);
                    Ok(())
                } else {
                    tracing::error!("Existing email index is not unique: {}", e);
                    Err(e.into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, record: &BreachRecord) -> Result<SaveOutcome> {
        match self.collection.insert_one(record).await {
            Ok(_) => Ok(SaveOutcome::Inserted),
            Err(e) => match insert_failure_outcome(server_error_code(&e)) {
                Some(outcome) => Ok(outcome),
                None => Err(e.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_index(unique: Option<bool>) -> IndexModel {
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(unique).build())
            .build()
    }

    #[test]
    fn test_duplicate_key_is_duplicate_outcome() {
        assert_eq!(
            insert_failure_outcome(Some(DUPLICATE_KEY)),
            Some(SaveOutcome::Duplicate)
        );
    }

    #[test]
    fn test_other_insert_failures_propagate() {
        assert_eq!(insert_failure_outcome(Some(INDEX_OPTIONS_CONFLICT)), None);
        assert_eq!(insert_failure_outcome(Some(13)), None);
        assert_eq!(insert_failure_outcome(None), None);
    }

    #[test]
    fn test_index_conflict_code() {
        assert!(is_index_conflict(Some(INDEX_OPTIONS_CONFLICT)));
        assert!(!is_index_conflict(Some(DUPLICATE_KEY)));
        assert!(!is_index_conflict(None));
    }

    #[test]
    fn test_only_unique_email_index_satisfies_constraint() {
        assert!(is_unique_email_index(&email_index(Some(true))));
        assert!(!is_unique_email_index(&email_index(Some(false))));
        assert!(!is_unique_email_index(&email_index(None)));

        let no_options = IndexModel::builder().keys(doc! { "email": 1 }).build();
        assert!(!is_unique_email_index(&no_options));

        let compound = IndexModel::builder()
            .keys(doc! { "email": 1, "breaches.Name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        assert!(!is_unique_email_index(&compound));
    }
}
