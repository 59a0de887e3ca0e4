use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One breach exactly as the lookup service returned it.
///
/// The object is forwarded to the store untouched: null fields, unknown
/// fields and unexpected value types all survive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breach(pub serde_json::Map<String, serde_json::Value>);

impl Breach {
    /// `Name` of the breach, when the service sent it as a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("Name").and_then(|v| v.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }
}

/// 每個 email 最多一筆，由唯一索引保證
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachRecord {
    pub email: String,
    pub breaches: Vec<Breach>,
}

impl BreachRecord {
    pub fn new(email: impl Into<String>, breaches: Vec<Breach>) -> Self {
        Self {
            email: email.into(),
            breaches,
        }
    }
}

/// Classified result of a single lookup. Never an error: every response
/// shape the service can produce maps to one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// 200 with the breach list (possibly empty).
    Found(Vec<Breach>),
    /// Any other non-error status.
    NotFound { status: u16 },
    /// 429. `retry_after` is `None` when the message carried no digit.
    RateLimited {
        retry_after: Option<Duration>,
        message: String,
    },
    /// Error status, or `status: None` when no response arrived at all.
    Failed { status: Option<u16>, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    /// A record for the email already existed; nothing was written.
    Duplicate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_breach_keeps_null_fields() {
        let raw = json!({"Name": "X", "Title": null, "LogoPath": null});
        let breach: Breach = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&breach).unwrap(), raw);
    }

    #[test]
    fn test_breach_accepts_unexpected_types() {
        let raw = json!([
            {"Name": "X", "DataClasses": null, "PwnCount": 12.5},
            {"Title": "no name", "IsVerified": "yes", "Nested": {"a": [1, 2]}}
        ]);
        let breaches: Vec<Breach> = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(breaches[0].name(), Some("X"));
        assert_eq!(breaches[0].get("DataClasses"), Some(&serde_json::Value::Null));
        assert_eq!(breaches[1].name(), None);
        assert_eq!(serde_json::to_value(&breaches).unwrap(), raw);
    }

    #[test]
    fn test_record_serializes_breaches_verbatim() {
        let breach: Breach =
            serde_json::from_value(json!({"Name": "Adobe", "Attribution": null})).unwrap();
        let record = BreachRecord::new("alice@example.com", vec![breach]);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "email": "alice@example.com",
                "breaches": [{"Name": "Adobe", "Attribution": null}]
            })
        );
    }
}
