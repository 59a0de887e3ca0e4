pub mod extractor;
pub mod scan;

pub use crate::domain::model::{Breach, BreachRecord, FetchOutcome, SaveOutcome};
pub use crate::domain::ports::{BreachSource, BreachStore};
pub use crate::utils::error::Result;
