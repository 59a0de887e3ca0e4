pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;

pub use crate::adapters::{http::HibpClient, memory::MemoryStore, mongo::MongoStore};
pub use crate::config::ScanConfig;
pub use crate::core::extractor::AddressExtractor;
pub use crate::core::scan::{ScanLoop, ScanReport, ScanSettings, ScanState};
pub use crate::utils::error::{Result, ScanError};
