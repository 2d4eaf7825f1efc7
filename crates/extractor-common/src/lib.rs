//! Extractor Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, error handling and logging for the extractor workspace.
//!
//! - **Types**: the job message placed on the queue and the run summary returned to callers
//! - **Errors**: [`ExtractorError`] for contract violations
//! - **Logging**: one `tracing` subscriber setup for every binary

pub mod error;
pub mod logging;
pub mod types;

pub use error::{ExtractorError, Result};
pub use types::{JobMessage, PartitionLabel, RunStatus, RunSummary};
