//! Extractor Server Library
//!
//! Pulls a paged upstream dataset in fixed-size chunks, stores every chunk as
//! an immutable object, announces it on a durable queue for the cleaning
//! stage and keeps a durable cursor so the next run resumes where this one
//! stopped.
//!
//! # Architecture
//!
//! - [`extract`]: the run loop and its collaborators
//! - [`storage`]: [`storage::BlobStore`] with S3 and in-memory backends
//! - [`queue`]: [`queue::QueueConnector`] with AMQP and in-memory backends
//! - [`api`]: the axum router exposing `/extract`, `/health` and `/metrics`
//! - [`config`]: environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use extractor_server::{api, config::Config, extract};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let extractor = extract::build_extractor(&config)?;
//!     let app = api::create_router(api::AppState::new(extractor));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod queue;
pub mod storage;

pub use error::ExtractError;
