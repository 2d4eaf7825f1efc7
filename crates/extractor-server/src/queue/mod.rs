//! Durable job queue used to hand chunks to the cleaning stage
//!
//! A [`QueueConnector`] is opened once per run and yields a
//! [`JobPublisher`] bound to a declared, durable queue.

use async_trait::async_trait;

pub mod amqp;
pub mod memory;

pub use amqp::AmqpConnector;
pub use memory::MemoryQueue;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Queue connection failed: {0}")]
    Connect(String),

    #[error("Queue declaration failed: {0}")]
    Declare(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Queue close failed: {0}")]
    Close(String),
}

/// Opens a publisher for one run.
#[async_trait]
pub trait QueueConnector: Send + Sync {
    /// Connect and make sure the target queue exists.
    async fn open(&self) -> Result<Box<dyn JobPublisher>, QueueError>;
}

#[async_trait]
pub trait JobPublisher: Send + Sync {
    /// Publish one persistent message; resolves once the broker accepted it.
    async fn publish(&self, body: &[u8]) -> Result<(), QueueError>;

    async fn close(&self) -> Result<(), QueueError>;
}
