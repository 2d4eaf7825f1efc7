//! In-process queue double. Records every accepted body and can be told to
//! refuse connections or publishes.

use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use super::{JobPublisher, QueueConnector, QueueError};

#[derive(Debug, Default)]
struct Shared {
    messages: Mutex<Vec<Vec<u8>>>,
    refuse_connections: AtomicBool,
    fail_publishes: AtomicBool,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    shared: Arc<Shared>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.shared.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.shared.fail_publishes.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<Vec<u8>> {
        self.shared
            .messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// (opened, closed) publisher counts
    pub fn sessions(&self) -> (usize, usize) {
        (
            self.shared.opened.load(Ordering::SeqCst),
            self.shared.closed.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl QueueConnector for MemoryQueue {
    async fn open(&self) -> Result<Box<dyn JobPublisher>, QueueError> {
        if self.shared.refuse_connections.load(Ordering::SeqCst) {
            return Err(QueueError::Connect("connection refused".to_string()));
        }
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryPublisher {
            shared: self.shared.clone(),
        }))
    }
}

struct MemoryPublisher {
    shared: Arc<Shared>,
}

#[async_trait]
impl JobPublisher for MemoryPublisher {
    async fn publish(&self, body: &[u8]) -> Result<(), QueueError> {
        if self.shared.fail_publishes.load(Ordering::SeqCst) {
            return Err(QueueError::Publish("channel closed".to_string()));
        }
        self.shared
            .messages
            .lock()
            .map_err(|_| QueueError::Publish("message log poisoned".to_string()))?
            .push(body.to_vec());
        Ok(())
    }

    async fn close(&self) -> Result<(), QueueError> {
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
