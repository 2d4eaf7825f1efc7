//! Announces durable chunks to the cleaning queue

use extractor_common::{JobMessage, PartitionLabel};
use tracing::{debug, instrument};

use crate::queue::{JobPublisher, QueueError};

pub struct JobAnnouncer {
    publisher: Box<dyn JobPublisher>,
}

impl JobAnnouncer {
    pub fn new(publisher: Box<dyn JobPublisher>) -> Self {
        Self { publisher }
    }

    /// Publish `{"date": label, "filename": object_name}`. Only call this after
    /// the chunk write returned.
    #[instrument(skip(self))]
    pub async fn announce(&self, label: &PartitionLabel, object_name: &str) -> Result<(), QueueError> {
        let body = JobMessage::new(label, object_name)
            .to_vec()
            .map_err(|e| QueueError::Publish(format!("failed to encode job message: {}", e)))?;

        self.publisher.publish(&body).await?;
        debug!("Job announced");
        Ok(())
    }

    pub async fn close(&self) -> Result<(), QueueError> {
        self.publisher.close().await
    }
}
