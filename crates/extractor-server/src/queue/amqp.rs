//! RabbitMQ transport (AMQP 0.9.1 via lapin)

use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tracing::{debug, info, instrument};

use super::{JobPublisher, QueueConnector, QueueError};
use crate::config::QueueConfig;

/// Persistent delivery mode (survives broker restarts on a durable queue).
const DELIVERY_MODE_PERSISTENT: u8 = 2;

#[derive(Debug, Clone)]
pub struct AmqpConnector {
    url: String,
    queue: String,
}

impl AmqpConnector {
    pub fn new(config: &QueueConfig) -> Self {
        Self {
            url: config.url.clone(),
            queue: config.queue_name.clone(),
        }
    }
}

#[async_trait]
impl QueueConnector for AmqpConnector {
    #[instrument(skip(self), fields(queue = %self.queue))]
    async fn open(&self) -> Result<Box<dyn JobPublisher>, QueueError> {
        let connection = Connection::connect(&self.url, ConnectionProperties::default())
            .await
            .map_err(|e| QueueError::Connect(format!("amqp connect: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| QueueError::Connect(format!("amqp channel: {e}")))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| QueueError::Connect(format!("amqp confirm mode: {e}")))?;

        channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| QueueError::Declare(format!("amqp declare '{}': {e}", self.queue)))?;

        info!("AMQP channel open, queue declared");

        Ok(Box::new(AmqpPublisher {
            connection,
            channel,
            queue: self.queue.clone(),
        }))
    }
}

pub struct AmqpPublisher {
    connection: Connection,
    channel: Channel,
    queue: String,
}

#[async_trait]
impl JobPublisher for AmqpPublisher {
    #[instrument(level = "debug", skip(self, body), fields(queue = %self.queue))]
    async fn publish(&self, body: &[u8]) -> Result<(), QueueError> {
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(DELIVERY_MODE_PERSISTENT);

        let confirmation = self
            .channel
            .basic_publish("", &self.queue, BasicPublishOptions::default(), body, properties)
            .await
            .map_err(|e| QueueError::Publish(format!("amqp publish: {e}")))?
            .await
            .map_err(|e| QueueError::Publish(format!("amqp confirm: {e}")))?;

        if confirmation.is_nack() {
            return Err(QueueError::Publish("broker rejected the message".to_string()));
        }

        debug!(bytes = body.len(), "Message confirmed by broker");
        Ok(())
    }

    async fn close(&self) -> Result<(), QueueError> {
        self.channel
            .close(200, "run finished")
            .await
            .map_err(|e| QueueError::Close(format!("amqp channel close: {e}")))?;
        self.connection
            .close(200, "run finished")
            .await
            .map_err(|e| QueueError::Close(format!("amqp connection close: {e}")))?;
        Ok(())
    }
}
