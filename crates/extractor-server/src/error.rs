//! Run-level error types and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{queue::QueueError, storage::StorageError};

/// Failures that stop a run before it touches the cursor.
///
/// Mid-loop fetch, write and publish failures are not represented here: the
/// orchestrator absorbs them and still returns a summary.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("An extraction for '{0}' is already running")]
    RunInProgress(String),

    #[error("Storage setup failed: {0}")]
    StorageSetup(#[source] StorageError),

    #[error("Queue setup failed: {0}")]
    QueueSetup(#[source] QueueError),

    #[error("Extraction task aborted: {0}")]
    Aborted(String),
}

impl ExtractError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExtractError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ExtractError::RunInProgress(_) => StatusCode::CONFLICT,
            ExtractError::StorageSetup(_)
            | ExtractError::QueueSetup(_)
            | ExtractError::Aborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Extraction could not start");
        } else {
            tracing::debug!(error = %self, "Extraction request rejected");
        }

        (status, self.to_string()).into_response()
    }
}
