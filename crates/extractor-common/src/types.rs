//! Wire contracts shared between the extractor and its consumers

use serde::{Deserialize, Serialize};

use crate::error::{ExtractorError, Result};

/// Label that groups the chunks of one logical extraction, usually a date
/// such as `2024-06-01`. Used as the object-name prefix and echoed in every
/// job message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionLabel(String);

impl PartitionLabel {
    /// Accepts any label with at least one non-whitespace character.
    /// Surrounding whitespace is trimmed.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExtractorError::InvalidLabel(
                "partition label cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PartitionLabel {
    type Error = ExtractorError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PartitionLabel> for String {
    fn from(label: PartitionLabel) -> Self {
        label.0
    }
}

impl std::fmt::Display for PartitionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Announcement that a raw chunk is durable and ready for cleaning.
///
/// Body format on the queue: `{"date": "<label>", "filename": "<object name>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub date: String,
    pub filename: String,
}

impl JobMessage {
    pub fn new(label: &PartitionLabel, filename: impl Into<String>) -> Self {
        Self {
            date: label.as_str().to_string(),
            filename: filename.into(),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and check a message body taken off the queue.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let message: JobMessage = serde_json::from_slice(body)?;
        if message.date.trim().is_empty() {
            return Err(ExtractorError::InvalidMessage("missing date".to_string()));
        }
        if message.filename.trim().is_empty() {
            return Err(ExtractorError::InvalidMessage("missing filename".to_string()));
        }
        Ok(message)
    }
}

/// Outcome of a run as reported to the trigger caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
}

/// Summary returned by every run that got past validation and setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub files_written: usize,
    pub starting_offset: u64,
    pub ending_offset: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_labels_are_rejected() {
        assert!(PartitionLabel::parse("").is_err());
        assert!(PartitionLabel::parse("   ").is_err());
        assert_eq!(PartitionLabel::parse("2024-06-01").unwrap().as_str(), "2024-06-01");
    }

    #[test]
    fn test_label_whitespace_is_trimmed() {
        let label = PartitionLabel::parse(" 2024-06-01 \n").unwrap();
        assert_eq!(label.as_str(), "2024-06-01");

        let label: PartitionLabel = serde_json::from_str(r#"" 2024-06-01""#).unwrap();
        assert_eq!(label.as_str(), "2024-06-01");
    }

    #[test]
    fn test_job_message_body_shape() {
        let label = PartitionLabel::parse("2024-06-01").unwrap();
        let message = JobMessage::new(&label, "2024-06-01/food_inspections_raw_offset_01000.json");
        let value: serde_json::Value = serde_json::from_slice(&message.to_vec().unwrap()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "date": "2024-06-01",
                "filename": "2024-06-01/food_inspections_raw_offset_01000.json"
            })
        );
    }

    #[test]
    fn test_job_message_requires_filename() {
        let err = JobMessage::from_slice(br#"{"date":"2024-06-01","filename":""}"#).unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidMessage(_)));
        assert!(JobMessage::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_run_summary_serializes_status_lowercase() {
        let summary = RunSummary {
            status: RunStatus::Success,
            files_written: 3,
            starting_offset: 0,
            ending_offset: 3000,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["ending_offset"], 3000);
    }
}
