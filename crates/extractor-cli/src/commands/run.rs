//! `extractor run` command implementation

use anyhow::Result;
use extractor_common::{PartitionLabel, RunSummary};
use extractor_server::extract::{ExtractRequest, Extractor};
use tracing::info;

/// Execute one extraction for `label`, requesting at most `n` records.
pub async fn run(extractor: &Extractor, n: u64, label: PartitionLabel) -> Result<RunSummary> {
    let request = ExtractRequest::new(n, label)?;
    info!(label = %request.label, n, "Running one-shot extraction");
    Ok(extractor.run(request).await?)
}
