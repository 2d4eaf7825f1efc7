//! Process-wide extraction counters, rendered in the Prometheus text format

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    rows_fetched_total: AtomicU64,
    /// f64 bit pattern
    last_run_duration: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One upstream page request was issued.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Rows that made it into a durable chunk.
    pub fn record_rows(&self, rows: u64) {
        self.rows_fetched_total.fetch_add(rows, Ordering::Relaxed);
    }

    pub fn set_last_run_duration(&self, elapsed: Duration) {
        self.last_run_duration
            .store(elapsed.as_secs_f64().to_bits(), Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn rows_fetched_total(&self) -> u64 {
        self.rows_fetched_total.load(Ordering::Relaxed)
    }

    pub fn last_run_duration_seconds(&self) -> f64 {
        f64::from_bits(self.last_run_duration.load(Ordering::Relaxed))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        write_metric(
            &mut out,
            "extractor_requests_total",
            "Total number of API requests made",
            "counter",
            self.requests_total().to_string(),
        );
        write_metric(
            &mut out,
            "extractor_rows_fetched_total",
            "Total rows fetched from API",
            "counter",
            self.rows_fetched_total().to_string(),
        );
        write_metric(
            &mut out,
            "extractor_last_run_duration_seconds",
            "Duration of the most recent extraction job in seconds",
            "gauge",
            self.last_run_duration_seconds().to_string(),
        );
        out
    }
}

fn write_metric(out: &mut String, name: &str, help: &str, kind: &str, value: String) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
    let _ = writeln!(out, "{name} {value}");
}
