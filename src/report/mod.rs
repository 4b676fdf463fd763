//! The report envelope and its output formats.

pub mod generator;

pub use generator::{generate_json_report, generate_summary_text};

use crate::analysis::{compute_derived_metrics, DerivedMetrics};
use crate::fetch::FetchedData;
use crate::models::{AggregateResult, FetchRequest};
use crate::rules::{self, RuleOutput};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Everything produced for one report window.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub request: FetchRequest,
    pub generated_at: DateTime<Utc>,
    pub aggregate: AggregateResult,
    /// Sources whose slots fell back to defaults, in completion order.
    pub failed_sources: Vec<String>,
    pub derived: DerivedMetrics,
    pub rules: RuleOutput,
    pub duration_seconds: f64,
}

impl Report {
    pub fn is_partial(&self) -> bool {
        !self.failed_sources.is_empty()
    }
}

/// Run the derived metrics and rule engines over fetched data.
pub fn build_report(request: FetchRequest, fetched: FetchedData, elapsed: Duration) -> Report {
    let derived = compute_derived_metrics(&fetched.aggregate);
    let rules = rules::evaluate(&fetched.aggregate, &derived);

    Report {
        request,
        generated_at: Utc::now(),
        aggregate: fetched.aggregate,
        failed_sources: fetched.failed_labels,
        derived,
        rules,
        duration_seconds: elapsed.as_secs_f64(),
    }
}
