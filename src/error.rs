//! Error types for the report pipeline.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Invalid report request: {0}")]
    InvalidRequest(String),

    #[error("No fetch tasks were supplied")]
    EmptyPlan,

    #[error("Fetch task label '{0}' is used more than once")]
    DuplicateLabel(String),

    #[error("All {total} data sources failed: {}", .labels.join(", "))]
    AllSourcesFailed { total: usize, labels: Vec<String> },
}
