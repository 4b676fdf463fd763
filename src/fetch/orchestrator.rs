//! Settle-all fan-out/fan-in over independent fetch tasks.
//!
//! Every task is spawned onto the runtime and joined in completion order.
//! A failing task never cancels its siblings; the join loop is the single
//! owner of the completion counter that drives progress events.

use crate::error::ReportError;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use tracing::{debug, info, warn};

/// A labelled, not-yet-started fetch operation.
pub struct FetchTask<T> {
    label: String,
    operation: BoxFuture<'static, Result<T>>,
}

impl<T> FetchTask<T> {
    pub fn new<F>(label: impl Into<String>, operation: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            label: label.into(),
            operation: Box::pin(operation),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Terminal state of one task.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure { label: String, error: String },
}

impl<T> FetchOutcome<T> {
    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failure { .. })
    }
}

/// Emitted once per task, at the moment it terminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub label: String,
}

/// Every task's outcome, in submission order, plus failures in completion order.
#[derive(Debug)]
pub struct Settled<T> {
    pub outcomes: Vec<(String, FetchOutcome<T>)>,
    pub failed_labels: Vec<String>,
}

/// Run all tasks concurrently and wait for each one to succeed or fail.
///
/// Returns [`ReportError::AllSourcesFailed`] only when every task failed.
/// Tasks are detached from this future: dropping it lets in-flight fetches
/// finish on their own.
pub async fn settle_all<T, P>(
    tasks: Vec<FetchTask<T>>,
    mut on_progress: P,
) -> Result<Settled<T>, ReportError>
where
    T: Send + 'static,
    P: FnMut(Progress),
{
    if tasks.is_empty() {
        return Err(ReportError::EmptyPlan);
    }

    let mut seen = HashSet::new();
    for task in &tasks {
        if !seen.insert(task.label.as_str()) {
            return Err(ReportError::DuplicateLabel(task.label.clone()));
        }
    }

    let total = tasks.len();
    let mut labels = Vec::with_capacity(total);
    let mut pending = FuturesUnordered::new();

    for (index, task) in tasks.into_iter().enumerate() {
        labels.push(task.label);
        let handle = tokio::spawn(task.operation);
        pending.push(async move { (index, handle.await) });
    }
    debug!("Spawned {} fetch tasks", total);

    let mut slots: Vec<Option<FetchOutcome<T>>> = (0..total).map(|_| None).collect();
    let mut failed_labels = Vec::new();
    let mut completed = 0;

    while let Some((index, joined)) = pending.next().await {
        let label = &labels[index];
        let outcome = match joined {
            Ok(Ok(payload)) => FetchOutcome::Success(payload),
            Ok(Err(e)) => FetchOutcome::Failure {
                label: label.clone(),
                error: format!("{:#}", e),
            },
            Err(e) => FetchOutcome::Failure {
                label: label.clone(),
                error: if e.is_panic() {
                    "task panicked".to_string()
                } else {
                    format!("task aborted: {}", e)
                },
            },
        };

        if let FetchOutcome::Failure { error, .. } = &outcome {
            warn!("{} failed: {}", label, error);
            failed_labels.push(label.clone());
        }

        completed += 1;
        on_progress(Progress {
            completed,
            total,
            label: label.clone(),
        });
        slots[index] = Some(outcome);
    }

    if failed_labels.len() == total {
        return Err(ReportError::AllSourcesFailed {
            total,
            labels: failed_labels,
        });
    }

    info!(
        "Fetched {} of {} sources ({} failed)",
        total - failed_labels.len(),
        total,
        failed_labels.len()
    );

    let outcomes = labels
        .into_iter()
        .zip(slots)
        .filter_map(|(label, outcome)| outcome.map(|o| (label, o)))
        .collect();

    Ok(Settled {
        outcomes,
        failed_labels,
    })
}
