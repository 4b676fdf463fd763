//! Fetching the raw report data.
//!
//! Builds one task per [`SourceKind`], runs them through the settle-all
//! orchestrator and folds the outcomes into an [`AggregateResult`].

pub mod orchestrator;

pub use orchestrator::{settle_all, FetchOutcome, FetchTask, Progress, Settled};

use crate::error::ReportError;
use crate::models::{AggregateResult, FetchRequest, Payload, SourceKind};
use crate::source::{MetricsSource, Period};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// The aggregate plus the labels of the sources that fell back to defaults.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedData {
    pub aggregate: AggregateResult,
    pub failed_labels: Vec<String>,
}

impl FetchedData {
    pub fn is_partial(&self) -> bool {
        !self.failed_labels.is_empty()
    }
}

/// The task that fills the `kind` slot.
pub fn source_task(
    kind: SourceKind,
    source: Arc<dyn MetricsSource>,
    request: FetchRequest,
) -> FetchTask<Payload> {
    FetchTask::new(kind.label(), async move {
        let source = source.as_ref();
        let request = &request;
        match kind {
            SourceKind::CoreCurrent => source
                .core_totals(request, Period::Current)
                .await
                .map(Payload::Core),
            SourceKind::CorePrevious => source
                .core_totals(request, Period::Comparison)
                .await
                .map(Payload::Core),
            SourceKind::PeakMinute => source.peak_minute(request).await.map(Payload::PeakMinute),
            SourceKind::TopProducts => source.top_products(request).await.map(Payload::Products),
            SourceKind::Channels => source.channels(request).await.map(Payload::Channels),
            SourceKind::Retail => source.retail(request).await.map(Payload::Retail),
            SourceKind::Conversion => source.conversion(request).await.map(Payload::Conversion),
            SourceKind::Customers => source.customers(request).await.map(Payload::Customers),
            SourceKind::Referrers => source.referrers(request).await.map(Payload::Referrers),
            SourceKind::PlatformStats => source
                .platform_stats(request)
                .await
                .map(Payload::PlatformStats),
            SourceKind::ShopBreakdown => source.shop_breakdown(request).await.map(Payload::Shops),
            SourceKind::Discounts => source.discounts(request).await.map(Payload::Discounts),
            SourceKind::International => source
                .international(request)
                .await
                .map(Payload::International),
            SourceKind::UnitsPerTransaction => source
                .units_per_transaction(request)
                .await
                .map(Payload::Scalar),
        }
    })
}

/// One labelled task per source, in [`SourceKind::ALL`] order.
pub fn build_tasks(
    source: Arc<dyn MetricsSource>,
    request: &FetchRequest,
) -> Vec<FetchTask<Payload>> {
    SourceKind::ALL
        .iter()
        .map(|&kind| source_task(kind, Arc::clone(&source), request.clone()))
        .collect()
}

/// Query every source for `request` and assemble the aggregate.
///
/// Individual source failures are absorbed into defaults and reported in
/// `failed_labels`; only a run where every source fails is an error.
pub async fn fetch_report_data<P>(
    source: Arc<dyn MetricsSource>,
    request: &FetchRequest,
    on_progress: P,
) -> Result<FetchedData, ReportError>
where
    P: FnMut(Progress),
{
    let settled = settle_all(build_tasks(source, request), on_progress).await?;
    assemble(settled)
}

/// Fold settled outcomes, in [`SourceKind::ALL`] order, into the aggregate.
///
/// A payload of the wrong shape for its slot counts as a failure, including
/// for the every-source-failed check.
fn assemble(settled: Settled<Payload>) -> Result<FetchedData, ReportError> {
    let total = settled.outcomes.len();
    let mut aggregate = AggregateResult::default();
    let mut failed_labels = settled.failed_labels;

    for (kind, (label, outcome)) in SourceKind::ALL.iter().zip(settled.outcomes) {
        if let FetchOutcome::Success(payload) = outcome {
            if !aggregate.apply(*kind, payload) {
                warn!("{} returned a payload of the wrong shape", label);
                failed_labels.push(label);
            }
        }
    }

    if failed_labels.len() == total {
        return Err(ReportError::AllSourcesFailed {
            total,
            labels: failed_labels,
        });
    }

    Ok(FetchedData {
        aggregate,
        failed_labels,
    })
}
