//! Metric sources the report is assembled from.
//!
//! A source answers each of the report's queries independently. The
//! pipeline treats them as opaque: how a source reaches its data (a
//! snapshot file, an HTTP API) is its own business, including timeouts.

pub mod http;
pub mod snapshot;

pub use http::{HttpSource, HttpSourceConfig};
pub use snapshot::SnapshotSource;

use crate::models::{
    ChannelPerformance, ConversionFunnel, CoreTotals, CustomerInsights, DiscountMetrics,
    FetchRequest, InternationalMetrics, PeakMinute, PlatformStats, ProductSales, ReferrerSummary,
    RetailMetrics, ShopBreakdown,
};
use anyhow::Result;
use chrono::NaiveDate;
use futures::future::BoxFuture;

/// Which half of a year-over-year pair to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Current,
    Comparison,
}

impl Period {
    /// The `(start, end)` dates this period covers for `request`.
    pub fn window(&self, request: &FetchRequest) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Current => (request.start, request.end),
            Period::Comparison => (request.comparison_start, request.comparison_end),
        }
    }
}

/// The set of queries a BFCM report needs.
pub trait MetricsSource: Send + Sync {
    fn core_totals<'a>(
        &'a self,
        request: &'a FetchRequest,
        period: Period,
    ) -> BoxFuture<'a, Result<CoreTotals>>;

    fn peak_minute<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<Option<PeakMinute>>>;

    fn top_products<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<Vec<ProductSales>>>;

    fn channels<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<Vec<ChannelPerformance>>>;

    fn retail<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<RetailMetrics>>;

    fn conversion<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<ConversionFunnel>>;

    fn customers<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<CustomerInsights>>;

    fn referrers<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<ReferrerSummary>>;

    fn platform_stats<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<Option<PlatformStats>>>;

    fn shop_breakdown<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<Vec<ShopBreakdown>>>;

    fn discounts<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<DiscountMetrics>>;

    fn international<'a>(&'a self, request: &'a FetchRequest)
        -> BoxFuture<'a, Result<InternationalMetrics>>;

    fn units_per_transaction<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<f64>>;
}
