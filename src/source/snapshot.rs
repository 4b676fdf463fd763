//! Snapshot-backed metric source.
//!
//! Reads a JSON document with one key per source (see `SourceKind::key`).
//! A key that is absent fails only that source, so a partial snapshot
//! produces a partial report.

use super::{MetricsSource, Period};
use crate::models::{
    ChannelPerformance, ConversionFunnel, CoreTotals, CustomerInsights, DiscountMetrics,
    FetchRequest, InternationalMetrics, PeakMinute, PlatformStats, ProductSales, ReferrerSummary,
    RetailMetrics, ShopBreakdown, SourceKind,
};
use anyhow::{Context, Result};
use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// A metric source answering every query from an in-memory JSON document.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    sections: Map<String, Value>,
}

impl SnapshotSource {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content)? {
            Value::Object(sections) => Ok(Self { sections }),
            _ => anyhow::bail!("Snapshot must be a JSON object keyed by source"),
        }
    }

    /// Keys present in the snapshot.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    fn section<T: DeserializeOwned>(&self, kind: SourceKind) -> Result<T> {
        let value = self
            .sections
            .get(kind.key())
            .with_context(|| format!("Snapshot has no '{}' section", kind.key()))?;

        serde_json::from_value(value.clone())
            .with_context(|| format!("Malformed '{}' section in snapshot", kind.key()))
    }

    fn answer<'a, T>(&'a self, kind: SourceKind, request: &FetchRequest) -> BoxFuture<'a, Result<T>>
    where
        T: DeserializeOwned + Send + 'a,
    {
        debug!(
            "Snapshot query {} for {} shop(s), {} to {}",
            kind.key(),
            request.shop_ids.len(),
            request.start,
            request.end
        );
        future::ready(self.section(kind)).boxed()
    }
}

impl MetricsSource for SnapshotSource {
    fn core_totals<'a>(
        &'a self,
        request: &'a FetchRequest,
        period: Period,
    ) -> BoxFuture<'a, Result<CoreTotals>> {
        let kind = match period {
            Period::Current => SourceKind::CoreCurrent,
            Period::Comparison => SourceKind::CorePrevious,
        };
        self.answer(kind, request)
    }

    fn peak_minute<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Option<PeakMinute>>> {
        self.answer(SourceKind::PeakMinute, request)
    }

    fn top_products<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Vec<ProductSales>>> {
        self.answer(SourceKind::TopProducts, request)
    }

    fn channels<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Vec<ChannelPerformance>>> {
        self.answer(SourceKind::Channels, request)
    }

    fn retail<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<RetailMetrics>> {
        self.answer(SourceKind::Retail, request)
    }

    fn conversion<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<ConversionFunnel>> {
        self.answer(SourceKind::Conversion, request)
    }

    fn customers<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<CustomerInsights>> {
        self.answer(SourceKind::Customers, request)
    }

    fn referrers<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<ReferrerSummary>> {
        self.answer(SourceKind::Referrers, request)
    }

    fn platform_stats<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Option<PlatformStats>>> {
        self.answer(SourceKind::PlatformStats, request)
    }

    fn shop_breakdown<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Vec<ShopBreakdown>>> {
        self.answer(SourceKind::ShopBreakdown, request)
    }

    fn discounts<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<DiscountMetrics>> {
        self.answer(SourceKind::Discounts, request)
    }

    fn international<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<InternationalMetrics>> {
        self.answer(SourceKind::International, request)
    }

    fn units_per_transaction<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<f64>> {
        self.answer(SourceKind::UnitsPerTransaction, request)
    }
}
