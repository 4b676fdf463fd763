//! HTTP-backed metric source.
//!
//! Each query is a GET against `{api_url}/v1/metrics/{source}` with the
//! shop list and window as query parameters. The response body is the
//! JSON payload for that source.

use super::{MetricsSource, Period};
use crate::models::{
    ChannelPerformance, ConversionFunnel, CoreTotals, CustomerInsights, DiscountMetrics,
    FetchRequest, InternationalMetrics, PeakMinute, PlatformStats, ProductSales, ReferrerSummary,
    RetailMetrics, ShopBreakdown, SourceKind,
};
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
}

/// A metric source backed by an analytics HTTP API.
pub struct HttpSource {
    config: HttpSourceConfig,
    http_client: reqwest::Client,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Endpoint for one source.
    pub fn endpoint(&self, kind: SourceKind) -> String {
        format!(
            "{}/v1/metrics/{}",
            self.config.api_url.trim_end_matches('/'),
            kind.key()
        )
    }

    /// Query parameters for one source and period.
    pub fn query(request: &FetchRequest, period: Period) -> Vec<(&'static str, String)> {
        let (start, end) = period.window(request);
        vec![
            ("shops", request.shop_ids.join(",")),
            ("start", start.format("%Y-%m-%d").to_string()),
            ("end", end.format("%Y-%m-%d").to_string()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: SourceKind,
        request: &FetchRequest,
        period: Period,
    ) -> Result<T> {
        let url = self.endpoint(kind);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(&Self::query(request, period))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!(
                        "{} timed out after {}s",
                        kind.label(),
                        self.config.timeout_seconds
                    )
                } else if e.is_connect() {
                    anyhow::anyhow!("Cannot connect to metrics API at {}", self.config.api_url)
                } else {
                    anyhow::anyhow!("Failed to query {}: {}", kind.label(), e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Metrics API error {}: {}", status, body));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", kind.label()))
    }

    fn current<'a, T>(&'a self, kind: SourceKind, request: &'a FetchRequest) -> BoxFuture<'a, Result<T>>
    where
        T: DeserializeOwned + Send + 'a,
    {
        self.get_json(kind, request, Period::Current).boxed()
    }
}

impl MetricsSource for HttpSource {
    fn core_totals<'a>(
        &'a self,
        request: &'a FetchRequest,
        period: Period,
    ) -> BoxFuture<'a, Result<CoreTotals>> {
        let kind = match period {
            Period::Current => SourceKind::CoreCurrent,
            Period::Comparison => SourceKind::CorePrevious,
        };
        self.get_json(kind, request, period).boxed()
    }

    fn peak_minute<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Option<PeakMinute>>> {
        self.current(SourceKind::PeakMinute, request)
    }

    fn top_products<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Vec<ProductSales>>> {
        self.current(SourceKind::TopProducts, request)
    }

    fn channels<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Vec<ChannelPerformance>>> {
        self.current(SourceKind::Channels, request)
    }

    fn retail<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<RetailMetrics>> {
        self.current(SourceKind::Retail, request)
    }

    fn conversion<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<ConversionFunnel>> {
        self.current(SourceKind::Conversion, request)
    }

    fn customers<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<CustomerInsights>> {
        self.current(SourceKind::Customers, request)
    }

    fn referrers<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<ReferrerSummary>> {
        self.current(SourceKind::Referrers, request)
    }

    fn platform_stats<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Option<PlatformStats>>> {
        self.current(SourceKind::PlatformStats, request)
    }

    fn shop_breakdown<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<Vec<ShopBreakdown>>> {
        self.current(SourceKind::ShopBreakdown, request)
    }

    fn discounts<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<DiscountMetrics>> {
        self.current(SourceKind::Discounts, request)
    }

    fn international<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<InternationalMetrics>> {
        self.current(SourceKind::International, request)
    }

    fn units_per_transaction<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<f64>> {
        self.current(SourceKind::UnitsPerTransaction, request)
    }
}
