//! Data models for the BFCM recap pipeline.
//!
//! This module contains the fetch request, the typed payload returned by
//! each metric source, and the fixed-shape aggregate that downstream
//! engines consume.

use crate::error::ReportError;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated request for one report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Opaque shop identifiers (never empty).
    pub shop_ids: Vec<String>,
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
    /// First day of the same window one year earlier.
    pub comparison_start: NaiveDate,
    /// Last day of the same window one year earlier.
    pub comparison_end: NaiveDate,
}

impl FetchRequest {
    /// Build a request, deriving the comparison window by shifting back one year.
    pub fn new(
        shop_ids: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ReportError> {
        if shop_ids.is_empty() {
            return Err(ReportError::InvalidRequest(
                "at least one shop id is required".to_string(),
            ));
        }
        if shop_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(ReportError::InvalidRequest(
                "shop ids must not be blank".to_string(),
            ));
        }
        if start > end {
            return Err(ReportError::InvalidRequest(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        let comparison_start = shift_back_one_year(start)?;
        let comparison_end = shift_back_one_year(end)?;

        Ok(Self {
            shop_ids,
            start,
            end,
            comparison_start,
            comparison_end,
        })
    }

    /// Number of days covered by the window, inclusive.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Same calendar day one year earlier; Feb 29 lands on Feb 28.
fn shift_back_one_year(date: NaiveDate) -> Result<NaiveDate, ReportError> {
    date.checked_sub_months(Months::new(12)).ok_or_else(|| {
        ReportError::InvalidRequest(format!("cannot shift {} back one year", date))
    })
}

/// Identity of each metric source in the BFCM report.
///
/// The declaration order is the submission order of the fetch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    CoreCurrent,
    CorePrevious,
    PeakMinute,
    TopProducts,
    Channels,
    Retail,
    Conversion,
    Customers,
    Referrers,
    PlatformStats,
    ShopBreakdown,
    Discounts,
    International,
    UnitsPerTransaction,
}

impl SourceKind {
    /// Every source, in submission order.
    pub const ALL: [SourceKind; 14] = [
        SourceKind::CoreCurrent,
        SourceKind::CorePrevious,
        SourceKind::PeakMinute,
        SourceKind::TopProducts,
        SourceKind::Channels,
        SourceKind::Retail,
        SourceKind::Conversion,
        SourceKind::Customers,
        SourceKind::Referrers,
        SourceKind::PlatformStats,
        SourceKind::ShopBreakdown,
        SourceKind::Discounts,
        SourceKind::International,
        SourceKind::UnitsPerTransaction,
    ];

    /// Human-readable label used for progress and failure reporting.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::CoreCurrent => "Core metrics",
            SourceKind::CorePrevious => "Core metrics (last year)",
            SourceKind::PeakMinute => "Peak minute",
            SourceKind::TopProducts => "Top products",
            SourceKind::Channels => "Sales channels",
            SourceKind::Retail => "Retail",
            SourceKind::Conversion => "Conversion funnel",
            SourceKind::Customers => "Customer insights",
            SourceKind::Referrers => "Referrers",
            SourceKind::PlatformStats => "Platform stats",
            SourceKind::ShopBreakdown => "Shop breakdown",
            SourceKind::Discounts => "Discounts",
            SourceKind::International => "International",
            SourceKind::UnitsPerTransaction => "Units per transaction",
        }
    }

    /// Stable key used by snapshot files and HTTP paths.
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::CoreCurrent => "core_current",
            SourceKind::CorePrevious => "core_previous",
            SourceKind::PeakMinute => "peak_minute",
            SourceKind::TopProducts => "top_products",
            SourceKind::Channels => "channels",
            SourceKind::Retail => "retail",
            SourceKind::Conversion => "conversion",
            SourceKind::Customers => "customers",
            SourceKind::Referrers => "referrers",
            SourceKind::PlatformStats => "platform_stats",
            SourceKind::ShopBreakdown => "shop_breakdown",
            SourceKind::Discounts => "discounts",
            SourceKind::International => "international",
            SourceKind::UnitsPerTransaction => "units_per_transaction",
        }
    }

    /// Find a source by its label.
    pub fn from_label(label: &str) -> Option<SourceKind> {
        Self::ALL.iter().copied().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Order count, GMV and AOV for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreTotals {
    pub orders: u64,
    pub gmv: f64,
    pub aov: f64,
}

/// The busiest single minute of the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakMinute {
    /// Minute timestamp as reported by the source.
    pub minute: String,
    pub orders: u64,
    pub gmv: f64,
}

/// One entry of the ranked product list (highest revenue first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSales {
    pub title: String,
    #[serde(default)]
    pub units_sold: u64,
    pub revenue: f64,
}

/// One entry of the ranked channel list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelPerformance {
    pub channel: String,
    pub gmv: f64,
    #[serde(default)]
    pub orders: u64,
}

/// Point-of-sale totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetailMetrics {
    pub gmv: f64,
    pub orders: u64,
    #[serde(default)]
    pub locations: u32,
}

/// Online storefront funnel counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionFunnel {
    pub sessions: u64,
    pub added_to_cart: u64,
    pub reached_checkout: u64,
    pub completed: u64,
}

/// New versus returning customer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInsights {
    pub new_customers: u64,
    pub returning_customers: u64,
}

/// One traffic referrer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferrerEntry {
    pub source: String,
    pub sessions: u64,
    #[serde(default)]
    pub gmv: f64,
}

/// Referrer breakdown, busiest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferrerSummary {
    pub referrers: Vec<ReferrerEntry>,
}

impl ReferrerSummary {
    /// Referrer with the most sessions, first listed on ties.
    pub fn top(&self) -> Option<&ReferrerEntry> {
        self.referrers
            .iter()
            .fold(None, |best: Option<&ReferrerEntry>, entry| match best {
                Some(b) if b.sessions >= entry.sessions => Some(b),
                _ => Some(entry),
            })
    }
}

/// Platform-wide totals for the same window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_gmv: f64,
    pub total_orders: u64,
    #[serde(default)]
    pub peak_gmv_per_minute: f64,
}

/// Totals for a single shop in the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopBreakdown {
    pub shop_id: String,
    #[serde(default)]
    pub name: String,
    pub gmv: f64,
    pub orders: u64,
}

/// Discounted versus full-price orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountMetrics {
    pub discounted_orders: u64,
    pub full_price_orders: u64,
    #[serde(default)]
    pub total_discount: f64,
}

/// Sales into one country.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountrySales {
    pub country_code: String,
    pub gmv: f64,
    #[serde(default)]
    pub orders: u64,
}

/// Cross-border sales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternationalMetrics {
    pub international_gmv: f64,
    pub international_orders: u64,
    #[serde(default)]
    pub countries: Vec<CountrySales>,
}

/// A typed payload produced by one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Core(CoreTotals),
    PeakMinute(Option<PeakMinute>),
    Products(Vec<ProductSales>),
    Channels(Vec<ChannelPerformance>),
    Retail(RetailMetrics),
    Conversion(ConversionFunnel),
    Customers(CustomerInsights),
    Referrers(ReferrerSummary),
    PlatformStats(Option<PlatformStats>),
    Shops(Vec<ShopBreakdown>),
    Discounts(DiscountMetrics),
    International(InternationalMetrics),
    Scalar(f64),
}

/// Every source's slot, always populated.
///
/// Slots for failed sources hold their zero/empty default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub current: CoreTotals,
    pub previous: CoreTotals,
    pub peak_minute: Option<PeakMinute>,
    pub top_products: Vec<ProductSales>,
    pub channels: Vec<ChannelPerformance>,
    pub retail: RetailMetrics,
    pub conversion: ConversionFunnel,
    pub customers: CustomerInsights,
    pub referrers: ReferrerSummary,
    pub platform: Option<PlatformStats>,
    pub shops: Vec<ShopBreakdown>,
    pub discounts: DiscountMetrics,
    pub international: InternationalMetrics,
    pub units_per_transaction: f64,
}

impl AggregateResult {
    /// Store a payload in the slot owned by `kind`.
    ///
    /// Returns `false`, leaving the slot untouched, when the payload does not
    /// have the shape that source declares.
    pub fn apply(&mut self, kind: SourceKind, payload: Payload) -> bool {
        match (kind, payload) {
            (SourceKind::CoreCurrent, Payload::Core(totals)) => self.current = totals,
            (SourceKind::CorePrevious, Payload::Core(totals)) => self.previous = totals,
            (SourceKind::PeakMinute, Payload::PeakMinute(peak)) => self.peak_minute = peak,
            (SourceKind::TopProducts, Payload::Products(products)) => self.top_products = products,
            (SourceKind::Channels, Payload::Channels(channels)) => self.channels = channels,
            (SourceKind::Retail, Payload::Retail(retail)) => self.retail = retail,
            (SourceKind::Conversion, Payload::Conversion(funnel)) => self.conversion = funnel,
            (SourceKind::Customers, Payload::Customers(customers)) => self.customers = customers,
            (SourceKind::Referrers, Payload::Referrers(referrers)) => self.referrers = referrers,
            (SourceKind::PlatformStats, Payload::PlatformStats(stats)) => self.platform = stats,
            (SourceKind::ShopBreakdown, Payload::Shops(shops)) => self.shops = shops,
            (SourceKind::Discounts, Payload::Discounts(discounts)) => self.discounts = discounts,
            (SourceKind::International, Payload::International(intl)) => {
                self.international = intl
            }
            (SourceKind::UnitsPerTransaction, Payload::Scalar(upt)) => {
                self.units_per_transaction = upt
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_request_comparison_window() {
        let request =
            FetchRequest::new(vec!["shop-1".to_string()], date(2025, 11, 28), date(2025, 12, 1))
                .unwrap();
        assert_eq!(request.comparison_start, date(2024, 11, 28));
        assert_eq!(request.comparison_end, date(2024, 12, 1));
        assert_eq!(request.days(), 4);
    }

    #[test]
    fn test_request_leap_day_clamps() {
        let request =
            FetchRequest::new(vec!["shop-1".to_string()], date(2024, 2, 29), date(2024, 2, 29))
                .unwrap();
        assert_eq!(request.comparison_start, date(2023, 2, 28));
    }

    #[test]
    fn test_request_rejects_inverted_window() {
        let result =
            FetchRequest::new(vec!["shop-1".to_string()], date(2025, 12, 2), date(2025, 12, 1));
        assert!(matches!(result, Err(ReportError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_rejects_missing_shops() {
        assert!(FetchRequest::new(vec![], date(2025, 11, 28), date(2025, 12, 1)).is_err());
        assert!(
            FetchRequest::new(vec!["  ".to_string()], date(2025, 11, 28), date(2025, 12, 1))
                .is_err()
        );
    }

    #[test]
    fn test_source_labels_are_unique() {
        let mut labels: Vec<_> = SourceKind::ALL.iter().map(|k| k.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), SourceKind::ALL.len());
        assert_eq!(
            SourceKind::from_label("Peak minute"),
            Some(SourceKind::PeakMinute)
        );
    }

    #[test]
    fn test_apply_matches_slot_shape() {
        let mut aggregate = AggregateResult::default();
        let totals = CoreTotals {
            orders: 10,
            gmv: 500.0,
            aov: 50.0,
        };

        assert!(aggregate.apply(SourceKind::CorePrevious, Payload::Core(totals)));
        assert_eq!(aggregate.previous, totals);
        assert_eq!(aggregate.current, CoreTotals::default());

        assert!(!aggregate.apply(SourceKind::Retail, Payload::Scalar(2.0)));
        assert_eq!(aggregate.retail, RetailMetrics::default());
    }

    #[test]
    fn test_top_referrer_keeps_first_on_tie() {
        let summary = ReferrerSummary {
            referrers: vec![
                ReferrerEntry {
                    source: "search".to_string(),
                    sessions: 40,
                    gmv: 0.0,
                },
                ReferrerEntry {
                    source: "social".to_string(),
                    sessions: 40,
                    gmv: 0.0,
                },
            ],
        };
        assert_eq!(summary.top().map(|r| r.source.as_str()), Some("search"));
        assert!(ReferrerSummary::default().top().is_none());
    }
}
