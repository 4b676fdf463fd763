//! Derived metrics computed from the aggregate.
//!
//! Everything here is a pure function of [`AggregateResult`]; computing
//! twice on the same input yields identical output.

use crate::analysis::score::{grade_for, performance_score, Grade, GrowthClass, ScoreBreakdown};
use crate::models::{AggregateResult, ChannelPerformance, ProductSales};
use serde::{Deserialize, Serialize};

/// A current/previous pair and its change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YoyChange {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    pub percent: f64,
}

impl YoyChange {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            delta: current - previous,
            percent: yoy_percent(current, previous),
        }
    }
}

/// Year-over-year percent change.
///
/// Without a prior baseline any positive current value counts as +100%,
/// and zero against zero is 0%.
pub fn yoy_percent(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// `part / whole` as a percentage, 0 when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Metrics derived from one aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub gmv: YoyChange,
    pub orders: YoyChange,
    pub aov: YoyChange,
    /// Returning customers as a percent of all customers.
    pub repeat_customer_rate: f64,
    pub dominant_channel: Option<String>,
    pub dominant_channel_share: f64,
    pub top_product_share: f64,
    /// Completed orders per session, percent.
    pub conversion_rate: f64,
    /// Completed orders per checkout reached, percent.
    pub checkout_completion_rate: f64,
    pub discounted_order_share: f64,
    pub international_share: f64,
    pub retail_share: f64,
    /// Only present when the platform snapshot was fetched.
    pub platform_share: Option<f64>,
    pub score: ScoreBreakdown,
    pub performance_score: u32,
    pub grade: Grade,
    pub growth_class: GrowthClass,
}

/// Compute every derived metric for `aggregate`.
pub fn compute_derived_metrics(aggregate: &AggregateResult) -> DerivedMetrics {
    let gmv = YoyChange::new(aggregate.current.gmv, aggregate.previous.gmv);
    let orders = YoyChange::new(
        aggregate.current.orders as f64,
        aggregate.previous.orders as f64,
    );
    let aov = YoyChange::new(aggregate.current.aov, aggregate.previous.aov);

    let customers = &aggregate.customers;
    let repeat_customer_rate = percent_of(
        customers.returning_customers as f64,
        customers.new_customers.saturating_add(customers.returning_customers) as f64,
    );

    let (dominant_channel, dominant_channel_share) = dominant_channel(&aggregate.channels);
    let top_product_share = top_product_share(&aggregate.top_products);

    let funnel = &aggregate.conversion;
    let conversion_rate = percent_of(funnel.completed as f64, funnel.sessions as f64);
    let checkout_completion_rate =
        percent_of(funnel.completed as f64, funnel.reached_checkout as f64);

    let discounts = &aggregate.discounts;
    let discounted_order_share = percent_of(
        discounts.discounted_orders as f64,
        discounts.discounted_orders.saturating_add(discounts.full_price_orders) as f64,
    );

    let international_share = percent_of(aggregate.international.international_gmv, gmv.current);
    let retail_share = percent_of(aggregate.retail.gmv, gmv.current);
    let platform_share = aggregate
        .platform
        .map(|platform| percent_of(gmv.current, platform.total_gmv));

    let score = ScoreBreakdown::new(
        gmv.percent,
        conversion_rate,
        repeat_customer_rate,
        aggregate.current.aov,
        gmv.current,
    );
    let performance_score = performance_score(&score);

    DerivedMetrics {
        gmv,
        orders,
        aov,
        repeat_customer_rate,
        dominant_channel,
        dominant_channel_share,
        top_product_share,
        conversion_rate,
        checkout_completion_rate,
        discounted_order_share,
        international_share,
        retail_share,
        platform_share,
        score,
        performance_score,
        grade: grade_for(performance_score),
        growth_class: GrowthClass::classify(gmv.percent),
    }
}

/// Highest-GMV channel and its percent of all channel GMV.
///
/// The first listed channel wins a tie.
pub fn dominant_channel(channels: &[ChannelPerformance]) -> (Option<String>, f64) {
    let total: f64 = channels.iter().map(|c| c.gmv).sum();
    let top = channels.iter().fold(None, |best: Option<&ChannelPerformance>, c| match best {
        Some(b) if b.gmv >= c.gmv => Some(b),
        _ => Some(c),
    });

    match top {
        Some(channel) => (Some(channel.channel.clone()), percent_of(channel.gmv, total)),
        None => (None, 0.0),
    }
}

/// The top-ranked product's percent of all listed product revenue.
pub fn top_product_share(products: &[ProductSales]) -> f64 {
    let total: f64 = products.iter().map(|p| p.revenue).sum();
    products
        .first()
        .map(|top| percent_of(top.revenue, total))
        .unwrap_or(0.0)
}
