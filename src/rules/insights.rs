//! Narrative insights.
//!
//! Four ladders (growth, funnel, loyalty, channel) always produce exactly
//! one insight each. Highlights are extra insights that only appear when
//! their data was fetched.

use super::{all_matches, always, first_match, Rule, RuleContext};
use crate::analysis::GrowthClass;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Growth,
    Funnel,
    Loyalty,
    Channel,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub headline: String,
    pub text: String,
}

fn insight(kind: InsightKind, headline: &str, text: String) -> Insight {
    Insight {
        kind,
        headline: headline.to_string(),
        text,
    }
}

const GROWTH: [Rule<Insight>; 6] = [
    Rule {
        name: "no_sales",
        when: |c| c.aggregate.current.gmv <= 0.0 && c.aggregate.previous.gmv <= 0.0,
        then: |_| {
            insight(
                InsightKind::Growth,
                "No sales yet",
                "No sales were recorded in this window or the same window last year.".to_string(),
            )
        },
    },
    Rule {
        name: "exceptional",
        when: |c| c.derived.growth_class == GrowthClass::Exceptional,
        then: |c| {
            insight(
                InsightKind::Growth,
                "Exceptional growth",
                format!(
                    "GMV grew {:.1}% year over year to {:.2}, a breakout BFCM.",
                    c.derived.gmv.percent, c.derived.gmv.current
                ),
            )
        },
    },
    Rule {
        name: "strong",
        when: |c| c.derived.growth_class == GrowthClass::Strong,
        then: |c| {
            insight(
                InsightKind::Growth,
                "Strong growth",
                format!(
                    "GMV grew {:.1}% year over year, adding {:.2} in sales.",
                    c.derived.gmv.percent, c.derived.gmv.delta
                ),
            )
        },
    },
    Rule {
        name: "moderate",
        when: |c| c.derived.growth_class == GrowthClass::Moderate,
        then: |c| {
            insight(
                InsightKind::Growth,
                "Steady growth",
                format!(
                    "GMV edged up {:.1}% on last year's BFCM.",
                    c.derived.gmv.percent
                ),
            )
        },
    },
    Rule {
        name: "flat",
        when: |c| c.derived.growth_class == GrowthClass::Flat,
        then: |c| {
            insight(
                InsightKind::Growth,
                "Holding steady",
                format!(
                    "GMV was roughly level with last year ({:+.1}%).",
                    c.derived.gmv.percent
                ),
            )
        },
    },
    Rule {
        name: "declining",
        when: always,
        then: |c| {
            insight(
                InsightKind::Growth,
                "Sales declined",
                format!(
                    "GMV fell {:.1}% compared with the same window last year.",
                    c.derived.gmv.percent.abs()
                ),
            )
        },
    },
];

const FUNNEL: [Rule<Insight>; 5] = [
    Rule {
        name: "no_traffic",
        when: |c| c.aggregate.conversion.sessions == 0,
        then: |_| {
            insight(
                InsightKind::Funnel,
                "No storefront traffic",
                "No online sessions were recorded, so conversion could not be measured."
                    .to_string(),
            )
        },
    },
    Rule {
        name: "elite",
        when: |c| c.derived.conversion_rate >= 4.0,
        then: |c| {
            insight(
                InsightKind::Funnel,
                "Elite conversion",
                format!(
                    "{:.2}% of sessions turned into orders, well above a typical storefront.",
                    c.derived.conversion_rate
                ),
            )
        },
    },
    Rule {
        name: "healthy",
        when: |c| c.derived.conversion_rate >= 2.5,
        then: |c| {
            insight(
                InsightKind::Funnel,
                "Healthy conversion",
                format!(
                    "{:.2}% of sessions converted; the funnel held up under peak traffic.",
                    c.derived.conversion_rate
                ),
            )
        },
    },
    Rule {
        name: "average",
        when: |c| c.derived.conversion_rate >= 1.0,
        then: |c| {
            insight(
                InsightKind::Funnel,
                "Average conversion",
                format!(
                    "{:.2}% of sessions converted, with {:.1}% of checkouts completed.",
                    c.derived.conversion_rate, c.derived.checkout_completion_rate
                ),
            )
        },
    },
    Rule {
        name: "weak",
        when: always,
        then: |c| {
            insight(
                InsightKind::Funnel,
                "Conversion needs work",
                format!(
                    "Only {:.2}% of {} sessions converted into orders.",
                    c.derived.conversion_rate, c.aggregate.conversion.sessions
                ),
            )
        },
    },
];

const LOYALTY: [Rule<Insight>; 4] = [
    Rule {
        name: "strong",
        when: |c| c.derived.repeat_customer_rate >= 40.0,
        then: |c| {
            insight(
                InsightKind::Loyalty,
                "Strong loyalty",
                format!(
                    "{:.1}% of customers were returning buyers.",
                    c.derived.repeat_customer_rate
                ),
            )
        },
    },
    Rule {
        name: "healthy",
        when: |c| c.derived.repeat_customer_rate >= 20.0,
        then: |c| {
            insight(
                InsightKind::Loyalty,
                "Healthy loyalty",
                format!(
                    "{:.1}% of customers came back, alongside {} new customers.",
                    c.derived.repeat_customer_rate, c.aggregate.customers.new_customers
                ),
            )
        },
    },
    Rule {
        name: "building",
        when: |c| c.derived.repeat_customer_rate > 0.0,
        then: |c| {
            insight(
                InsightKind::Loyalty,
                "Building loyalty",
                format!(
                    "Returning buyers made up {:.1}% of customers; most were new.",
                    c.derived.repeat_customer_rate
                ),
            )
        },
    },
    Rule {
        name: "new_audience",
        when: always,
        then: |_| {
            insight(
                InsightKind::Loyalty,
                "All-new audience",
                "No returning customers were recorded in this window.".to_string(),
            )
        },
    },
];

const CHANNEL: [Rule<Insight>; 4] = [
    Rule {
        name: "no_channels",
        when: |c| c.derived.dominant_channel.is_none() || c.derived.dominant_channel_share <= 0.0,
        then: |_| {
            insight(
                InsightKind::Channel,
                "No channel data",
                "No sales channel breakdown was available.".to_string(),
            )
        },
    },
    Rule {
        name: "concentrated",
        when: |c| c.derived.dominant_channel_share >= 80.0,
        then: |c| {
            insight(
                InsightKind::Channel,
                "Single-channel business",
                format!(
                    "{} carried {:.1}% of channel GMV.",
                    c.derived.dominant_channel.as_deref().unwrap_or_default(),
                    c.derived.dominant_channel_share
                ),
            )
        },
    },
    Rule {
        name: "leading",
        when: |c| c.derived.dominant_channel_share >= 50.0,
        then: |c| {
            insight(
                InsightKind::Channel,
                "Clear lead channel",
                format!(
                    "{} led with {:.1}% of channel GMV.",
                    c.derived.dominant_channel.as_deref().unwrap_or_default(),
                    c.derived.dominant_channel_share
                ),
            )
        },
    },
    Rule {
        name: "balanced",
        when: always,
        then: |c| {
            insight(
                InsightKind::Channel,
                "Balanced channel mix",
                format!(
                    "No channel dominated; the largest, {}, took {:.1}%.",
                    c.derived.dominant_channel.as_deref().unwrap_or_default(),
                    c.derived.dominant_channel_share
                ),
            )
        },
    },
];

const HIGHLIGHTS: [Rule<Insight>; 2] = [
    Rule {
        name: "peak_minute",
        when: |c| c.aggregate.peak_minute.as_ref().is_some_and(|p| p.orders > 0),
        then: |c| {
            let (minute, orders, gmv) = c
                .aggregate
                .peak_minute
                .as_ref()
                .map(|p| (p.minute.as_str(), p.orders, p.gmv))
                .unwrap_or_default();
            insight(
                InsightKind::Highlight,
                "Peak minute",
                format!(
                    "The busiest minute ({}) brought in {} orders worth {:.2}.",
                    minute, orders, gmv
                ),
            )
        },
    },
    Rule {
        name: "platform_share",
        when: |c| c.derived.platform_share.is_some_and(|share| share > 0.0),
        then: |c| {
            insight(
                InsightKind::Highlight,
                "Share of the platform",
                format!(
                    "These shops accounted for {:.4}% of all platform GMV over the window.",
                    c.derived.platform_share.unwrap_or_default()
                ),
            )
        },
    },
];

/// One insight per ladder in a fixed order, followed by any highlights.
pub fn generate_insights(ctx: &RuleContext<'_>) -> Vec<Insight> {
    let mut insights: Vec<Insight> = [&GROWTH[..], &FUNNEL[..], &LOYALTY[..], &CHANNEL[..]]
        .into_iter()
        .filter_map(|ladder| first_match(ladder, ctx))
        .collect();

    insights.extend(all_matches(&HIGHLIGHTS, ctx));
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute_derived_metrics;
    use crate::models::{
        AggregateResult, ChannelPerformance, ConversionFunnel, CoreTotals, CustomerInsights,
        PeakMinute,
    };

    fn headlines(aggregate: &AggregateResult) -> Vec<String> {
        let derived = compute_derived_metrics(aggregate);
        generate_insights(&RuleContext::new(aggregate, &derived))
            .into_iter()
            .map(|i| i.headline)
            .collect()
    }

    fn with_gmv(current: f64, previous: f64) -> AggregateResult {
        AggregateResult {
            current: CoreTotals {
                orders: 10,
                gmv: current,
                aov: current / 10.0,
            },
            previous: CoreTotals {
                orders: 10,
                gmv: previous,
                aov: previous / 10.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_growth_ladder() {
        assert_eq!(headlines(&with_gmv(150.0, 100.0))[0], "Exceptional growth");
        assert_eq!(headlines(&with_gmv(120.0, 100.0))[0], "Strong growth");
        assert_eq!(headlines(&with_gmv(105.0, 100.0))[0], "Steady growth");
        assert_eq!(headlines(&with_gmv(95.0, 100.0))[0], "Holding steady");
        assert_eq!(headlines(&with_gmv(50.0, 100.0))[0], "Sales declined");
        assert_eq!(headlines(&with_gmv(0.0, 0.0))[0], "No sales yet");
        assert_eq!(headlines(&with_gmv(10.0, 0.0))[0], "Exceptional growth");
    }

    #[test]
    fn test_loyalty_boundary_selects_strong() {
        let aggregate = AggregateResult {
            customers: CustomerInsights {
                new_customers: 60,
                returning_customers: 40,
            },
            ..Default::default()
        };
        assert_eq!(headlines(&aggregate)[2], "Strong loyalty");

        let aggregate = AggregateResult {
            customers: CustomerInsights {
                new_customers: 61,
                returning_customers: 39,
            },
            ..Default::default()
        };
        assert_eq!(headlines(&aggregate)[2], "Healthy loyalty");
    }

    #[test]
    fn test_funnel_ladder() {
        let funnel = |completed| AggregateResult {
            conversion: ConversionFunnel {
                sessions: 1000,
                added_to_cart: 200,
                reached_checkout: 100,
                completed,
            },
            ..Default::default()
        };

        assert_eq!(headlines(&funnel(40))[1], "Elite conversion");
        assert_eq!(headlines(&funnel(25))[1], "Healthy conversion");
        assert_eq!(headlines(&funnel(10))[1], "Average conversion");
        assert_eq!(headlines(&funnel(5))[1], "Conversion needs work");
        assert_eq!(headlines(&AggregateResult::default())[1], "No storefront traffic");
    }

    #[test]
    fn test_channel_ladder() {
        let channels = |online, pos| AggregateResult {
            channels: vec![
                ChannelPerformance {
                    channel: "Online".to_string(),
                    gmv: online,
                    orders: 0,
                },
                ChannelPerformance {
                    channel: "POS".to_string(),
                    gmv: pos,
                    orders: 0,
                },
            ],
            ..Default::default()
        };

        let aggregate = channels(800.0, 200.0);
        let derived = compute_derived_metrics(&aggregate);
        let insights = generate_insights(&RuleContext::new(&aggregate, &derived));
        assert_eq!(insights[3].headline, "Single-channel business");
        assert!(insights[3].text.contains("Online carried 80.0%"));

        assert_eq!(headlines(&channels(600.0, 400.0))[3], "Clear lead channel");
        assert_eq!(headlines(&channels(450.0, 550.0))[3], "Clear lead channel");
        assert_eq!(headlines(&channels(0.0, 0.0))[3], "No channel data");

        let spread = AggregateResult {
            channels: ["Online", "POS", "Wholesale"]
                .iter()
                .zip([400.0, 300.0, 300.0])
                .map(|(name, gmv)| ChannelPerformance {
                    channel: name.to_string(),
                    gmv,
                    orders: 0,
                })
                .collect(),
            ..Default::default()
        };
        let derived = compute_derived_metrics(&spread);
        let insights = generate_insights(&RuleContext::new(&spread, &derived));
        assert_eq!(insights[3].headline, "Balanced channel mix");
        assert!(insights[3].text.contains("Online, took 40.0%"));
    }

    #[test]
    fn test_highlights_need_their_data() {
        assert_eq!(headlines(&AggregateResult::default()).len(), 4);

        let aggregate = AggregateResult {
            peak_minute: Some(PeakMinute {
                minute: "2025-11-28T09:00".to_string(),
                orders: 42,
                gmv: 3_150.0,
            }),
            ..Default::default()
        };
        let all = headlines(&aggregate);
        assert_eq!(all.len(), 5);
        assert_eq!(all[4], "Peak minute");
    }

    #[test]
    fn test_non_finite_inputs_still_produce_insights() {
        let aggregate = with_gmv(f64::NAN, 100.0);
        assert_eq!(headlines(&aggregate).len(), 4);
    }
}
