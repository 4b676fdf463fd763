//! Prioritized recommendations.
//!
//! Every rule is checked; each may emit one recommendation. The result is
//! stably sorted by priority and capped at [`MAX_RECOMMENDATIONS`].

use super::{all_matches, Rule, RuleContext};
use crate::analysis::GrowthClass;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_RECOMMENDATIONS: usize = 8;

/// Ordering is `High < Medium < Low`, so an ascending sort puts high first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Growth,
    Optimization,
    Risk,
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationCategory::Growth => write!(f, "growth"),
            RecommendationCategory::Optimization => write!(f, "optimization"),
            RecommendationCategory::Risk => write!(f, "risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
    pub impact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
}

impl Recommendation {
    fn new(
        priority: Priority,
        category: RecommendationCategory,
        title: impl Into<String>,
        description: String,
        impact: impl Into<String>,
        feature: Option<&str>,
    ) -> Self {
        Self {
            priority,
            category,
            title: title.into(),
            description,
            impact: impact.into(),
            feature: feature.map(String::from),
        }
    }
}

use Priority::{High, Low, Medium};
use RecommendationCategory::{Growth, Optimization, Risk};

const RULES: [Rule<Recommendation>; 13] = [
    Rule {
        name: "low_conversion",
        when: |c| c.aggregate.conversion.sessions > 0 && c.derived.conversion_rate < 1.5,
        then: |c| {
            Recommendation::new(
                High,
                Optimization,
                "Fix checkout friction",
                format!(
                    "Only {:.2}% of sessions converted. Shorten checkout and offer accelerated payment.",
                    c.derived.conversion_rate
                ),
                "Each extra 0.5pt of conversion is worth a sizeable share of peak-week revenue.",
                Some("Accelerated checkout"),
            )
        },
    },
    Rule {
        name: "checkout_abandonment",
        when: |c| {
            c.aggregate.conversion.reached_checkout > 0 && c.derived.checkout_completion_rate < 50.0
        },
        then: |c| {
            Recommendation::new(
                High,
                Optimization,
                "Recover abandoned checkouts",
                format!(
                    "{:.1}% of checkouts were completed. Follow up with shoppers who stopped at payment.",
                    c.derived.checkout_completion_rate
                ),
                "Recovered checkouts convert at a far higher rate than cold traffic.",
                Some("Abandoned checkout emails"),
            )
        },
    },
    Rule {
        name: "yoy_decline",
        when: |c| c.aggregate.previous.gmv > 0.0 && c.derived.gmv.percent < 0.0,
        then: |c| {
            Recommendation::new(
                High,
                Risk,
                "Reverse the year-over-year decline",
                format!(
                    "GMV is down {:.1}% on last year. Revisit pricing, promotion timing and traffic sources.",
                    c.derived.gmv.percent.abs()
                ),
                "Closing the gap restores last year's baseline before the next peak.",
                None,
            )
        },
    },
    Rule {
        name: "channel_concentration",
        when: |c| c.derived.dominant_channel_share > 80.0,
        then: |c| {
            Recommendation::new(
                Medium,
                Risk,
                "Diversify sales channels",
                format!(
                    "{} accounts for {:.1}% of channel GMV. Add a second channel to spread the risk.",
                    c.derived.dominant_channel.as_deref().unwrap_or_default(),
                    c.derived.dominant_channel_share
                ),
                "An outage or policy change on one channel would no longer halt sales.",
                Some("Sales channels"),
            )
        },
    },
    Rule {
        name: "hero_product",
        when: |c| c.derived.top_product_share > 50.0,
        then: |c| {
            let title = c
                .aggregate
                .top_products
                .first()
                .map(|p| p.title.as_str())
                .unwrap_or_default();
            Recommendation::new(
                Medium,
                Risk,
                "Reduce reliance on one product",
                format!(
                    "{} drove {:.1}% of product revenue. Cross-sell complementary items alongside it.",
                    title, c.derived.top_product_share
                ),
                "A broader bestseller list protects revenue if the hero item sells out.",
                Some("Product recommendations"),
            )
        },
    },
    Rule {
        name: "low_repeat",
        when: |c| {
            let customers = &c.aggregate.customers;
            customers.new_customers.saturating_add(customers.returning_customers) > 0
                && c.derived.repeat_customer_rate < 20.0
        },
        then: |c| {
            Recommendation::new(
                Medium,
                Growth,
                "Turn first-time buyers into regulars",
                format!(
                    "Returning customers were {:.1}% of buyers. Start a post-purchase loyalty flow.",
                    c.derived.repeat_customer_rate
                ),
                "Returning customers cost less to reach and order more often.",
                Some("Customer segments"),
            )
        },
    },
    Rule {
        name: "low_aov",
        when: |c| c.aggregate.current.orders > 0 && c.aggregate.current.aov < 50.0,
        then: |c| {
            Recommendation::new(
                Medium,
                Growth,
                "Raise average order value",
                format!(
                    "AOV was {:.2}. Bundles and free-shipping thresholds lift basket value.",
                    c.aggregate.current.aov
                ),
                "A higher AOV grows revenue without more traffic.",
                Some("Bundles"),
            )
        },
    },
    Rule {
        name: "discount_dependence",
        when: |c| c.derived.discounted_order_share > 60.0,
        then: |c| {
            Recommendation::new(
                Medium,
                Optimization,
                "Lean less on discounts",
                format!(
                    "{:.1}% of orders used a discount. Test smaller or tiered offers.",
                    c.derived.discounted_order_share
                ),
                "Recovering even part of the discount spend goes straight to margin.",
                Some("Discounts"),
            )
        },
    },
    Rule {
        name: "aov_erosion",
        when: |c| c.derived.orders.percent > 0.0 && c.derived.aov.percent < -10.0,
        then: |c| {
            Recommendation::new(
                Medium,
                Optimization,
                "Protect order value as volume grows",
                format!(
                    "Orders rose {:.1}% but AOV fell {:.1}%. Check whether deeper promotions drove the volume.",
                    c.derived.orders.percent,
                    c.derived.aov.percent.abs()
                ),
                "Keeping AOV steady turns order growth into revenue growth.",
                None,
            )
        },
    },
    Rule {
        name: "small_baskets",
        when: |c| {
            c.aggregate.units_per_transaction > 0.0 && c.aggregate.units_per_transaction < 1.5
        },
        then: |c| {
            Recommendation::new(
                Low,
                Growth,
                "Encourage multi-item baskets",
                format!(
                    "Shoppers bought {:.2} units per order. Suggest add-ons at cart.",
                    c.aggregate.units_per_transaction
                ),
                "One more unit per order compounds across every order.",
                Some("Cross-sell"),
            )
        },
    },
    Rule {
        name: "domestic_only",
        when: |c| c.aggregate.current.orders > 0 && c.derived.international_share < 5.0,
        then: |c| {
            Recommendation::new(
                Low,
                Growth,
                "Sell across borders",
                format!(
                    "International sales were {:.1}% of GMV. Localize prices and currency for top markets.",
                    c.derived.international_share
                ),
                "Cross-border buyers extend the peak beyond the home market.",
                Some("Markets"),
            )
        },
    },
    Rule {
        name: "no_retail",
        when: |c| c.aggregate.current.orders > 0 && c.aggregate.retail.orders == 0,
        then: |_| {
            Recommendation::new(
                Low,
                Growth,
                "Meet customers in person",
                "No in-person sales were recorded. A pop-up or wholesale partner can test demand."
                    .to_string(),
                "In-person channels reach shoppers who do not buy online.",
                Some("Point of sale"),
            )
        },
    },
    Rule {
        name: "keep_momentum",
        when: |c| c.derived.growth_class == GrowthClass::Exceptional,
        then: |c| {
            Recommendation::new(
                Low,
                Growth,
                "Keep the new customers coming back",
                format!(
                    "GMV grew {:.1}%. Follow up with this season's new buyers before the holidays.",
                    c.derived.gmv.percent
                ),
                "Retaining peak-season buyers carries growth into next year.",
                Some("Email marketing"),
            )
        },
    },
];

/// Every matching recommendation, high priority first, at most eight.
pub fn generate_recommendations(ctx: &RuleContext<'_>) -> Vec<Recommendation> {
    let mut recommendations = all_matches(&RULES, ctx);
    recommendations.sort_by_key(|r| r.priority);
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute_derived_metrics;
    use crate::models::{
        AggregateResult, ChannelPerformance, ConversionFunnel, CoreTotals, CustomerInsights,
        DiscountMetrics, ProductSales,
    };

    fn recommend(aggregate: &AggregateResult) -> Vec<Recommendation> {
        let derived = compute_derived_metrics(aggregate);
        generate_recommendations(&RuleContext::new(aggregate, &derived))
    }

    /// A shop that trips nearly every rule.
    fn struggling_shop() -> AggregateResult {
        AggregateResult {
            current: CoreTotals {
                orders: 500,
                gmv: 15_000.0,
                aov: 30.0,
            },
            previous: CoreTotals {
                orders: 400,
                gmv: 20_000.0,
                aov: 50.0,
            },
            channels: vec![ChannelPerformance {
                channel: "Online".to_string(),
                gmv: 15_000.0,
                orders: 500,
            }],
            top_products: vec![
                ProductSales {
                    title: "Hoodie".to_string(),
                    units_sold: 300,
                    revenue: 9_000.0,
                },
                ProductSales {
                    title: "Cap".to_string(),
                    units_sold: 100,
                    revenue: 1_000.0,
                },
            ],
            conversion: ConversionFunnel {
                sessions: 100_000,
                added_to_cart: 5_000,
                reached_checkout: 2_000,
                completed: 500,
            },
            customers: CustomerInsights {
                new_customers: 450,
                returning_customers: 50,
            },
            discounts: DiscountMetrics {
                discounted_orders: 400,
                full_price_orders: 100,
                total_discount: 3_000.0,
            },
            units_per_transaction: 1.1,
            ..Default::default()
        }
    }

    #[test]
    fn test_capped_and_sorted_by_priority() {
        let aggregate = struggling_shop();
        let derived = compute_derived_metrics(&aggregate);
        let ctx = RuleContext::new(&aggregate, &derived);
        assert!(all_matches(&RULES, &ctx).len() > MAX_RECOMMENDATIONS);

        let recommendations = generate_recommendations(&ctx);

        assert_eq!(recommendations.len(), MAX_RECOMMENDATIONS);
        assert!(recommendations
            .windows(2)
            .all(|pair| pair[0].priority <= pair[1].priority));
        assert_eq!(recommendations[0].title, "Fix checkout friction");
    }

    #[test]
    fn test_sort_keeps_rule_order_within_priority() {
        let recommendations = recommend(&struggling_shop());

        let high: Vec<_> = recommendations
            .iter()
            .filter(|r| r.priority == Priority::High)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(
            high,
            vec![
                "Fix checkout friction",
                "Recover abandoned checkouts",
                "Reverse the year-over-year decline"
            ]
        );

        let medium: Vec<_> = recommendations
            .iter()
            .filter(|r| r.priority == Priority::Medium)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(
            medium,
            vec![
                "Diversify sales channels",
                "Reduce reliance on one product",
                "Turn first-time buyers into regulars",
                "Raise average order value",
                "Lean less on discounts"
            ]
        );
    }

    #[test]
    fn test_no_recommendations_without_data() {
        assert!(recommend(&AggregateResult::default()).is_empty());
    }

    #[test]
    fn test_low_priority_rules_survive_when_room() {
        let aggregate = AggregateResult {
            current: CoreTotals {
                orders: 100,
                gmv: 12_000.0,
                aov: 120.0,
            },
            units_per_transaction: 1.2,
            ..Default::default()
        };

        let titles: Vec<_> = recommend(&aggregate).into_iter().map(|r| r.title).collect();

        assert_eq!(
            titles,
            vec![
                "Encourage multi-item baskets",
                "Sell across borders",
                "Meet customers in person",
                "Keep the new customers coming back"
            ]
        );
    }

    #[test]
    fn test_feature_is_optional() {
        let recommendations = recommend(&struggling_shop());
        let decline = recommendations
            .iter()
            .find(|r| r.title == "Reverse the year-over-year decline")
            .unwrap();
        assert_eq!(decline.category, RecommendationCategory::Risk);
        assert!(decline.feature.is_none());
        assert!(decline.description.contains("25.0%"));
    }
}
