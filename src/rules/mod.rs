//! Threshold rules that turn metrics into insights, recommendations,
//! badges and personalities.
//!
//! Every battery is a fixed, ordered list of `(predicate, outcome)` rules.
//! Ladders take the first rule that matches and always end in a catch-all;
//! the other batteries collect every rule that matches.

pub mod awards;
pub mod insights;
pub mod recommendations;

pub use awards::{evaluate_badges, evaluate_personalities, Award, BadgeStatus};
pub use insights::{generate_insights, Insight, InsightKind};
pub use recommendations::{
    generate_recommendations, Priority, Recommendation, RecommendationCategory,
    MAX_RECOMMENDATIONS,
};

use crate::analysis::DerivedMetrics;
use crate::models::AggregateResult;
use serde::Serialize;
use tracing::debug;

/// What every rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub aggregate: &'a AggregateResult,
    pub derived: &'a DerivedMetrics,
}

impl<'a> RuleContext<'a> {
    pub fn new(aggregate: &'a AggregateResult, derived: &'a DerivedMetrics) -> Self {
        Self { aggregate, derived }
    }
}

/// One `(predicate, outcome)` pair.
pub struct Rule<O> {
    pub name: &'static str,
    pub when: fn(&RuleContext<'_>) -> bool,
    pub then: fn(&RuleContext<'_>) -> O,
}

impl<O> Rule<O> {
    fn fires(&self, ctx: &RuleContext<'_>) -> bool {
        let fired = (self.when)(ctx);
        if fired {
            debug!("Rule {} fired", self.name);
        }
        fired
    }
}

/// Outcome of the first matching rule, top-down.
pub fn first_match<O>(rules: &[Rule<O>], ctx: &RuleContext<'_>) -> Option<O> {
    rules
        .iter()
        .find(|rule| rule.fires(ctx))
        .map(|rule| (rule.then)(ctx))
}

/// Outcomes of every matching rule, in rule order.
pub fn all_matches<O>(rules: &[Rule<O>], ctx: &RuleContext<'_>) -> Vec<O> {
    rules
        .iter()
        .filter(|rule| rule.fires(ctx))
        .map(|rule| (rule.then)(ctx))
        .collect()
}

/// Catch-all predicate closing every ladder.
pub(crate) fn always(_: &RuleContext<'_>) -> bool {
    true
}

/// Everything the rule engine produces for one report.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutput {
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub badges: Vec<BadgeStatus>,
    pub personalities: Vec<Award>,
}

impl RuleOutput {
    pub fn unlocked_badges(&self) -> impl Iterator<Item = &Award> {
        self.badges.iter().filter(|b| b.unlocked).map(|b| &b.badge)
    }
}

/// Run every battery.
pub fn evaluate(aggregate: &AggregateResult, derived: &DerivedMetrics) -> RuleOutput {
    let ctx = RuleContext::new(aggregate, derived);

    RuleOutput {
        insights: generate_insights(&ctx),
        recommendations: generate_recommendations(&ctx),
        badges: evaluate_badges(&ctx),
        personalities: evaluate_personalities(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::compute_derived_metrics;
    use crate::models::{CoreTotals, CustomerInsights, DiscountMetrics};

    const SIGN: [Rule<&'static str>; 3] = [
        Rule {
            name: "positive",
            when: |c| c.derived.gmv.percent > 0.0,
            then: |_| "up",
        },
        Rule {
            name: "any_sales",
            when: |c| c.aggregate.current.gmv > 0.0,
            then: |_| "sales",
        },
        Rule {
            name: "fallback",
            when: always,
            then: |_| "none",
        },
    ];

    #[test]
    fn test_first_match_is_top_down() {
        let aggregate = AggregateResult {
            current: CoreTotals {
                orders: 1,
                gmv: 10.0,
                aov: 10.0,
            },
            ..Default::default()
        };
        let derived = compute_derived_metrics(&aggregate);
        let ctx = RuleContext::new(&aggregate, &derived);

        assert_eq!(first_match(&SIGN, &ctx), Some("up"));
        assert_eq!(all_matches(&SIGN, &ctx), vec!["up", "sales", "none"]);
    }

    #[test]
    fn test_catch_all_makes_ladder_total() {
        let aggregate = AggregateResult::default();
        let derived = compute_derived_metrics(&aggregate);
        let ctx = RuleContext::new(&aggregate, &derived);

        assert_eq!(first_match(&SIGN, &ctx), Some("none"));
    }

    #[test]
    fn test_evaluate_on_all_defaults() {
        let aggregate = AggregateResult::default();
        let derived = compute_derived_metrics(&aggregate);

        let output = evaluate(&aggregate, &derived);

        assert_eq!(output.insights.len(), 4);
        assert!(output.recommendations.len() <= MAX_RECOMMENDATIONS);
        assert_eq!(output.unlocked_badges().count(), 0);
    }

    #[test]
    fn test_evaluate_survives_extreme_counts() {
        let aggregate = AggregateResult {
            customers: CustomerInsights {
                new_customers: u64::MAX,
                returning_customers: 1,
            },
            discounts: DiscountMetrics {
                discounted_orders: u64::MAX,
                full_price_orders: 1,
                total_discount: 0.0,
            },
            ..Default::default()
        };
        let derived = compute_derived_metrics(&aggregate);

        let output = evaluate(&aggregate, &derived);

        assert_eq!(output.insights.len(), 4);
        assert!(output
            .recommendations
            .iter()
            .any(|r| r.title == "Turn first-time buyers into regulars"));
        assert!(output.personalities.iter().any(|p| p.id == "deal_maker"));
    }
}
