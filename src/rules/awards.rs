//! Badges and merchant personalities.
//!
//! Each is an independent predicate with a static label, description and
//! visual tag. Any number may fire at once.

use super::{Rule, RuleContext};
use crate::analysis::{Grade, GrowthClass};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub id: String,
    pub label: String,
    pub description: String,
    pub tag: String,
}

fn award(id: &str, label: &str, description: &str, tag: &str) -> Award {
    Award {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        tag: tag.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStatus {
    pub badge: Award,
    pub unlocked: bool,
}

const BADGES: [Rule<Award>; 11] = [
    Rule {
        name: "growth_rocket",
        when: |c| c.derived.gmv.percent >= 50.0,
        then: |_| award("growth_rocket", "Growth Rocket", "GMV up 50% or more year over year", "🚀"),
    },
    Rule {
        name: "record_breaker",
        when: |c| c.aggregate.previous.gmv > 0.0 && c.aggregate.current.gmv > c.aggregate.previous.gmv,
        then: |_| award("record_breaker", "Record Breaker", "Beat last year's BFCM sales", "🏆"),
    },
    Rule {
        name: "order_avalanche",
        when: |c| c.aggregate.current.orders >= 1_000,
        then: |_| award("order_avalanche", "Order Avalanche", "1,000 or more orders in the window", "📦"),
    },
    Rule {
        name: "big_baskets",
        when: |c| c.aggregate.current.aov >= 100.0,
        then: |_| award("big_baskets", "Big Baskets", "Average order value of 100 or more", "💎"),
    },
    Rule {
        name: "loyalty_legend",
        when: |c| c.derived.repeat_customer_rate >= 40.0,
        then: |_| award("loyalty_legend", "Loyalty Legend", "40% or more of customers came back", "💜"),
    },
    Rule {
        name: "conversion_pro",
        when: |c| c.derived.conversion_rate >= 3.0,
        then: |_| award("conversion_pro", "Conversion Pro", "3% or more of sessions converted", "🎯"),
    },
    Rule {
        name: "omnichannel",
        when: |c| c.aggregate.channels.iter().filter(|ch| ch.gmv > 0.0).count() >= 3,
        then: |_| award("omnichannel", "Omnichannel", "Sold through three or more channels", "🛍️"),
    },
    Rule {
        name: "world_traveler",
        when: |c| c.aggregate.international.countries.len() >= 10,
        then: |_| award("world_traveler", "World Traveler", "Shipped to 10 or more countries", "🌍"),
    },
    Rule {
        name: "rush_hour",
        when: |c| c.aggregate.peak_minute.as_ref().is_some_and(|p| p.orders >= 10),
        then: |_| award("rush_hour", "Rush Hour", "10 or more orders in a single minute", "⚡"),
    },
    Rule {
        name: "full_price_hero",
        when: |c| {
            let d = &c.aggregate.discounts;
            d.discounted_orders.saturating_add(d.full_price_orders) > 0
                && c.derived.discounted_order_share < 20.0
        },
        then: |_| award("full_price_hero", "Full Price Hero", "Fewer than 20% of orders discounted", "🏷️"),
    },
    Rule {
        name: "honor_roll",
        when: |c| c.derived.grade == Grade::A,
        then: |_| award("honor_roll", "Honor Roll", "Earned an A performance grade", "🅰️"),
    },
];

const PERSONALITIES: [Rule<Award>; 7] = [
    Rule {
        name: "trailblazer",
        when: |c| c.derived.growth_class == GrowthClass::Exceptional,
        then: |_| {
            award(
                "trailblazer",
                "The Trailblazer",
                "Growing faster than almost anyone this season",
                "🔥",
            )
        },
    },
    Rule {
        name: "community_builder",
        when: |c| c.derived.repeat_customer_rate >= 35.0,
        then: |_| {
            award(
                "community_builder",
                "The Community Builder",
                "Customers keep coming back",
                "🤝",
            )
        },
    },
    Rule {
        name: "globetrotter",
        when: |c| c.derived.international_share >= 25.0,
        then: |_| {
            award(
                "globetrotter",
                "The Globetrotter",
                "A quarter or more of sales cross borders",
                "✈️",
            )
        },
    },
    Rule {
        name: "deal_maker",
        when: |c| c.derived.discounted_order_share >= 50.0,
        then: |_| {
            award(
                "deal_maker",
                "The Deal Maker",
                "Promotions drive most of the orders",
                "💸",
            )
        },
    },
    Rule {
        name: "omnichannel_operator",
        when: |c| c.derived.retail_share >= 20.0,
        then: |_| {
            award(
                "omnichannel_operator",
                "The Omnichannel Operator",
                "Stores and online work together",
                "🏬",
            )
        },
    },
    Rule {
        name: "curator",
        when: |c| c.derived.top_product_share >= 40.0,
        then: |_| {
            award(
                "curator",
                "The Curator",
                "One signature product defines the brand",
                "🎨",
            )
        },
    },
    Rule {
        name: "steady_hand",
        when: |c| {
            matches!(
                c.derived.growth_class,
                GrowthClass::Moderate | GrowthClass::Flat
            ) && c.derived.grade <= Grade::B
        },
        then: |_| {
            award(
                "steady_hand",
                "The Steady Hand",
                "Consistent results with strong fundamentals",
                "⚓",
            )
        },
    },
];

/// Every badge with whether it was unlocked, in a fixed order.
pub fn evaluate_badges(ctx: &RuleContext<'_>) -> Vec<BadgeStatus> {
    BADGES
        .iter()
        .map(|rule| BadgeStatus {
            badge: (rule.then)(ctx),
            unlocked: rule.fires(ctx),
        })
        .collect()
}

/// Every personality that fits.
pub fn evaluate_personalities(ctx: &RuleContext<'_>) -> Vec<Award> {
    super::all_matches(&PERSONALITIES, ctx)
}
