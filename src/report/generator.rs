//! Report output.
//!
//! A terminal summary for people and pretty-printed JSON for everything
//! else. Rendering to images or documents happens downstream.

use super::Report;
use crate::models::SourceKind;
use crate::rules::{Award, Priority};
use anyhow::Result;

/// Generate the terminal summary.
///
/// Locked badges are listed only when `show_locked_badges` is set.
pub fn generate_summary_text(report: &Report, show_locked_badges: bool) -> String {
    let mut output = String::new();

    output.push_str(&generate_header(report));
    output.push_str(&generate_failures_section(&report.failed_sources));
    output.push_str(&generate_headline_section(report));
    output.push_str(&generate_insights_section(report));
    output.push_str(&generate_recommendations_section(report));
    output.push_str(&generate_awards_section(report, show_locked_badges));
    output.push_str(&generate_footer(report));

    output
}

fn generate_header(report: &Report) -> String {
    let request = &report.request;
    let mut section = String::new();

    section.push_str(&format!(
        "🛍️  BFCM Recap: {} to {} ({} day{}, {} shop{})\n",
        request.start,
        request.end,
        request.days(),
        plural(request.days() as usize),
        request.shop_ids.len(),
        plural(request.shop_ids.len()),
    ));
    section.push_str(&format!(
        "   Compared with {} to {}\n\n",
        request.comparison_start, request.comparison_end
    ));

    section
}

fn generate_failures_section(failed: &[String]) -> String {
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str(&format!(
        "⚠️  {} of {} sources failed; their figures show as zero:\n",
        failed.len(),
        SourceKind::ALL.len()
    ));
    for label in failed {
        section.push_str(&format!("   - {}\n", label));
    }
    section.push('\n');

    section
}

fn generate_headline_section(report: &Report) -> String {
    let derived = &report.derived;
    let mut section = String::new();

    section.push_str("📊 Headline:\n");
    section.push_str(&format!(
        "   GMV:    {:>14.2} ({:+.1}% YoY)\n",
        derived.gmv.current, derived.gmv.percent
    ));
    section.push_str(&format!(
        "   Orders: {:>14} ({:+.1}% YoY)\n",
        report.aggregate.current.orders, derived.orders.percent
    ));
    section.push_str(&format!(
        "   AOV:    {:>14.2} ({:+.1}% YoY)\n",
        derived.aov.current, derived.aov.percent
    ));
    section.push_str(&format!(
        "   Score:  {}/100, grade {}, {} growth\n\n",
        derived.performance_score, derived.grade, derived.growth_class
    ));

    section
}

fn generate_insights_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("💡 Insights:\n");
    for insight in &report.rules.insights {
        section.push_str(&format!("   {}: {}\n", insight.headline, insight.text));
    }
    section.push('\n');

    section
}

fn generate_recommendations_section(report: &Report) -> String {
    let recommendations = &report.rules.recommendations;
    if recommendations.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("🧭 Recommendations:\n");
    for (i, rec) in recommendations.iter().enumerate() {
        let marker = match rec.priority {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        };
        section.push_str(&format!("   {}. {} {}\n", i + 1, marker, rec.title));
        section.push_str(&format!("      {}\n", rec.description));
        if let Some(ref feature) = rec.feature {
            section.push_str(&format!("      Try: {}\n", feature));
        }
    }
    section.push('\n');

    section
}

fn generate_awards_section(report: &Report, show_locked_badges: bool) -> String {
    let mut section = String::new();

    let unlocked: Vec<&Award> = report.rules.unlocked_badges().collect();
    section.push_str(&format!(
        "🏅 Badges: {} of {} unlocked\n",
        unlocked.len(),
        report.rules.badges.len()
    ));
    for badge in report.rules.badges.iter() {
        if badge.unlocked {
            section.push_str(&format!("   {} {}\n", badge.badge.tag, badge.badge.label));
        } else if show_locked_badges {
            section.push_str(&format!(
                "   🔒 {} ({})\n",
                badge.badge.label, badge.badge.description
            ));
        }
    }

    if !report.rules.personalities.is_empty() {
        section.push_str("\n🎭 Personality:\n");
        for personality in &report.rules.personalities {
            section.push_str(&format!(
                "   {} {}: {}\n",
                personality.tag, personality.label, personality.description
            ));
        }
    }
    section.push('\n');

    section
}

fn generate_footer(report: &Report) -> String {
    format!(
        "Generated {} in {:.1}s\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.duration_seconds
    )
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchedData;
    use crate::models::{AggregateResult, CoreTotals, CustomerInsights, FetchRequest};
    use crate::report::build_report;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn create_test_report(failed: Vec<String>) -> Report {
        let request = FetchRequest::new(
            vec!["shop-1".to_string(), "shop-2".to_string()],
            NaiveDate::from_ymd_opt(2025, 11, 28).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        )
        .unwrap();

        let aggregate = AggregateResult {
            current: CoreTotals {
                orders: 1_500,
                gmv: 150_000.0,
                aov: 100.0,
            },
            previous: CoreTotals {
                orders: 1_000,
                gmv: 100_000.0,
                aov: 100.0,
            },
            customers: CustomerInsights {
                new_customers: 900,
                returning_customers: 600,
            },
            ..Default::default()
        };

        build_report(
            request,
            FetchedData {
                aggregate,
                failed_labels: failed,
            },
            Duration::from_millis(1_250),
        )
    }

    #[test]
    fn test_generate_summary_text() {
        let report = create_test_report(Vec::new());
        let summary = generate_summary_text(&report, false);

        assert!(summary.contains("BFCM Recap: 2025-11-28 to 2025-12-01 (4 days, 2 shops)"));
        assert!(summary.contains("Compared with 2024-11-28 to 2024-12-01"));
        assert!(summary.contains("+50.0% YoY"));
        assert!(summary.contains("Exceptional growth"));
        assert!(summary.contains("Order Avalanche"));
        assert!(!summary.contains("sources failed"));
        assert!(!summary.contains("🔒"));
        assert!(summary.contains("in 1.2s") || summary.contains("in 1.3s"));
    }

    #[test]
    fn test_summary_lists_failed_sources() {
        let report = create_test_report(vec!["Retail".to_string(), "Referrers".to_string()]);
        let summary = generate_summary_text(&report, false);

        assert!(report.is_partial());
        assert!(summary.contains("2 of 14 sources failed"));
        assert!(summary.contains("   - Retail\n"));
        assert!(summary.contains("   - Referrers\n"));
    }

    #[test]
    fn test_summary_sections_are_line_terminated() {
        let report = create_test_report(vec!["Retail".to_string(), "Referrers".to_string()]);
        let summary = generate_summary_text(&report, false);

        assert!(summary.starts_with(
            "🛍️  BFCM Recap: 2025-11-28 to 2025-12-01 (4 days, 2 shops)\n   Compared with 2024-11-28 to 2024-12-01\n\n⚠️  2 of 14 sources failed"
        ));
        assert!(summary.contains(
            "their figures show as zero:\n   - Retail\n   - Referrers\n\n📊 Headline:\n   GMV:    "
        ));
        assert!(summary.contains("(+50.0% YoY)\n   Orders:           1500 (+50.0% YoY)\n"));
        assert!(summary.contains(" growth\n\n💡 Insights:\n   Exceptional growth: "));
        assert!(summary.ends_with("s\n"));
        assert!(!summary.contains("\n\n\n"));
    }

    #[test]
    fn test_summary_can_show_locked_badges() {
        let report = create_test_report(Vec::new());
        let summary = generate_summary_text(&report, true);

        assert!(summary.contains("🔒 World Traveler"));
        assert!(!summary.contains("🔒 Order Avalanche"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(vec!["Retail".to_string()]);
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["request"]["start"], "2025-11-28");
        assert_eq!(value["failed_sources"][0], "Retail");
        assert_eq!(value["aggregate"]["current"]["orders"], 1_500);
        assert_eq!(value["derived"]["gmv"]["percent"], 50.0);
        assert_eq!(value["rules"]["badges"].as_array().unwrap().len(), 11);
        assert!(value["generated_at"].is_string());
    }
}
