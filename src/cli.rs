//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// bfcm-recap - Black Friday / Cyber Monday performance recap
///
/// Pulls every BFCM metric for a set of shops concurrently, compares the
/// window with the same dates last year, and turns the numbers into a
/// score, insights, recommendations and badges.
///
/// Examples:
///   bfcm-recap --shops shop-1,shop-2 --start 2025-11-28 --end 2025-12-01
///   bfcm-recap --shops shop-1 --start 2025-11-28 --end 2025-12-01 --snapshot metrics.json
///   bfcm-recap --shops shop-1 --start 2025-11-28 --end 2025-12-01 --format json -o recap.json
///   bfcm-recap --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Shop IDs to include (comma-separated)
    #[arg(
        short,
        long,
        value_name = "IDS",
        value_delimiter = ',',
        env = "BFCM_SHOPS",
        required_unless_present = "init_config"
    )]
    pub shops: Vec<String>,

    /// First day of the BFCM window (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", required_unless_present = "init_config")]
    pub start: Option<NaiveDate>,

    /// Last day of the BFCM window (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", required_unless_present = "init_config")]
    pub end: Option<NaiveDate>,

    /// Read metrics from a JSON snapshot instead of the API
    ///
    /// One top-level key per source. Missing keys fail that source only.
    /// Takes precedence over --api-url.
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Analytics API base URL
    #[arg(long, value_name = "URL", env = "BFCM_API_URL")]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    ///
    /// Default: from config or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .bfcm-recap.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (summary, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List locked badges in the summary as well
    #[arg(long)]
    pub show_locked: bool,

    /// Exit with code 2 when any source failed
    ///
    /// The report is still produced. Useful for scheduled runs.
    #[arg(long)]
    pub fail_on_partial: bool,

    /// Generate a default .bfcm-recap.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal summary (default)
    #[default]
    Summary,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.shops.iter().any(|shop| shop.trim().is_empty()) {
            return Err("Shop IDs must not be empty".to_string());
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!(
                    "Start date {} is after end date {}",
                    start, end
                ));
            }
        }

        if let Some(ref api_url) = self.api_url {
            if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref snapshot) = self.snapshot {
            if !snapshot.is_file() {
                return Err(format!(
                    "Snapshot file does not exist: {}",
                    snapshot.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            shops: vec!["shop-1".to_string()],
            start: NaiveDate::from_ymd_opt(2025, 11, 28),
            end: NaiveDate::from_ymd_opt(2025, 12, 1),
            snapshot: None,
            api_url: None,
            timeout: None,
            config: None,
            format: None,
            output: None,
            verbose: false,
            quiet: false,
            show_locked: false,
            fail_on_partial: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "bfcm-recap",
            "--shops",
            "shop-1,shop-2",
            "--start",
            "2025-11-28",
            "--end",
            "2025-12-01",
            "--format",
            "json",
            "--fail-on-partial",
        ])
        .unwrap();

        assert_eq!(args.shops, vec!["shop-1", "shop-2"]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2025, 11, 28));
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert!(args.fail_on_partial);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let result = Args::try_parse_from([
            "bfcm-recap",
            "--shops",
            "shop-1",
            "--start",
            "28/11/2025",
            "--end",
            "2025-12-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_init_config_needs_nothing_else() {
        let args = Args::try_parse_from(["bfcm-recap", "--init-config"]).unwrap();
        assert!(args.init_config);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_inverted_window() {
        let mut args = make_args();
        args.start = NaiveDate::from_ymd_opt(2025, 12, 2);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.api_url = Some("ftp://metrics".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_snapshot() {
        let mut args = make_args();
        args.snapshot = Some(PathBuf::from("/nonexistent/snapshot.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
