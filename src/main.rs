//! bfcm-recap - Black Friday / Cyber Monday performance recap
//!
//! A CLI tool that fetches every BFCM metric for a set of shops
//! concurrently and turns them into a scored, annotated report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, every source failed, etc.)
//!   2 - Report produced with failed sources and --fail-on-partial set

use anyhow::{Context, Result};
use bfcm_recap::cli::{Args, OutputFormat};
use bfcm_recap::config::{Config, CONFIG_FILE_NAME};
use bfcm_recap::fetch::{fetch_report_data, Progress};
use bfcm_recap::models::{FetchRequest, SourceKind};
use bfcm_recap::report::{self, Report};
use bfcm_recap::source::{HttpSource, MetricsSource, SnapshotSource};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("bfcm-recap v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Effective config: {:?}", config);

    match run_recap(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Recap failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .bfcm-recap.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to point at your analytics API or a snapshot file.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete recap workflow. Returns exit code (0 or 2).
async fn run_recap(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    let (start, end) = match (args.start, args.end) {
        (Some(start), Some(end)) => (start, end),
        _ => anyhow::bail!("Both --start and --end are required"),
    };
    let request = FetchRequest::new(args.shops.clone(), start, end)?;

    let source = build_source(&config)?;

    if !args.quiet {
        eprintln!(
            "📥 Fetching {} metrics for {} shop(s), {} to {}",
            SourceKind::ALL.len(),
            request.shop_ids.len(),
            request.start,
            request.end
        );
    }

    let progress_bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(SourceKind::ALL.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        pb
    };

    let fetched = fetch_report_data(source, &request, |progress: Progress| {
        progress_bar.set_position(progress.completed as u64);
        progress_bar.set_message(progress.label);
    })
    .await;
    progress_bar.finish_and_clear();
    let fetched = fetched?;

    if fetched.is_partial() {
        warn!(
            "{} of {} sources failed: {}",
            fetched.failed_labels.len(),
            SourceKind::ALL.len(),
            fetched.failed_labels.join(", ")
        );
    }

    let report = report::build_report(request, fetched, start_time.elapsed());

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Summary => {
            report::generate_summary_text(&report, config.report.show_locked_badges)
        }
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                print_short_summary(&report);
                println!("\n✅ Recap complete! Report saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    if args.fail_on_partial && report.is_partial() {
        eprintln!(
            "\n⛔ {} source(s) failed. Failing (exit code 2).",
            report.failed_sources.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Pick the metric source from the merged configuration.
fn build_source(config: &Config) -> Result<Arc<dyn MetricsSource>> {
    match config.source.snapshot {
        Some(ref path) => {
            info!("Reading metrics from snapshot: {}", path.display());
            let source = SnapshotSource::load(path)?;
            Ok(Arc::new(source))
        }
        None => {
            info!(
                "Reading metrics from {} (timeout {}s)",
                config.source.api_url, config.source.timeout_seconds
            );
            let source = HttpSource::new(config.source.http())?;
            Ok(Arc::new(source))
        }
    }
}

/// Print the headline numbers after the report went to a file.
fn print_short_summary(report: &Report) {
    let derived = &report.derived;

    println!("\n📊 Recap Summary:");
    println!(
        "   GMV: {:.2} ({:+.1}% YoY)",
        derived.gmv.current, derived.gmv.percent
    );
    println!(
        "   Score: {}/100 | Grade: {} | Badges: {}",
        derived.performance_score,
        derived.grade,
        report.rules.unlocked_badges().count()
    );
    if report.is_partial() {
        println!("   ⚠️  Failed sources: {}", report.failed_sources.join(", "));
    }
    println!("   Duration: {:.1}s", report.duration_seconds);
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE_NAME, e);
            Ok(Config::default())
        }
    }
}
