//! bfcm-recap - Black Friday / Cyber Monday performance recap
//!
//! Fetches a fixed set of independent metric sources concurrently,
//! tolerating partial failure, then derives year-over-year metrics, a
//! performance score and rule-based insights, recommendations and badges.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod report;
pub mod rules;
pub mod source;

pub use error::ReportError;
