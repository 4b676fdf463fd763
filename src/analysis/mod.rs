//! Derived metrics.
//!
//! Pure computations over the fetched aggregate: year-over-year changes,
//! customer and channel mix, and the performance score.

pub mod derived;
pub mod score;

pub use derived::{compute_derived_metrics, DerivedMetrics, YoyChange};
pub use score::{Grade, GrowthClass, ScoreBreakdown};
