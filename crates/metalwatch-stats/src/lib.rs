//! Statistical primitives for the metalwatch project.
//!
//! This crate is domain-free: it knows nothing about metals, stations or
//! exposure categories. It provides:
//!
//! - **Descriptive statistics**: mean, median, sample variance, standard deviation, etc.
//! - **Percentiles**: linearly interpolated percentile values
//! - **Histogram generation**: equal-width frequency distributions
//! - **Distribution summaries**: descriptive statistics, percentiles and a histogram combined
//! - **Confidence intervals**: Student-t intervals for a population mean
//! - **Normality testing**: the Shapiro–Wilk W test
//! - **Location tests**: Welch's two-sample t-test and the Mann–Whitney U test
//! - **Contingency analysis**: the chi-square test of independence
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`histogram`]: Histogram construction for visualizing data distributions
//! - [`distribution`]: Combined descriptive statistics, percentiles and histogram
//! - [`confidence`]: Confidence intervals based on the Student-t distribution
//! - [`normality`]: Shapiro–Wilk normality test
//! - [`location`]: Two-sample tests for a difference in central tendency
//! - [`contingency`]: Contingency tables and the chi-square independence test
//!
//! # Examples
//!
//! ## Computing a confidence interval
//!
//! ```
//! use metalwatch_stats::confidence::ConfidenceInterval;
//!
//! let ci = ConfidenceInterval::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.95).unwrap();
//! assert_eq!(ci.mean, 3.0);
//! assert!(ci.lower_bound < 3.0 && 3.0 < ci.upper_bound);
//! ```
//!
//! ## Testing for normality
//!
//! ```
//! use metalwatch_stats::normality::ShapiroWilk;
//!
//! let test = ShapiroWilk::test(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
//! assert!(test.p_value > 0.05);
//! ```
//!
//! ## Comparing two samples
//!
//! ```
//! use metalwatch_stats::location::WelchTTest;
//!
//! let a = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let b = [10.0, 11.0, 12.0, 13.0, 14.0];
//! let test = WelchTTest::test(&a, &b).unwrap();
//! assert!((test.statistic + 9.0).abs() < 1e-12);
//! assert!(test.p_value < 0.001);
//! ```
//!
//! ## Testing independence
//!
//! ```
//! use metalwatch_stats::contingency::{ChiSquareTest, ContingencyTable};
//!
//! let table = ContingencyTable::new(vec![vec![10, 20], vec![30, 40]]).unwrap();
//! let test = ChiSquareTest::test(&table).unwrap();
//! assert_eq!(test.degrees_of_freedom, 1);
//! ```

use statrs::distribution::Normal;

pub mod confidence;
pub mod contingency;
pub mod descriptive;
pub mod distribution;
pub mod histogram;
pub mod location;
pub mod normality;
pub mod percentiles;

/// Precondition failures of the statistical routines in this crate.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StatsError {
    /// No observations were supplied.
    #[display("no observations")]
    Empty,
    /// Fewer observations than the statistic requires.
    #[display("at least {required} observations required, got {actual}")]
    InsufficientSampleSize { required: usize, actual: usize },
    /// A confidence level outside the open interval (0, 1).
    #[display("confidence level must lie strictly between 0 and 1, got {level}")]
    InvalidConfidenceLevel { level: f64 },
    /// The statistic is undefined for the sample (e.g. all values identical).
    #[display("degenerate sample: {reason}")]
    DegenerateSample { reason: &'static str },
    /// The contingency table cannot be tested.
    #[display("degenerate contingency table: {reason}")]
    DegenerateTable { reason: &'static str },
    /// Distribution parameters rejected by the distribution implementation.
    #[display("invalid parameters for the {name} distribution")]
    InvalidDistribution { name: &'static str },
}

pub(crate) fn standard_normal() -> Result<Normal, StatsError> {
    Normal::new(0.0, 1.0).map_err(|_| StatsError::InvalidDistribution { name: "normal" })
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with Bessel's correction (divisor `n - 1`).
///
/// Returns `NaN` for fewer than two values.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}
