//! Confidence intervals for a population mean
//!
//! Intervals are built with the Student-t method: the sample standard error
//! (Bessel-corrected standard deviation over `√n`) is scaled by the two-tailed
//! critical value of the t distribution with `n - 1` degrees of freedom.
//!
//! ```text
//! margin = t(1 - (1 - level) / 2, n - 1) * s / √n
//! bounds = mean ± margin
//! ```
//!
//! At least two observations are required. An empty sample and a single
//! observation fail with distinct errors so that callers can tell "no data"
//! apart from "too little data".

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::StatsError;

/// Default confidence level used throughout the project.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Minimum number of observations for a Student-t interval.
pub const MIN_INTERVAL_SAMPLE_SIZE: usize = 2;

/// A confidence interval for the mean of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Number of observations.
    pub n: usize,
    /// Sample mean.
    pub mean: f64,
    /// Standard error of the mean.
    pub std_error: f64,
    /// Half-width of the interval.
    pub margin_of_error: f64,
    /// `mean - margin_of_error`
    pub lower_bound: f64,
    /// `mean + margin_of_error`
    pub upper_bound: f64,
    /// Confidence level the interval was built for (e.g. `0.95`).
    pub confidence_level: f64,
}

impl ConfidenceInterval {
    /// Computes the Student-t confidence interval of the mean.
    ///
    /// `values` must already be free of missing values.
    ///
    /// # Errors
    ///
    /// * [`StatsError::InvalidConfidenceLevel`] - `confidence_level` is not in (0, 1)
    /// * [`StatsError::Empty`] - `values` is empty
    /// * [`StatsError::InsufficientSampleSize`] - `values` has a single element
    ///
    /// # Examples
    ///
    /// ```
    /// # use metalwatch_stats::{confidence::ConfidenceInterval, StatsError};
    /// let ci = ConfidenceInterval::from_values(&[2.0, 4.0, 6.0], 0.95).unwrap();
    /// assert_eq!(ci.mean, 4.0);
    /// assert!(ci.lower_bound < ci.mean && ci.mean < ci.upper_bound);
    ///
    /// assert_eq!(
    ///     ConfidenceInterval::from_values(&[5.0], 0.95),
    ///     Err(StatsError::InsufficientSampleSize { required: 2, actual: 1 })
    /// );
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64], confidence_level: f64) -> Result<Self, StatsError> {
        validate_confidence_level(confidence_level)?;
        let n = values.len();
        if n == 0 {
            return Err(StatsError::Empty);
        }
        if n < MIN_INTERVAL_SAMPLE_SIZE {
            return Err(StatsError::InsufficientSampleSize {
                required: MIN_INTERVAL_SAMPLE_SIZE,
                actual: n,
            });
        }

        let mean = crate::mean(values);
        let std_dev = crate::sample_variance(values, mean).sqrt();
        let std_error = std_dev / (n as f64).sqrt();
        let margin_of_error = std_error * t_critical_value(n - 1, confidence_level)?;

        Ok(Self {
            n,
            mean,
            std_error,
            margin_of_error,
            lower_bound: mean - margin_of_error,
            upper_bound: mean + margin_of_error,
            confidence_level,
        })
    }

    /// Margin of error for a sample of size `n` with standard deviation `std_dev`.
    ///
    /// Useful for reasoning about how the interval narrows with sample size
    /// without materializing a sample.
    #[expect(clippy::cast_precision_loss)]
    pub fn margin_of_error(
        std_dev: f64,
        n: usize,
        confidence_level: f64,
    ) -> Result<f64, StatsError> {
        validate_confidence_level(confidence_level)?;
        if n < MIN_INTERVAL_SAMPLE_SIZE {
            return Err(StatsError::InsufficientSampleSize {
                required: MIN_INTERVAL_SAMPLE_SIZE,
                actual: n,
            });
        }
        Ok(std_dev / (n as f64).sqrt() * t_critical_value(n - 1, confidence_level)?)
    }

    /// Width of the interval (`upper_bound - lower_bound`).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper_bound - self.lower_bound
    }

    /// Whether `value` lies inside the closed interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.lower_bound <= value && value <= self.upper_bound
    }
}

/// Two-tailed critical value of the Student-t distribution.
///
/// Returns the `1 - (1 - confidence_level) / 2` quantile of the t distribution
/// with `degrees_of_freedom` degrees of freedom.
#[expect(clippy::cast_precision_loss)]
pub fn t_critical_value(
    degrees_of_freedom: usize,
    confidence_level: f64,
) -> Result<f64, StatsError> {
    validate_confidence_level(confidence_level)?;
    let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom as f64)
        .map_err(|_| StatsError::InvalidDistribution { name: "Student-t" })?;
    Ok(dist.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Checks that `level` lies strictly between 0 and 1.
pub fn validate_confidence_level(level: f64) -> Result<(), StatsError> {
    if level > 0.0 && level < 1.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidConfidenceLevel { level })
    }
}
