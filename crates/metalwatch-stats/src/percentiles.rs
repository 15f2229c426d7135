//! Linearly interpolated percentiles
//!
//! The `p`-th percentile of `n` sorted values sits at the fractional rank
//! `(n - 1) * p / 100`, interpolated between its two neighbours. This is the
//! default of spreadsheet tools and of `numpy.percentile`.

use serde::Serialize;

/// One requested percentile and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentilePoint {
    /// Percentile in `0.0..=100.0`.
    pub percentile: f64,
    pub value: f64,
}

/// Percentile values of a dataset, in the order the points were requested.
///
/// # Examples
///
/// ```
/// use metalwatch_stats::percentiles::Percentiles;
///
/// let percentiles = Percentiles::new(&[0.004, 0.001, 0.003, 0.002, 0.005], &[25.0, 50.0]);
/// assert_eq!(percentiles.get(50.0), Some(0.003));
/// assert_eq!(percentiles.get(95.0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Percentiles {
    points: Vec<PercentilePoint>,
}

impl Percentiles {
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        let points = percentile_points
            .iter()
            .map(|&percentile| PercentilePoint {
                percentile,
                value: compute_percentile(sorted_values, percentile),
            })
            .collect();
        Self { points }
    }

    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Value at `percentile`, if it was one of the requested points.
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.points
            .iter()
            .find(|point| (point.percentile - percentile).abs() < f64::EPSILON)
            .map(|point| point.value)
    }

    pub fn points(&self) -> &[PercentilePoint] {
        &self.points
    }
}

/// Interpolated `percentile` of `sorted_values`; `NaN` when empty.
///
/// ```
/// use metalwatch_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    let Some(&last) = sorted_values.last() else {
        return f64::NAN;
    };
    let rank = (sorted_values.len() - 1) as f64 * percentile.clamp(0.0, 100.0) / 100.0;
    let below = rank.floor();
    let idx = below as usize;
    match sorted_values.get(idx + 1) {
        Some(&next) => {
            let base = sorted_values[idx];
            base + (next - base) * (rank - below)
        }
        None => last,
    }
}
