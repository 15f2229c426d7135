use serde::Serialize;

use crate::{descriptive::DescriptiveStats, histogram::Histogram, percentiles::Percentiles};

/// Percentile points reported by [`DistributionSummary::with_default_points`].
pub const DEFAULT_PERCENTILE_POINTS: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// Statistical overview of a dataset combining multiple measures.
///
/// This structure provides a complete overview of a dataset by combining:
/// - Basic descriptive statistics (mean, median, variance, standard deviation, etc.)
/// - Percentile values for quantile analysis
/// - Histogram for distribution visualization
///
/// # Examples
///
/// ```
/// use metalwatch_stats::distribution::DistributionSummary;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let summary = DistributionSummary::new(values, &[25.0, 50.0, 75.0], 5).unwrap();
///
/// assert_eq!(summary.stats.mean, 5.5);
/// assert_eq!(summary.percentiles.get(50.0), Some(5.5));
/// assert_eq!(summary.histogram.total_count(), 10);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct DistributionSummary {
    /// Basic descriptive statistics for the dataset.
    pub stats: DescriptiveStats,
    /// Precomputed percentile values for quick lookup.
    pub percentiles: Percentiles,
    /// Histogram showing the distribution of values across bins.
    pub histogram: Histogram,
}

impl DistributionSummary {
    /// Computes the summary from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(DistributionSummary)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    #[must_use]
    pub fn new<I>(values: I, percentile_points: &[f64], hist_num_bins: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points, hist_num_bins)
    }

    /// Computes the summary with [`DEFAULT_PERCENTILE_POINTS`].
    #[must_use]
    pub fn with_default_points<I>(values: I, hist_num_bins: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(values, &DEFAULT_PERCENTILE_POINTS, hist_num_bins)
    }

    /// Computes the summary from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(
        sorted_values: &[f64],
        percentile_points: &[f64],
        hist_num_bins: usize,
    ) -> Option<Self> {
        let stats = DescriptiveStats::from_sorted(sorted_values)?;
        let percentiles = Percentiles::from_sorted(sorted_values, percentile_points);
        let histogram = Histogram::from_sorted(sorted_values, hist_num_bins);

        Some(Self {
            stats,
            percentiles,
            histogram,
        })
    }
}
