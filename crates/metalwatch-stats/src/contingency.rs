//! Contingency tables and Pearson's chi-square test of independence
//!
//! No continuity correction is applied, including for 2×2 tables, and small
//! expected counts are reported as-is rather than triggering an exact test.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::StatsError;

/// An `r × c` matrix of observed counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Creates a table from row-major counts.
    ///
    /// # Errors
    ///
    /// * [`StatsError::Empty`] - no rows, or rows without columns
    /// * [`StatsError::DegenerateTable`] - rows of different lengths
    pub fn new(counts: Vec<Vec<u64>>) -> Result<Self, StatsError> {
        let Some(first) = counts.first() else {
            return Err(StatsError::Empty);
        };
        if first.is_empty() {
            return Err(StatsError::Empty);
        }
        if counts.iter().any(|row| row.len() != first.len()) {
            return Err(StatsError::DegenerateTable {
                reason: "rows have different lengths",
            });
        }
        Ok(Self { counts })
    }

    #[must_use]
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.counts[0].len()
    }

    #[must_use]
    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn column_totals(&self) -> Vec<u64> {
        (0..self.num_columns())
            .map(|col| self.counts.iter().map(|row| row[col]).sum())
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Cell frequencies expected under independence: `row_total * column_total / total`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn expected_frequencies(&self) -> Vec<Vec<f64>> {
        let total = self.total() as f64;
        let column_totals = self.column_totals();
        self.row_totals()
            .into_iter()
            .map(|row_total| {
                column_totals
                    .iter()
                    .map(|&col_total| row_total as f64 * col_total as f64 / total)
                    .collect()
            })
            .collect()
    }
}

/// Result of a chi-square test of independence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareTest {
    /// Pearson's chi-square statistic.
    pub statistic: f64,
    /// Upper-tail probability of the statistic.
    pub p_value: f64,
    /// `(rows - 1) * (columns - 1)`
    pub degrees_of_freedom: usize,
    /// Expected counts under independence, same shape as the table.
    pub expected_frequencies: Vec<Vec<f64>>,
}

impl ChiSquareTest {
    /// Tests independence of the row and column classifications.
    ///
    /// # Errors
    ///
    /// * [`StatsError::Empty`] - the table holds no observations
    /// * [`StatsError::DegenerateTable`] - fewer than two rows or columns, or
    ///   an all-zero row or column (its expected frequencies are zero)
    ///
    /// # Examples
    ///
    /// ```
    /// # use metalwatch_stats::contingency::{ChiSquareTest, ContingencyTable};
    /// let table = ContingencyTable::new(vec![vec![10, 20], vec![30, 40]]).unwrap();
    /// let test = ChiSquareTest::test(&table).unwrap();
    /// assert!((test.statistic - 0.793_650_8).abs() < 1e-6);
    /// assert_eq!(test.expected_frequencies[0], vec![12.0, 18.0]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn test(table: &ContingencyTable) -> Result<Self, StatsError> {
        if table.total() == 0 {
            return Err(StatsError::Empty);
        }
        if table.num_rows() < 2 || table.num_columns() < 2 {
            return Err(StatsError::DegenerateTable {
                reason: "at least two rows and two columns required",
            });
        }
        if table.row_totals().contains(&0) || table.column_totals().contains(&0) {
            return Err(StatsError::DegenerateTable {
                reason: "a row or column has no observations",
            });
        }

        let expected_frequencies = table.expected_frequencies();
        let statistic = table
            .counts()
            .iter()
            .flatten()
            .zip(expected_frequencies.iter().flatten())
            .map(|(&observed, &expected)| (observed as f64 - expected).powi(2) / expected)
            .sum::<f64>();
        let degrees_of_freedom = (table.num_rows() - 1) * (table.num_columns() - 1);
        let dist = ChiSquared::new(degrees_of_freedom as f64)
            .map_err(|_| StatsError::InvalidDistribution { name: "chi-square" })?;
        let p_value = dist.sf(statistic).clamp(0.0, 1.0);

        Ok(Self {
            statistic,
            p_value,
            degrees_of_freedom,
            expected_frequencies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape_validation() {
        assert_eq!(ContingencyTable::new(vec![]), Err(StatsError::Empty));
        assert_eq!(ContingencyTable::new(vec![vec![]]), Err(StatsError::Empty));
        assert!(matches!(
            ContingencyTable::new(vec![vec![1, 2], vec![3]]),
            Err(StatsError::DegenerateTable { .. })
        ));
    }

    #[test]
    fn test_marginals() {
        let table = ContingencyTable::new(vec![vec![3, 1], vec![0, 4], vec![2, 2]]).unwrap();
        assert_eq!(table.row_totals(), vec![4, 4, 4]);
        assert_eq!(table.column_totals(), vec![5, 7]);
        assert_eq!(table.total(), 12);
    }

    #[test]
    fn test_classic_two_by_two() {
        let table = ContingencyTable::new(vec![vec![10, 20], vec![30, 40]]).unwrap();
        let test = ChiSquareTest::test(&table).unwrap();
        assert!((test.statistic - 0.793_650_8).abs() < 1e-6);
        assert!((test.p_value - 0.373_02).abs() < 1e-4, "p = {}", test.p_value);
        assert_eq!(test.degrees_of_freedom, 1);
        assert_eq!(
            test.expected_frequencies,
            vec![vec![12.0, 18.0], vec![28.0, 42.0]]
        );
    }

    #[test]
    fn test_strong_association() {
        let table = ContingencyTable::new(vec![vec![25, 5], vec![10, 20], vec![3, 27]]).unwrap();
        let test = ChiSquareTest::test(&table).unwrap();
        assert_eq!(test.degrees_of_freedom, 2);
        assert!(test.p_value < 0.001);
    }

    #[test]
    fn test_proportional_table_is_independent() {
        let table = ContingencyTable::new(vec![vec![2, 4], vec![5, 10]]).unwrap();
        let test = ChiSquareTest::test(&table).unwrap();
        assert!(test.statistic.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_tables() {
        let single_row = ContingencyTable::new(vec![vec![3, 4]]).unwrap();
        assert!(matches!(
            ChiSquareTest::test(&single_row),
            Err(StatsError::DegenerateTable { .. })
        ));
        let zero_column = ContingencyTable::new(vec![vec![3, 0], vec![4, 0]]).unwrap();
        assert!(matches!(
            ChiSquareTest::test(&zero_column),
            Err(StatsError::DegenerateTable { .. })
        ));
        let empty = ContingencyTable::new(vec![vec![0, 0], vec![0, 0]]).unwrap();
        assert_eq!(ChiSquareTest::test(&empty), Err(StatsError::Empty));
    }
}
