//! Association between exposure category and limit compliance
//!
//! Every sample with a reading is labelled `above`/`within` its metal's limit,
//! the labels are cross-tabulated against a grouping key and the table is
//! tested with Pearson's chi-square test of independence.
//!
//! Only groups present in the data become rows; absent groups are never
//! pre-seeded as empty rows, as that would change the degrees of freedom.
//! Columns are always `above`, `within` in that order.
//!
//! No continuity correction is applied and small expected counts are
//! reported as-is. With few stations per category this is a known
//! limitation of the method, not something the tester compensates for.

use std::collections::BTreeMap;

use metalwatch_stats::{
    StatsError,
    contingency::{ChiSquareTest, ContingencyTable},
};
use serde::Serialize;

use crate::{
    SIGNIFICANCE_LEVEL,
    category::Category,
    classify::{Compliance, ThresholdClassifier},
    error::AnalysisError,
    limits::ReferenceLimits,
    metal::Metal,
    sample::{Sample, SampleTable},
};

/// Contingency table of group × compliance and its chi-square test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationResult<K> {
    pub metal: Metal,
    pub limit: f64,
    pub row_labels: Vec<K>,
    pub column_labels: [Compliance; 2],
    /// Observed counts, `row_labels.len()` rows by two columns.
    pub counts: Vec<[u64; 2]>,
    pub row_totals: Vec<u64>,
    pub column_totals: [u64; 2],
    pub total: u64,
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub expected_frequencies: Vec<[f64; 2]>,
    pub significant: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AssociationTester<'a> {
    classifier: ThresholdClassifier<'a>,
}

impl<'a> AssociationTester<'a> {
    #[must_use]
    pub fn new(limits: &'a ReferenceLimits) -> Self {
        Self {
            classifier: ThresholdClassifier::new(limits),
        }
    }

    /// Tests category × compliance independence for `metal`.
    pub fn test(
        &self,
        table: &SampleTable,
        metal: Metal,
    ) -> Result<AssociationResult<Category>, AnalysisError> {
        self.test_by(table, metal, |sample| sample.category)
    }

    /// Tests independence between `key_fn` groups and compliance for `metal`.
    ///
    /// # Errors
    ///
    /// * [`AnalysisError::MissingLimit`] - no limit registered for `metal`
    /// * [`AnalysisError::Statistics`] with [`StatsError::Empty`] - no readings
    /// * [`AnalysisError::Statistics`] with [`StatsError::DegenerateTable`] -
    ///   a single group, or every reading on the same side of the limit
    pub fn test_by<K, F>(
        &self,
        table: &SampleTable,
        metal: Metal,
        mut key_fn: F,
    ) -> Result<AssociationResult<K>, AnalysisError>
    where
        K: Ord,
        F: FnMut(&Sample) -> K,
    {
        let limit = self.classifier.limit(metal)?;
        let stats_error = |source| AnalysisError::Statistics { metal, source };

        let mut rows = BTreeMap::<K, [u64; 2]>::new();
        for sample in table.samples() {
            if let Some(value) = sample.reading(metal) {
                let compliance = self.classifier.classify_reading(metal, value)?;
                rows.entry(key_fn(sample)).or_default()[compliance.index()] += 1;
            }
        }
        if rows.is_empty() {
            return Err(stats_error(StatsError::Empty));
        }

        let (row_labels, counts): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let contingency = ContingencyTable::new(counts.iter().map(|row| row.to_vec()).collect())
            .map_err(stats_error)?;
        let test = ChiSquareTest::test(&contingency).map_err(stats_error)?;

        let column_totals = contingency.column_totals();
        Ok(AssociationResult {
            metal,
            limit,
            row_labels,
            column_labels: Compliance::ALL,
            row_totals: contingency.row_totals(),
            column_totals: [column_totals[0], column_totals[1]],
            total: contingency.total(),
            counts,
            statistic: test.statistic,
            p_value: test.p_value,
            degrees_of_freedom: test.degrees_of_freedom,
            expected_frequencies: test
                .expected_frequencies
                .iter()
                .map(|row| [row[0], row[1]])
                .collect(),
            significant: test.p_value < SIGNIFICANCE_LEVEL,
        })
    }
}
