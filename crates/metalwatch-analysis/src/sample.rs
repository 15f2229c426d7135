//! Sample records and the immutable sample table

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{category::Category, metal::Metal};

/// One water-quality measurement record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub station_id: String,
    /// Authoritative exposure category of the record.
    pub category: Category,
    pub sampled_at: Option<NaiveDate>,
    /// Measured concentrations. A metal without an entry was not measured.
    pub readings: BTreeMap<Metal, f64>,
}

impl Sample {
    #[must_use]
    pub fn new(station_id: impl Into<String>, category: Category) -> Self {
        Self {
            station_id: station_id.into(),
            category,
            sampled_at: None,
            readings: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_date(mut self, sampled_at: NaiveDate) -> Self {
        self.sampled_at = Some(sampled_at);
        self
    }

    #[must_use]
    pub fn with_reading(mut self, metal: Metal, value: f64) -> Self {
        self.readings.insert(metal, value);
        self
    }

    /// The reading for `metal`, or `None` when not measured.
    ///
    /// `NaN` entries are treated as not measured.
    #[must_use]
    pub fn reading(&self, metal: Metal) -> Option<f64> {
        self.readings
            .get(&metal)
            .copied()
            .filter(|value| !value.is_nan())
    }
}

/// An immutable collection of samples.
///
/// Row order carries no meaning; every operation on the table is an
/// order-independent aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleTable {
    samples: Vec<Sample>,
}

impl SampleTable {
    #[must_use]
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All present readings of `metal`.
    #[must_use]
    pub fn values(&self, metal: Metal) -> Vec<f64> {
        self.values_where(metal, |_| true)
    }

    /// Present readings of `metal` from the samples matching `predicate`.
    pub fn values_where<F>(&self, metal: Metal, mut predicate: F) -> Vec<f64>
    where
        F: FnMut(&Sample) -> bool,
    {
        self.samples
            .iter()
            .filter(|sample| predicate(sample))
            .filter_map(|sample| sample.reading(metal))
            .collect()
    }

    /// Distinct station ids, sorted.
    #[must_use]
    pub fn stations(&self) -> BTreeSet<&str> {
        self.samples
            .iter()
            .map(|sample| sample.station_id.as_str())
            .collect()
    }

    /// Categories with at least one record.
    #[must_use]
    pub fn categories_present(&self) -> BTreeSet<Category> {
        self.samples.iter().map(|sample| sample.category).collect()
    }
}

impl FromIterator<Sample> for SampleTable {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
