//! Confidence intervals of a metal's mean, per group of samples
//!
//! Samples are partitioned by a key (exposure category, station or any
//! closure over the sample) and a Student-t interval is computed for every
//! partition. A partition is handled according to how many readings it has:
//!
//! - no readings: omitted silently, it is "no data" rather than a failure
//! - a single reading: omitted and reported as a [`GroupWarning`]
//! - two or more: an interval is computed
//!
//! The interval itself is [`ConfidenceInterval::from_values`].

use std::{collections::BTreeMap, fmt};

use metalwatch_stats::{
    StatsError,
    confidence::{ConfidenceInterval, validate_confidence_level},
};
use serde::Serialize;

use crate::{
    category::Category,
    error::AnalysisError,
    metal::Metal,
    sample::{Sample, SampleTable},
};

/// A group whose interval could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupWarning {
    pub group: String,
    pub error: StatsError,
}

/// Confidence intervals of one metal keyed by group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedIntervals<K> {
    pub metal: Metal,
    pub confidence_level: f64,
    pub groups: BTreeMap<K, ConfidenceInterval>,
    pub warnings: Vec<GroupWarning>,
}

impl<K> GroupedIntervals<K>
where
    K: Ord + fmt::Display,
{
    /// Computes one interval per distinct `key_fn` value.
    ///
    /// # Errors
    ///
    /// Fails only when `confidence_level` is outside (0, 1); per-group
    /// failures end up in [`GroupedIntervals::warnings`].
    pub fn collect_by_group<F>(
        table: &SampleTable,
        metal: Metal,
        confidence_level: f64,
        mut key_fn: F,
    ) -> Result<Self, AnalysisError>
    where
        F: FnMut(&Sample) -> K,
    {
        validate_confidence_level(confidence_level)
            .map_err(|source| AnalysisError::Statistics { metal, source })?;

        let mut partitions = BTreeMap::<K, Vec<f64>>::new();
        for sample in table.samples() {
            let values = partitions.entry(key_fn(sample)).or_default();
            if let Some(value) = sample.reading(metal) {
                values.push(value);
            }
        }

        let mut groups = BTreeMap::new();
        let mut warnings = vec![];
        for (key, values) in partitions {
            match ConfidenceInterval::from_values(&values, confidence_level) {
                Ok(interval) => {
                    groups.insert(key, interval);
                }
                Err(StatsError::Empty) => log::debug!("{metal}: no readings in group {key}"),
                Err(error) => {
                    log::warn!("{metal}: no interval for group {key}: {error}");
                    warnings.push(GroupWarning {
                        group: key.to_string(),
                        error,
                    });
                }
            }
        }

        Ok(Self {
            metal,
            confidence_level,
            groups,
            warnings,
        })
    }
}

impl GroupedIntervals<Category> {
    pub fn by_category(
        table: &SampleTable,
        metal: Metal,
        confidence_level: f64,
    ) -> Result<Self, AnalysisError> {
        Self::collect_by_group(table, metal, confidence_level, |sample| sample.category)
    }
}

impl GroupedIntervals<String> {
    pub fn by_station(
        table: &SampleTable,
        metal: Metal,
        confidence_level: f64,
    ) -> Result<Self, AnalysisError> {
        Self::collect_by_group(table, metal, confidence_level, |sample| sample.station_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SampleTable {
        let rows: [(&str, Category, Option<f64>); 7] = [
            ("RD009", Category::Incident, Some(0.30)),
            ("RD075", Category::Incident, Some(0.34)),
            ("RD074", Category::Incident, Some(0.29)),
            ("RD083", Category::Medium, Some(5.0)),
            ("RD039", Category::Medium, None),
            ("RD095", Category::Far, None),
            ("RD085", Category::Far, None),
        ];
        rows.into_iter()
            .map(|(station, category, value)| {
                let sample = Sample::new(station, category);
                match value {
                    Some(value) => sample.with_reading(Metal::ManganeseTotal, value),
                    None => sample,
                }
            })
            .collect()
    }

    #[test]
    fn test_groups_by_category() {
        let intervals =
            GroupedIntervals::by_category(&table(), Metal::ManganeseTotal, 0.95).unwrap();

        let incident = intervals.groups[&Category::Incident];
        assert_eq!(incident.n, 3);
        assert!(incident.lower_bound <= incident.mean && incident.mean <= incident.upper_bound);

        // single observation: warning, not an abort
        assert!(!intervals.groups.contains_key(&Category::Medium));
        assert_eq!(
            intervals.warnings,
            [GroupWarning {
                group: "Medium".to_owned(),
                error: StatsError::InsufficientSampleSize {
                    required: 2,
                    actual: 1
                },
            }]
        );

        // no readings: silently omitted
        assert!(!intervals.groups.contains_key(&Category::Far));
    }

    #[test]
    fn test_groups_by_station() {
        let table = SampleTable::new(vec![
            Sample::new("RD009", Category::Incident).with_reading(Metal::ArsenicTotal, 0.02),
            Sample::new("RD009", Category::Incident).with_reading(Metal::ArsenicTotal, 0.03),
            Sample::new("RD085", Category::Far).with_reading(Metal::ArsenicTotal, 0.004),
            Sample::new("RD085", Category::Far).with_reading(Metal::ArsenicTotal, 0.002),
        ]);
        let intervals = GroupedIntervals::by_station(&table, Metal::ArsenicTotal, 0.95).unwrap();
        assert_eq!(
            intervals.groups.keys().map(String::as_str).collect::<Vec<_>>(),
            ["RD009", "RD085"]
        );
        assert!((intervals.groups["RD009"].mean - 0.025).abs() < 1e-12);
        assert!(intervals.warnings.is_empty());
    }

    #[test]
    fn test_invalid_confidence_level() {
        assert!(matches!(
            GroupedIntervals::by_category(&table(), Metal::ManganeseTotal, 1.5),
            Err(AnalysisError::Statistics {
                source: StatsError::InvalidConfidenceLevel { .. },
                ..
            })
        ));
    }
}
