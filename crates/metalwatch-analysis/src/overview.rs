//! Dataset overview: counts, missing readings and per-metal distributions

use std::collections::BTreeMap;

use metalwatch_stats::distribution::DistributionSummary;
use serde::Serialize;

use crate::{category::Category, metal::Metal, sample::SampleTable};

/// Default number of histogram bins per metal.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Number of Incident records at one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationFrequency {
    pub station_id: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetOverview {
    pub total_records: usize,
    /// Records per category; categories without records are absent.
    pub records_per_category: BTreeMap<Category, usize>,
    pub missing_readings: BTreeMap<Metal, usize>,
    /// `None` for a metal without any reading.
    pub distributions: BTreeMap<Metal, Option<DistributionSummary>>,
    /// Sorted by count descending, then station id.
    pub incident_frequency: Vec<StationFrequency>,
}

impl DatasetOverview {
    #[must_use]
    pub fn from_table(table: &SampleTable, hist_num_bins: usize) -> Self {
        let mut records_per_category = BTreeMap::new();
        let mut incident_counts = BTreeMap::<&str, usize>::new();
        for sample in table.samples() {
            *records_per_category.entry(sample.category).or_default() += 1;
            if sample.category == Category::Incident {
                *incident_counts.entry(sample.station_id.as_str()).or_default() += 1;
            }
        }

        let mut missing_readings = BTreeMap::new();
        let mut distributions = BTreeMap::new();
        for metal in Metal::ALL {
            let values = table.values(metal);
            missing_readings.insert(metal, table.len() - values.len());
            distributions.insert(
                metal,
                DistributionSummary::with_default_points(values, hist_num_bins),
            );
        }

        let mut incident_frequency = incident_counts
            .into_iter()
            .map(|(station_id, count)| StationFrequency {
                station_id: station_id.to_owned(),
                count,
            })
            .collect::<Vec<_>>();
        incident_frequency.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.station_id.cmp(&b.station_id))
        });

        Self {
            total_records: table.len(),
            records_per_category,
            missing_readings,
            distributions,
            incident_frequency,
        }
    }
}
