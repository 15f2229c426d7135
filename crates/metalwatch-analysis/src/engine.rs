//! Per-metal orchestration of the analyses
//!
//! For every metal the engine computes:
//!
//! - confidence intervals by category ([`GroupedIntervals::by_category`])
//! - the Incident vs. rest location test ([`compare_incident_vs_rest`])
//! - the category × compliance association ([`AssociationTester::test`])
//!
//! A failure in one metal's analysis is stored in that metal's report and
//! never aborts the others. Only an empty table is fatal.

use std::{collections::BTreeMap, thread};

use metalwatch_stats::confidence::DEFAULT_CONFIDENCE_LEVEL;
use serde::{Deserialize, Serialize};

use crate::{
    association::{AssociationResult, AssociationTester},
    category::Category,
    error::{AnalysisError, EmptyTableError},
    hypothesis::{LocationTestResult, compare_incident_vs_rest},
    interval::GroupedIntervals,
    limits::ReferenceLimits,
    metal::Metal,
    sample::SampleTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Confidence level of the group intervals.
    pub confidence_level: f64,
    /// Analyze metals on scoped worker threads.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetalReport {
    pub metal: Metal,
    /// Reference limit used for the association, if registered.
    pub limit: Option<f64>,
    pub intervals: Result<GroupedIntervals<Category>, AnalysisError>,
    pub location_test: Result<LocationTestResult, AnalysisError>,
    pub association: Result<AssociationResult<Category>, AnalysisError>,
}

impl MetalReport {
    /// Errors of this metal's analyses, in report order.
    pub fn errors(&self) -> impl Iterator<Item = &AnalysisError> {
        [
            self.intervals.as_ref().err(),
            self.location_test.as_ref().err(),
            self.association.as_ref().err(),
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub sample_count: usize,
    pub confidence_level: f64,
    pub metals: BTreeMap<Metal, MetalReport>,
}

#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    limits: ReferenceLimits,
    config: AnalysisConfig,
}

impl AnalysisEngine {
    #[must_use]
    pub fn new(limits: ReferenceLimits, config: AnalysisConfig) -> Self {
        Self { limits, config }
    }

    /// Analyzes every metal in [`Metal::ALL`].
    pub fn analyze(&self, table: &SampleTable) -> Result<AnalysisReport, EmptyTableError> {
        self.analyze_metals(table, &Metal::ALL)
    }

    /// Analyzes the given metals.
    pub fn analyze_metals(
        &self,
        table: &SampleTable,
        metals: &[Metal],
    ) -> Result<AnalysisReport, EmptyTableError> {
        if table.is_empty() {
            return Err(EmptyTableError);
        }
        log::info!("analyzing {} metals over {} samples", metals.len(), table.len());

        let reports = if self.config.parallel {
            let mut slots = vec![None; metals.len()];
            thread::scope(|s| {
                for (slot, &metal) in slots.iter_mut().zip(metals) {
                    s.spawn(move || *slot = Some(self.analyze_metal(table, metal)));
                }
            });
            slots.into_iter().flatten().collect::<Vec<_>>()
        } else {
            metals
                .iter()
                .map(|&metal| self.analyze_metal(table, metal))
                .collect()
        };

        let metals = reports
            .into_iter()
            .map(|report| (report.metal, report))
            .collect::<BTreeMap<_, _>>();
        let failures = metals.values().flat_map(MetalReport::errors).count();
        log::info!("analysis finished with {failures} failed components");

        Ok(AnalysisReport {
            sample_count: table.len(),
            confidence_level: self.config.confidence_level,
            metals,
        })
    }

    /// Analyzes a single metal.
    #[must_use]
    pub fn analyze_metal(&self, table: &SampleTable, metal: Metal) -> MetalReport {
        let intervals = GroupedIntervals::by_category(table, metal, self.config.confidence_level);
        let location_test = compare_incident_vs_rest(table, metal);
        let association = AssociationTester::new(&self.limits).test(table, metal);

        let report = MetalReport {
            metal,
            limit: self.limits.get(metal),
            intervals,
            location_test,
            association,
        };
        for err in report.errors() {
            log::warn!("{err}");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use metalwatch_stats::StatsError;
    use rand::SeedableRng;
    use rand_distr::{Distribution, LogNormal};
    use rand_pcg::Pcg64;

    use super::*;
    use crate::sample::Sample;

    const STATIONS: [(&str, Category, f64); 8] = [
        ("RD009", Category::Incident, 1.0),
        ("RD075", Category::Incident, 1.0),
        ("RD074", Category::Incident, 1.0),
        ("RD059", Category::Incident, 1.0),
        ("RD083", Category::Medium, 0.5),
        ("RD039", Category::Medium, 0.5),
        ("RD095", Category::Far, 0.2),
        ("RD085", Category::Far, 0.2),
    ];

    /// Arsenic and iron for every station, manganese only at incident stations.
    fn random_table(seed: u64) -> SampleTable {
        let mut rng = Pcg64::seed_from_u64(seed);
        let spread = LogNormal::new(0.0, 0.4).unwrap();
        let mut samples = vec![];
        for (station, category, scale) in STATIONS {
            for _ in 0..6 {
                let mut sample = Sample::new(station, category)
                    .with_reading(Metal::ArsenicTotal, 0.012 * scale * spread.sample(&mut rng))
                    .with_reading(Metal::IronDissolved, 0.4 * scale * spread.sample(&mut rng));
                if category == Category::Incident {
                    sample = sample
                        .with_reading(Metal::ManganeseTotal, 0.2 * spread.sample(&mut rng));
                }
                samples.push(sample);
            }
        }
        SampleTable::new(samples)
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let engine = AnalysisEngine::new(ReferenceLimits::default(), AnalysisConfig::default());
        assert_eq!(engine.analyze(&SampleTable::default()), Err(EmptyTableError));
    }

    #[test]
    fn test_reports_every_metal() {
        let engine = AnalysisEngine::new(ReferenceLimits::default(), AnalysisConfig::default());
        let report = engine.analyze(&random_table(1)).unwrap();
        assert_eq!(report.sample_count, 48);
        assert_eq!(report.metals.keys().copied().collect::<Vec<_>>(), Metal::ALL);

        let arsenic = &report.metals[&Metal::ArsenicTotal];
        assert_eq!(arsenic.intervals.as_ref().unwrap().groups.len(), 3);
        let location = arsenic.location_test.as_ref().unwrap();
        assert_eq!((location.n1, location.n2), (24, 24));
        assert!(location.significant);
        assert_eq!(arsenic.association.as_ref().unwrap().row_labels.len(), 3);
    }

    #[test]
    fn test_failing_metal_is_isolated() {
        let limits = ReferenceLimits::empty()
            .with_limit(Metal::ArsenicTotal, 0.01)
            .with_limit(Metal::ManganeseTotal, 0.1);
        let engine = AnalysisEngine::new(limits, AnalysisConfig::default());
        let report = engine.analyze(&random_table(2)).unwrap();

        // manganese has no readings outside the incident category
        let manganese = &report.metals[&Metal::ManganeseTotal];
        assert_eq!(
            manganese.location_test,
            Err(AnalysisError::Group {
                metal: Metal::ManganeseTotal,
                group: "medium+far".to_owned(),
                source: StatsError::Empty,
            })
        );
        assert!(matches!(
            manganese.association,
            Err(AnalysisError::Statistics {
                source: StatsError::DegenerateTable { .. },
                ..
            })
        ));
        assert_eq!(
            manganese.intervals.as_ref().unwrap().groups.keys().collect::<Vec<_>>(),
            [&Category::Incident]
        );

        // iron has no limit, but its intervals and location test still run
        let iron = &report.metals[&Metal::IronDissolved];
        assert_eq!(iron.limit, None);
        assert!(matches!(iron.association, Err(AnalysisError::MissingLimit(_))));
        assert!(iron.location_test.is_ok());

        let arsenic = &report.metals[&Metal::ArsenicTotal];
        assert_eq!(arsenic.errors().count(), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let table = random_table(3);
        let parallel = AnalysisEngine::new(ReferenceLimits::default(), AnalysisConfig::default());
        let sequential = AnalysisEngine::new(
            ReferenceLimits::default(),
            AnalysisConfig {
                parallel: false,
                ..AnalysisConfig::default()
            },
        );
        assert_eq!(
            parallel.analyze(&table).unwrap(),
            sequential.analyze(&table).unwrap()
        );
    }

    #[test]
    fn test_invalid_confidence_level_only_affects_intervals() {
        let engine = AnalysisEngine::new(
            ReferenceLimits::default(),
            AnalysisConfig {
                confidence_level: 0.0,
                parallel: false,
            },
        );
        let report = engine.analyze_metal(&random_table(4), Metal::ArsenicTotal);
        assert!(report.intervals.is_err());
        assert!(report.location_test.is_ok());
        assert!(report.association.is_ok());
    }
}
