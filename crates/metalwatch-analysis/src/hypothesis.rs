//! Normality-gated two-sample location testing
//!
//! Decides whether two independent samples differ in central tendency. The
//! test is chosen from the data, not by the caller:
//!
//! 1. each sample needs at least three observations
//! 2. each sample is checked with the Shapiro–Wilk test
//! 3. both normality p-values above [`SIGNIFICANCE_LEVEL`]: Welch's t-test;
//!    otherwise: the two-sided Mann–Whitney U test
//! 4. the difference is significant when `p < SIGNIFICANCE_LEVEL`

use metalwatch_stats::{
    StatsError,
    location::{MannWhitneyU, PValueMethod, WelchTTest},
    normality::{MIN_NORMALITY_SAMPLE_SIZE, ShapiroWilk},
};
use serde::Serialize;

use crate::{
    SIGNIFICANCE_LEVEL, category::Category, error::AnalysisError, metal::Metal,
    sample::SampleTable,
};

/// The location test that produced a p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum TestMethod {
    #[serde(rename = "welch-t")]
    #[display("welch-t")]
    WelchT,
    #[serde(rename = "mann-whitney")]
    #[display("mann-whitney")]
    MannWhitney,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum SampleSide {
    #[display("first")]
    First,
    #[display("second")]
    Second,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TwoSampleError {
    /// One of the samples cannot enter the procedure.
    #[display("{side} sample: {source}")]
    Sample { side: SampleSide, source: StatsError },
    /// The selected test itself failed.
    #[display("{method}: {source}")]
    Test {
        method: TestMethod,
        source: StatsError,
    },
}

/// Outcome of the two-sample procedure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationTestResult {
    pub method: TestMethod,
    pub statistic: f64,
    pub p_value: f64,
    /// Shapiro–Wilk p-values of the first and second sample.
    pub normality_p_values: [f64; 2],
    pub significant: bool,
    /// Welch–Satterthwaite degrees of freedom (Welch's t-test only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degrees_of_freedom: Option<f64>,
    /// How the Mann–Whitney p-value was obtained (Mann–Whitney only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value_method: Option<PValueMethod>,
    pub n1: usize,
    pub n2: usize,
}

/// Runs the normality-gated comparison of `first` and `second`.
///
/// Missing values must already be removed.
///
/// # Examples
///
/// ```
/// # use metalwatch_analysis::hypothesis::{compare_samples, TestMethod};
/// let a = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = [10.0, 11.0, 12.0, 13.0, 14.0];
/// let result = compare_samples(&a, &b).unwrap();
/// assert_eq!(result.method, TestMethod::WelchT);
/// assert!(result.significant);
/// ```
pub fn compare_samples(
    first: &[f64],
    second: &[f64],
) -> Result<LocationTestResult, TwoSampleError> {
    let normality_first = normality_p_value(first, SampleSide::First)?;
    let normality_second = normality_p_value(second, SampleSide::Second)?;
    let normality_p_values = [normality_first, normality_second];
    let both_normal = normality_p_values.iter().all(|&p| p > SIGNIFICANCE_LEVEL);

    let (n1, n2) = (first.len(), second.len());
    let result = if both_normal {
        log::debug!("normality p-values {normality_p_values:?}: using Welch's t-test");
        let test = WelchTTest::test(first, second).map_err(|source| TwoSampleError::Test {
            method: TestMethod::WelchT,
            source,
        })?;
        LocationTestResult {
            method: TestMethod::WelchT,
            statistic: test.statistic,
            p_value: test.p_value,
            normality_p_values,
            significant: test.p_value < SIGNIFICANCE_LEVEL,
            degrees_of_freedom: Some(test.degrees_of_freedom),
            p_value_method: None,
            n1,
            n2,
        }
    } else {
        log::debug!("normality p-values {normality_p_values:?}: using Mann-Whitney U");
        let test = MannWhitneyU::test(first, second).map_err(|source| TwoSampleError::Test {
            method: TestMethod::MannWhitney,
            source,
        })?;
        LocationTestResult {
            method: TestMethod::MannWhitney,
            statistic: test.statistic,
            p_value: test.p_value,
            normality_p_values,
            significant: test.p_value < SIGNIFICANCE_LEVEL,
            degrees_of_freedom: None,
            p_value_method: Some(test.method),
            n1,
            n2,
        }
    };
    Ok(result)
}

fn normality_p_value(values: &[f64], side: SampleSide) -> Result<f64, TwoSampleError> {
    let source = match values.len() {
        0 => StatsError::Empty,
        n if n < MIN_NORMALITY_SAMPLE_SIZE => StatsError::InsufficientSampleSize {
            required: MIN_NORMALITY_SAMPLE_SIZE,
            actual: n,
        },
        _ => {
            return ShapiroWilk::test(values)
                .map(|test| test.p_value)
                .map_err(|source| TwoSampleError::Sample { side, source });
        }
    };
    Err(TwoSampleError::Sample { side, source })
}

/// Label of the incident side in [`compare_incident_vs_rest`] errors.
pub const INCIDENT_GROUP: &str = "incident";
/// Label of the non-incident side in [`compare_incident_vs_rest`] errors.
pub const REST_GROUP: &str = "medium+far";

/// Compares Incident readings of `metal` against Medium and Far readings combined.
pub fn compare_incident_vs_rest(
    table: &SampleTable,
    metal: Metal,
) -> Result<LocationTestResult, AnalysisError> {
    let incident = table.values_where(metal, |sample| sample.category == Category::Incident);
    let rest = table.values_where(metal, |sample| sample.category != Category::Incident);
    compare_samples(&incident, &rest).map_err(|err| match err {
        TwoSampleError::Sample { side, source } => AnalysisError::Group {
            metal,
            group: match side {
                SampleSide::First => INCIDENT_GROUP,
                SampleSide::Second => REST_GROUP,
            }
            .to_owned(),
            source,
        },
        TwoSampleError::Test { source, .. } => AnalysisError::Statistics { metal, source },
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_distr::{Distribution, LogNormal, Normal};
    use rand_pcg::Pcg64;

    use super::*;
    use crate::sample::Sample;

    #[test]
    fn test_non_overlapping_normal_samples_use_welch() {
        let result =
            compare_samples(&[1.0, 2.0, 3.0, 4.0, 5.0], &[10.0, 11.0, 12.0, 13.0, 14.0]).unwrap();
        assert_eq!(result.method, TestMethod::WelchT);
        assert!(result.normality_p_values.iter().all(|&p| p > 0.05));
        assert!((result.statistic + 9.0).abs() < 1e-12);
        assert_eq!(result.degrees_of_freedom.map(f64::round), Some(8.0));
        assert!(result.p_value < 0.001);
        assert!(result.significant);
    }

    #[test]
    fn test_constant_sample_counts_as_normal() {
        // every reading of the second group sits at the detection floor
        let result = compare_samples(&[0.021, 0.025, 0.019, 0.023, 0.030], &[0.001; 4]).unwrap();
        assert_eq!(result.normality_p_values[1], 1.0);
        assert_eq!(result.method, TestMethod::WelchT);
        assert_eq!(result.degrees_of_freedom.map(f64::round), Some(4.0));
        assert!(result.significant);
    }

    #[test]
    fn test_two_constant_samples_fail_the_test() {
        assert!(matches!(
            compare_samples(&[0.5; 3], &[0.25; 5]),
            Err(TwoSampleError::Test {
                method: TestMethod::WelchT,
                source: StatsError::DegenerateSample { .. }
            })
        ));
    }

    #[test]
    fn test_non_normal_sample_routes_to_mann_whitney() {
        let mut rng = Pcg64::seed_from_u64(5);
        let skewed = LogNormal::new(-3.0, 1.5).unwrap();
        let a = (0..40).map(|_| skewed.sample(&mut rng)).collect::<Vec<_>>();
        let b = (0..40).map(|_| skewed.sample(&mut rng) * 0.2).collect::<Vec<_>>();
        let result = compare_samples(&a, &b).unwrap();
        assert!(result.normality_p_values.iter().any(|&p| p <= 0.05));
        assert_eq!(result.method, TestMethod::MannWhitney);
        assert!(result.p_value_method.is_some());
        assert_eq!(result.degrees_of_freedom, None);
    }

    #[test]
    fn test_method_is_consistent_with_normality() {
        let mut rng = Pcg64::seed_from_u64(17);
        let normal = Normal::new(0.3, 0.05).unwrap();
        let skewed = LogNormal::new(-1.0, 1.0).unwrap();
        for round in 0..40 {
            let a = (0..12).map(|_| normal.sample(&mut rng)).collect::<Vec<_>>();
            let b = (0..15)
                .map(|_| {
                    if round % 2 == 0 {
                        normal.sample(&mut rng)
                    } else {
                        skewed.sample(&mut rng)
                    }
                })
                .collect::<Vec<_>>();
            let result = compare_samples(&a, &b).unwrap();
            let both_normal = result.normality_p_values.iter().all(|&p| p > 0.05);
            let expected = if both_normal {
                TestMethod::WelchT
            } else {
                TestMethod::MannWhitney
            };
            assert_eq!(result.method, expected);
            assert_eq!(result.significant, result.p_value < 0.05);
        }
    }

    #[test]
    fn test_requires_three_observations_per_sample() {
        assert_eq!(
            compare_samples(&[1.0, 2.0, 3.0], &[4.0, 5.0]),
            Err(TwoSampleError::Sample {
                side: SampleSide::Second,
                source: StatsError::InsufficientSampleSize {
                    required: 3,
                    actual: 2
                }
            })
        );
        assert_eq!(
            compare_samples(&[], &[4.0, 5.0, 6.0]),
            Err(TwoSampleError::Sample {
                side: SampleSide::First,
                source: StatsError::Empty
            })
        );
    }

    #[test]
    fn test_incident_vs_rest_reports_short_side() {
        let table = SampleTable::new(vec![
            Sample::new("RD009", Category::Incident).with_reading(Metal::IronDissolved, 1.2),
            Sample::new("RD083", Category::Medium).with_reading(Metal::IronDissolved, 0.4),
            Sample::new("RD039", Category::Medium).with_reading(Metal::IronDissolved, 0.5),
            Sample::new("RD095", Category::Far).with_reading(Metal::IronDissolved, 0.1),
        ]);
        assert_eq!(
            compare_incident_vs_rest(&table, Metal::IronDissolved),
            Err(AnalysisError::Group {
                metal: Metal::IronDissolved,
                group: INCIDENT_GROUP.to_owned(),
                source: StatsError::InsufficientSampleSize {
                    required: 3,
                    actual: 1
                },
            })
        );
    }

    #[test]
    fn test_incident_vs_rest_pools_medium_and_far() {
        let rows = [
            (Category::Incident, 0.021),
            (Category::Incident, 0.025),
            (Category::Incident, 0.019),
            (Category::Incident, 0.023),
            (Category::Medium, 0.009),
            (Category::Medium, 0.012),
            (Category::Far, 0.004),
            (Category::Far, 0.006),
        ];
        let table = rows
            .into_iter()
            .map(|(category, value)| {
                Sample::new("RD000", category).with_reading(Metal::ArsenicTotal, value)
            })
            .collect::<SampleTable>();
        let result = compare_incident_vs_rest(&table, Metal::ArsenicTotal).unwrap();
        assert_eq!((result.n1, result.n2), (4, 4));
        assert!(result.statistic > 0.0);
    }
}
