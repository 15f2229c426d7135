//! Two-sample tests for a difference in central tendency
//!
//! - [`WelchTTest`]: parametric, does not assume equal variances
//! - [`MannWhitneyU`]: rank-based, two-sided
//!
//! Both tests are two-sided and take the samples as plain slices with missing
//! values already removed.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::StatsError;

/// Largest size of the smaller sample for which the exact Mann–Whitney
/// distribution is used.
pub const MANN_WHITNEY_EXACT_MAX_SIZE: usize = 8;

/// Result of Welch's unequal-variance two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WelchTTest {
    /// The t statistic, positive when the first sample has the larger mean.
    pub statistic: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub degrees_of_freedom: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    pub n1: usize,
    pub n2: usize,
}

impl WelchTTest {
    /// Runs the test on two independent samples.
    ///
    /// # Errors
    ///
    /// * [`StatsError::InsufficientSampleSize`] - either sample has fewer than two values
    /// * [`StatsError::DegenerateSample`] - both samples have zero variance
    ///
    /// # Examples
    ///
    /// ```
    /// # use metalwatch_stats::location::WelchTTest;
    /// let a = [1.0, 2.0, 3.0, 4.0, 5.0];
    /// let b = [10.0, 11.0, 12.0, 13.0, 14.0];
    /// let test = WelchTTest::test(&a, &b).unwrap();
    /// assert!((test.statistic + 9.0).abs() < 1e-12);
    /// assert!((test.degrees_of_freedom - 8.0).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn test(first: &[f64], second: &[f64]) -> Result<Self, StatsError> {
        for sample in [first, second] {
            if sample.len() < 2 {
                return Err(StatsError::InsufficientSampleSize {
                    required: 2,
                    actual: sample.len(),
                });
            }
        }

        let (n1, n2) = (first.len(), second.len());
        let (mean1, mean2) = (crate::mean(first), crate::mean(second));
        let se1 = crate::sample_variance(first, mean1) / n1 as f64;
        let se2 = crate::sample_variance(second, mean2) / n2 as f64;
        let se_sum = se1 + se2;
        if se_sum <= 0.0 {
            return Err(StatsError::DegenerateSample {
                reason: "both samples have zero variance",
            });
        }

        let statistic = (mean1 - mean2) / se_sum.sqrt();
        let degrees_of_freedom =
            se_sum.powi(2) / (se1.powi(2) / (n1 - 1) as f64 + se2.powi(2) / (n2 - 1) as f64);
        let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom)
            .map_err(|_| StatsError::InvalidDistribution { name: "Student-t" })?;
        let p_value = (2.0 * dist.sf(statistic.abs())).min(1.0);

        Ok(Self {
            statistic,
            degrees_of_freedom,
            p_value,
            n1,
            n2,
        })
    }
}

/// How a Mann–Whitney p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PValueMethod {
    /// Permutation distribution of U (small samples without ties).
    Exact,
    /// Normal approximation with tie and continuity correction.
    Asymptotic,
}

/// Result of the two-sided Mann–Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MannWhitneyU {
    /// U statistic of the first sample.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    pub method: PValueMethod,
    pub n1: usize,
    pub n2: usize,
}

impl MannWhitneyU {
    /// Runs the test on two independent samples.
    ///
    /// # Errors
    ///
    /// * [`StatsError::Empty`] - either sample is empty
    /// * [`StatsError::DegenerateSample`] - every value in both samples is identical
    ///
    /// # Examples
    ///
    /// ```
    /// # use metalwatch_stats::location::{MannWhitneyU, PValueMethod};
    /// let test = MannWhitneyU::test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
    /// assert_eq!(test.statistic, 0.0);
    /// assert_eq!(test.method, PValueMethod::Exact);
    /// assert!((test.p_value - 0.1).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn test(first: &[f64], second: &[f64]) -> Result<Self, StatsError> {
        if first.is_empty() || second.is_empty() {
            return Err(StatsError::Empty);
        }

        let (n1, n2) = (first.len(), second.len());
        let combined = first.iter().chain(second).copied().collect::<Vec<_>>();
        let (ranks, tie_sizes) = midranks(&combined);

        let rank_sum = ranks[..n1].iter().sum::<f64>();
        let statistic = rank_sum - (n1 * (n1 + 1)) as f64 / 2.0;
        let product = (n1 * n2) as f64;
        let u_max = statistic.max(product - statistic);

        let has_ties = tie_sizes.iter().any(|&t| t > 1);
        let exact = if !has_ties && n1.min(n2) <= MANN_WHITNEY_EXACT_MAX_SIZE {
            exact_p_value(n1.min(n2), n1.max(n2), u_max)
        } else {
            None
        };
        let (p_value, method) = match exact {
            Some(p_value) => (p_value, PValueMethod::Exact),
            None => {
                let n = (n1 + n2) as f64;
                let tie_term = tie_sizes
                    .iter()
                    .map(|&t| {
                        let t = t as f64;
                        t * t * t - t
                    })
                    .sum::<f64>();
                let variance = product / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
                if variance <= 0.0 {
                    return Err(StatsError::DegenerateSample {
                        reason: "all values are identical",
                    });
                }
                let z = (u_max - product / 2.0 - 0.5) / variance.sqrt();
                let normal = crate::standard_normal()?;
                ((2.0 * normal.sf(z)).clamp(0.0, 1.0), PValueMethod::Asymptotic)
            }
        };

        Ok(Self {
            statistic,
            p_value,
            method,
            n1,
            n2,
        })
    }
}

/// Midranks (1-based, averaged over ties) and the size of every tie group.
#[expect(clippy::cast_precision_loss)]
fn midranks(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut tie_sizes = vec![];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        tie_sizes.push(end - start);
        start = end;
    }
    (ranks, tie_sizes)
}

/// `2 * P(U >= u_max)` under the null permutation distribution of U.
///
/// The distribution is symmetric in the two sizes; pass the smaller one as
/// `n_small`. `None` when the arrangement counts overflow.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
fn exact_p_value(n_small: usize, n_large: usize, u_max: f64) -> Option<f64> {
    let Some(frequencies) = u_frequencies(n_small, n_large) else {
        log::debug!("exact U distribution overflows for sizes {n_small} and {n_large}");
        return None;
    };
    let total = frequencies.iter().sum::<i128>() as f64;
    let threshold = u_max.round() as usize;
    let upper_tail = frequencies.iter().skip(threshold).sum::<i128>() as f64;
    Some((2.0 * upper_tail / total).min(1.0))
}

/// Number of arrangements yielding each U in `0..=n1*n2`.
///
/// These are the coefficients of the Gaussian binomial `[n1 + n2, n1]_q`,
/// built as `prod_{i=1..n1} (1 - q^(n2+i)) / (1 - q^i)`.
fn u_frequencies(n1: usize, n2: usize) -> Option<Vec<i128>> {
    let max_u = n1 * n2;
    let mut coefficients = vec![0_i128; max_u + n1 + n2 + 1];
    coefficients[0] = 1;
    for i in 1..=n1 {
        let shift = n2 + i;
        for k in (shift..coefficients.len()).rev() {
            coefficients[k] = coefficients[k].checked_sub(coefficients[k - shift])?;
        }
        for k in i..coefficients.len() {
            coefficients[k] = coefficients[k].checked_add(coefficients[k - i])?;
        }
    }
    coefficients.truncate(max_u + 1);
    Some(coefficients)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_welch_known_values() {
        let test =
            WelchTTest::test(&[1.0, 2.0, 3.0, 4.0, 5.0], &[10.0, 11.0, 12.0, 13.0, 14.0]).unwrap();
        assert!((test.statistic + 9.0).abs() < 1e-12);
        assert!((test.degrees_of_freedom - 8.0).abs() < 1e-12);
        assert!(test.p_value > 1e-5 && test.p_value < 1e-4, "p = {}", test.p_value);
        assert_eq!((test.n1, test.n2), (5, 5));
    }

    #[test]
    fn test_welch_is_antisymmetric() {
        let a = [0.011, 0.014, 0.009, 0.020, 0.017];
        let b = [0.004, 0.006, 0.005, 0.007];
        let ab = WelchTTest::test(&a, &b).unwrap();
        let ba = WelchTTest::test(&b, &a).unwrap();
        assert!((ab.statistic + ba.statistic).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_welch_unequal_variances() {
        let a = [20.0, 22.0, 19.0, 20.0, 21.0];
        let b = [10.0, 30.0, 5.0, 40.0, 15.0, 25.0];
        let test = WelchTTest::test(&a, &b).unwrap();
        // Welch df lies between min(n1, n2) - 1 and n1 + n2 - 2.
        assert!(test.degrees_of_freedom > 4.0 && test.degrees_of_freedom < 9.0);
        assert!(test.p_value > 0.05);
    }

    #[test]
    fn test_welch_preconditions() {
        assert_eq!(
            WelchTTest::test(&[1.0], &[1.0, 2.0]),
            Err(StatsError::InsufficientSampleSize {
                required: 2,
                actual: 1
            })
        );
        assert!(matches!(
            WelchTTest::test(&[1.0, 1.0], &[2.0, 2.0]),
            Err(StatsError::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_welch_one_constant_sample() {
        let test = WelchTTest::test(&[0.021, 0.025, 0.019, 0.023, 0.030], &[0.001; 4]).unwrap();
        // all variance comes from the first sample
        assert!((test.degrees_of_freedom - 4.0).abs() < 1e-9);
        assert!(test.statistic > 0.0);
        assert!(test.p_value < 0.001);
    }

    #[test]
    fn test_mann_whitney_exact_small_samples() {
        let test = MannWhitneyU::test(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(test.statistic, 0.0);
        assert_eq!(test.method, PValueMethod::Exact);
        assert!((test.p_value - 0.1).abs() < 1e-12);

        let test = MannWhitneyU::test(&[1.0, 2.0, 3.0, 4.0, 5.0], &[10.0, 11.0, 12.0, 13.0, 14.0])
            .unwrap();
        // 2 / C(10, 5)
        assert!((test.p_value - 2.0 / 252.0).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_exact_with_one_small_sample() {
        let small = [0.5, 0.9, 1.7, 40.0];
        let large = [
            0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09, 2.0, 3.0, 4.0,
        ];
        let test = MannWhitneyU::test(&small, &large).unwrap();
        assert_eq!(test.statistic, 39.0);
        assert_eq!(test.method, PValueMethod::Exact);
        // 2 * 71 / C(16, 4)
        assert!((test.p_value - 142.0 / 1820.0).abs() < 1e-12);

        let swapped = MannWhitneyU::test(&large, &small).unwrap();
        assert_eq!(swapped.statistic, 9.0);
        assert_eq!(swapped.method, PValueMethod::Exact);
        assert!((swapped.p_value - test.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_swapped_samples() {
        let a = [0.3, 0.7, 0.2, 0.9];
        let b = [0.5, 1.1, 1.4, 0.8, 1.2];
        let ab = MannWhitneyU::test(&a, &b).unwrap();
        let ba = MannWhitneyU::test(&b, &a).unwrap();
        assert!((ab.statistic + ba.statistic - 20.0).abs() < 1e-12);
        assert!((ab.p_value - ba.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_ties_use_normal_approximation() {
        let test = MannWhitneyU::test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(test.method, PValueMethod::Asymptotic);
        assert!((test.statistic - 4.5).abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mann_whitney_large_samples_use_normal_approximation() {
        let mut rng = Pcg64::seed_from_u64(3);
        let low = Normal::new(0.0, 1.0).unwrap();
        let high = Normal::new(2.0, 1.0).unwrap();
        let a = (0..30).map(|_| low.sample(&mut rng)).collect::<Vec<_>>();
        let b = (0..30).map(|_| high.sample(&mut rng)).collect::<Vec<_>>();
        let test = MannWhitneyU::test(&a, &b).unwrap();
        assert_eq!(test.method, PValueMethod::Asymptotic);
        assert!(test.p_value < 0.001, "p = {}", test.p_value);
    }

    #[test]
    fn test_mann_whitney_preconditions() {
        assert_eq!(MannWhitneyU::test(&[], &[1.0]), Err(StatsError::Empty));
        assert!(matches!(
            MannWhitneyU::test(&[2.0; 10], &[2.0; 10]),
            Err(StatsError::DegenerateSample { .. })
        ));
    }

    #[test]
    fn test_u_frequencies_sum_to_binomial() {
        assert_eq!(u_frequencies(3, 3), Some(vec![1, 1, 2, 3, 3, 3, 3, 2, 1, 1]));
        assert_eq!(u_frequencies(8, 8).unwrap().iter().sum::<i128>(), 12_870);
        assert_eq!(u_frequencies(1, 4), Some(vec![1; 5]));
        // C(1008, 8) does not fit in 64 bits
        assert_eq!(
            u_frequencies(8, 1000).unwrap().iter().sum::<i128>(),
            25_708_099_169_553_626_826
        );
    }

    #[test]
    fn test_midranks_average_ties() {
        let (ranks, ties) = midranks(&[3.0, 1.0, 3.0, 2.0]);
        assert_eq!(ranks, vec![3.5, 1.0, 3.5, 2.0]);
        assert_eq!(ties, vec![1, 1, 2]);
    }
}
