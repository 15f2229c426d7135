//! Shapiro–Wilk test of normality
//!
//! Implements Royston's approximation of the W statistic and its p-value
//! (Applied Statistics algorithm AS R94), valid for `3 <= n <= 5000`.
//!
//! The coefficients `a` are derived from the expected normal order statistics
//! `m_i = Φ⁻¹((i - 3/8) / (n + 1/4))` with polynomial corrections for the two
//! outermost pairs. The p-value uses three regimes:
//!
//! - `n = 3`: exact distribution of W
//! - `4 <= n <= 11`: normalizing transform `-ln(γ - ln(1 - W))`
//! - `n >= 12`: log-normal approximation of `1 - W`

use std::f64::consts::PI;

use serde::Serialize;
use statrs::distribution::ContinuousCDF;

use crate::StatsError;

/// Minimum number of observations the test is defined for.
pub const MIN_NORMALITY_SAMPLE_SIZE: usize = 3;

const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_190, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.382_2, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.586_1, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.480_3, -0.082_676, 0.003_030_2];
const G: [f64; 2] = [-2.273, 0.459];

/// Result of a Shapiro–Wilk test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    /// Number of observations.
    pub n: usize,
    /// The W statistic, in `(0, 1]`.
    pub statistic: f64,
    /// Probability of a W at least this small under normality.
    pub p_value: f64,
}

impl ShapiroWilk {
    /// Tests whether `values` plausibly come from a normal distribution.
    ///
    /// # Errors
    ///
    /// * [`StatsError::InsufficientSampleSize`] - fewer than three values
    ///
    /// A sample whose values are all identical is reported as `W = 1`,
    /// `p = 1` with a warning.
    ///
    /// # Examples
    ///
    /// ```
    /// # use metalwatch_stats::normality::ShapiroWilk;
    /// let test = ShapiroWilk::test(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    /// assert!((test.statistic - 0.9868).abs() < 1e-3);
    /// assert!((test.p_value - 0.9672).abs() < 1e-3);
    /// ```
    pub fn test(values: &[f64]) -> Result<Self, StatsError> {
        let n = values.len();
        if n < MIN_NORMALITY_SAMPLE_SIZE {
            return Err(StatsError::InsufficientSampleSize {
                required: MIN_NORMALITY_SAMPLE_SIZE,
                actual: n,
            });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let range = sorted[n - 1] - sorted[0];
        if range <= f64::EPSILON * sorted[0].abs().max(sorted[n - 1].abs()) {
            log::warn!("all {n} values are identical ({}); W is taken as 1", sorted[0]);
            return Ok(Self {
                n,
                statistic: 1.0,
                p_value: 1.0,
            });
        }

        let coefficients = coefficients(n)?;
        let mean = crate::mean(&sorted);
        let numerator = coefficients
            .iter()
            .zip(&sorted)
            .map(|(a, x)| a * x)
            .sum::<f64>()
            .powi(2);
        let denominator = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        let statistic = (numerator / denominator).min(1.0);
        let p_value = p_value(n, statistic)?;

        Ok(Self {
            n,
            statistic,
            p_value,
        })
    }
}

/// Shapiro–Wilk coefficients `a_1..a_n` (antisymmetric around the middle).
#[expect(clippy::cast_precision_loss)]
fn coefficients(n: usize) -> Result<Vec<f64>, StatsError> {
    let mut a = vec![0.0; n];
    if n == 3 {
        a[0] = -0.5_f64.sqrt();
        a[2] = 0.5_f64.sqrt();
        return Ok(a);
    }

    let normal = crate::standard_normal()?;
    let m = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
        .collect::<Vec<_>>();
    let summ2 = m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let an = m[n - 1] / ssumm2 + poly(&C1, rsn);
    if n > 5 {
        let an1 = m[n - 2] / ssumm2 + poly(&C2, rsn);
        let phi = (summ2 - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * an.powi(2) - 2.0 * an1.powi(2));
        fill_inner(&mut a, &m, phi.sqrt(), 2);
        a[n - 2] = an1;
        a[1] = -an1;
    } else {
        let phi = (summ2 - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * an.powi(2));
        fill_inner(&mut a, &m, phi.sqrt(), 1);
    }
    a[n - 1] = an;
    a[0] = -an;
    Ok(a)
}

fn fill_inner(a: &mut [f64], m: &[f64], scale: f64, skip: usize) {
    let end = a.len() - skip;
    for (ai, mi) in a[skip..end].iter_mut().zip(&m[skip..end]) {
        *ai = mi / scale;
    }
}

#[expect(clippy::cast_precision_loss)]
fn p_value(n: usize, w: f64) -> Result<f64, StatsError> {
    if w >= 1.0 {
        return Ok(1.0);
    }
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75_f64.sqrt().asin());
        return Ok(p.clamp(0.0, 1.0));
    }

    let nf = n as f64;
    let y = (1.0 - w).ln();
    let z = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            // W is below the smallest value the transform supports.
            return Ok(0.0);
        }
        let transformed = -(gamma - y).ln();
        let m = poly(&C3, nf);
        let s = poly(&C4, nf).exp();
        (transformed - m) / s
    } else {
        let ln_n = nf.ln();
        let m = poly(&C5, ln_n);
        let s = poly(&C6, ln_n).exp();
        (y - m) / s
    };

    let normal = crate::standard_normal()?;
    Ok(normal.sf(z).clamp(0.0, 1.0))
}

/// Evaluates `c[0] + c[1] x + c[2] x² + ...`.
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_distr::{Distribution, LogNormal, Normal};
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn test_requires_three_observations() {
        assert_eq!(
            ShapiroWilk::test(&[1.0, 2.0]),
            Err(StatsError::InsufficientSampleSize {
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_constant_sample_counts_as_normal() {
        assert_eq!(
            ShapiroWilk::test(&[0.001, 0.001, 0.001, 0.001]),
            Ok(ShapiroWilk {
                n: 4,
                statistic: 1.0,
                p_value: 1.0
            })
        );
    }

    #[test]
    fn test_three_equally_spaced_values() {
        let test = ShapiroWilk::test(&[1.0, 2.0, 3.0]).unwrap();
        assert!((test.statistic - 1.0).abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_shifted_sample_has_same_statistic() {
        let a = ShapiroWilk::test(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let b = ShapiroWilk::test(&[10.0, 11.0, 12.0, 13.0, 14.0]).unwrap();
        assert!((a.statistic - b.statistic).abs() < 1e-12);
        assert!(b.p_value > 0.05);
    }

    #[test]
    fn test_outlier_rejects_normality() {
        let values = [1.0, 1.1, 0.9, 1.0, 1.05, 0.95, 1.0, 1.02, 0.98, 25.0];
        let test = ShapiroWilk::test(&values).unwrap();
        assert!(test.p_value < 0.05, "p = {}", test.p_value);
    }

    #[test]
    fn test_skewed_large_sample_rejects_normality() {
        let mut rng = Pcg64::seed_from_u64(7);
        let lognormal = LogNormal::new(0.0, 1.0).unwrap();
        let values = (0..200).map(|_| lognormal.sample(&mut rng)).collect::<Vec<_>>();
        let test = ShapiroWilk::test(&values).unwrap();
        assert!(test.p_value < 0.05, "p = {}", test.p_value);
    }

    #[test]
    fn test_statistic_and_p_value_ranges() {
        let mut rng = Pcg64::seed_from_u64(11);
        let normal = Normal::new(5.0, 2.0).unwrap();
        for n in 3..80 {
            let values = (0..n).map(|_| normal.sample(&mut rng)).collect::<Vec<_>>();
            let test = ShapiroWilk::test(&values).unwrap();
            assert!(test.statistic > 0.0 && test.statistic <= 1.0);
            assert!((0.0..=1.0).contains(&test.p_value));
        }
    }

    #[test]
    fn test_coefficients_are_antisymmetric_and_normalized() {
        for n in [4, 5, 6, 11, 12, 50] {
            let a = coefficients(n).unwrap();
            for i in 0..n {
                assert!((a[i] + a[n - 1 - i]).abs() < 1e-9, "n = {n}");
            }
            let norm = a.iter().map(|v| v * v).sum::<f64>();
            assert!((norm - 1.0).abs() < 1e-6, "n = {n}, norm = {norm}");
        }
    }
}
