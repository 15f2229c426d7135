//! Compliance classification against reference limits

use serde::Serialize;

use crate::{
    limits::{MissingLimitError, ReferenceLimits},
    metal::Metal,
    sample::SampleTable,
};

/// Whether a reading exceeds its reference limit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Compliance {
    #[display("above")]
    Above,
    #[display("within")]
    Within,
}

impl Compliance {
    /// Column order of compliance contingency tables.
    pub const ALL: [Self; 2] = [Self::Above, Self::Within];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Above => 0,
            Self::Within => 1,
        }
    }
}

/// Labels `value` against `limit`. A value equal to the limit is compliant.
///
/// ```
/// # use metalwatch_analysis::classify::{classify, Compliance};
/// assert_eq!(classify(0.011, 0.01), Compliance::Above);
/// assert_eq!(classify(0.01, 0.01), Compliance::Within);
/// ```
#[must_use]
pub fn classify(value: f64, limit: f64) -> Compliance {
    if value > limit {
        Compliance::Above
    } else {
        Compliance::Within
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdClassifier<'a> {
    limits: &'a ReferenceLimits,
}

impl<'a> ThresholdClassifier<'a> {
    #[must_use]
    pub fn new(limits: &'a ReferenceLimits) -> Self {
        Self { limits }
    }

    /// The limit readings of `metal` are compared against.
    pub fn limit(&self, metal: Metal) -> Result<f64, MissingLimitError> {
        self.limits.limit(metal)
    }

    pub fn classify_reading(
        &self,
        metal: Metal,
        value: f64,
    ) -> Result<Compliance, MissingLimitError> {
        Ok(classify(value, self.limit(metal)?))
    }

    /// Per-sample labels for `metal`, in table order.
    ///
    /// Samples without a reading get `None`. The table itself is untouched.
    pub fn classify_table(
        &self,
        table: &SampleTable,
        metal: Metal,
    ) -> Result<Vec<Option<Compliance>>, MissingLimitError> {
        let limit = self.limit(metal)?;
        Ok(table
            .samples()
            .iter()
            .map(|sample| sample.reading(metal).map(|value| classify(value, limit)))
            .collect())
    }
}
