//! Reference-limit catalog
//!
//! Legal or advisory concentration ceilings per metal, in mg/L. The catalog
//! is configuration: it is built once and handed to the engine. Units must
//! match the dataset; this is not checked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metal::Metal;

/// A single concentration ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLimit {
    pub value: f64,
    /// Where the limit comes from (regulation, guideline).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLimits {
    pub limits: BTreeMap<Metal, ReferenceLimit>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, Serialize)]
#[display("no reference limit registered for {metal}")]
pub struct MissingLimitError {
    pub metal: Metal,
}

impl Default for ReferenceLimits {
    /// CONAMA 357/2005 for arsenic, WHO guidelines for iron and manganese.
    fn default() -> Self {
        Self::empty()
            .with_sourced_limit(Metal::ArsenicTotal, 0.01, "CONAMA 357/2005")
            .with_sourced_limit(Metal::IronDissolved, 0.3, "WHO (aesthetic)")
            .with_sourced_limit(Metal::ManganeseTotal, 0.1, "WHO")
    }
}

impl ReferenceLimits {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            limits: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_limit(mut self, metal: Metal, value: f64) -> Self {
        self.limits.insert(
            metal,
            ReferenceLimit {
                value,
                source: None,
            },
        );
        self
    }

    #[must_use]
    pub fn with_sourced_limit(mut self, metal: Metal, value: f64, source: &str) -> Self {
        self.limits.insert(
            metal,
            ReferenceLimit {
                value,
                source: Some(source.to_owned()),
            },
        );
        self
    }

    #[must_use]
    pub fn get(&self, metal: Metal) -> Option<f64> {
        self.limits.get(&metal).map(|limit| limit.value)
    }

    pub fn limit(&self, metal: Metal) -> Result<f64, MissingLimitError> {
        self.get(metal).ok_or(MissingLimitError { metal })
    }
}
