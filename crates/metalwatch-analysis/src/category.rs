//! Exposure categories of monitoring stations

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How directly a station is exposed to the contamination source.
///
/// This is a closed enumeration: any other label is a data-quality error.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Directly affected.
    Incident,
    /// Moderately affected.
    Medium,
    /// Unaffected (control).
    Far,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Incident, Self::Medium, Self::Far];
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, Serialize)]
#[display("unknown category label '{label}' (expected incident, medium or far)")]
pub struct UnknownCategoryError {
    pub label: String,
}

impl FromStr for Category {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::normalize_name(s).as_str() {
            "incident" | "incidente" | "incidentes" => Ok(Self::Incident),
            "medium" | "medio" | "médio" | "medios" | "médios" => Ok(Self::Medium),
            "far" | "longe" | "longes" => Ok(Self::Far),
            _ => Err(UnknownCategoryError {
                label: s.to_owned(),
            }),
        }
    }
}
