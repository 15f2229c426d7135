//! The fixed universe of tracked metals

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A tracked metal concentration.
///
/// Serialized by its kebab-case id (`arsenic-total`, ...), displayed by its
/// human-readable name.
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
pub enum Metal {
    #[display("Arsenic-Total")]
    ArsenicTotal,
    #[display("Iron-Dissolved")]
    IronDissolved,
    #[display("Manganese-Total")]
    ManganeseTotal,
}

impl Metal {
    pub const ALL: [Self; 3] = [Self::ArsenicTotal, Self::IronDissolved, Self::ManganeseTotal];

    /// Stable identifier, as used in JSON and on the command line.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::ArsenicTotal => "arsenic-total",
            Self::IronDissolved => "iron-dissolved",
            Self::ManganeseTotal => "manganese-total",
        }
    }

    /// Recognizes a dataset column name, in English or Portuguese.
    ///
    /// Returns `None` for columns that are not metal readings.
    #[must_use]
    pub fn from_column(name: &str) -> Option<Self> {
        match crate::normalize_name(name).as_str() {
            "arsenic total" | "arsênio total" | "arsenio total" => Some(Self::ArsenicTotal),
            "iron dissolved" | "dissolved iron" | "ferro dissolvido" => Some(Self::IronDissolved),
            "manganese total" | "manganês total" | "manganes total" => Some(Self::ManganeseTotal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, Serialize)]
#[display("unknown metal '{name}' (expected one of arsenic-total, iron-dissolved, manganese-total)")]
pub struct UnknownMetalError {
    pub name: String,
}

impl FromStr for Metal {
    type Err = UnknownMetalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_column(s).ok_or_else(|| UnknownMetalError {
            name: s.to_owned(),
        })
    }
}
