use metalwatch_stats::StatsError;
use serde::Serialize;

use crate::{category::UnknownCategoryError, limits::MissingLimitError, metal::Metal};

/// The sample table has no rows at all; the whole analysis is aborted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, Serialize)]
#[display("sample table has no rows")]
pub struct EmptyTableError;

/// A failure confined to one metal (and possibly one group of it).
#[derive(
    Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From, Serialize,
)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnalysisError {
    /// A statistic over all readings of a metal could not be computed.
    #[display("{metal}: {source}")]
    Statistics { metal: Metal, source: StatsError },
    /// A statistic over one group of readings could not be computed.
    #[display("{metal}, {group} sample: {source}")]
    Group {
        metal: Metal,
        group: String,
        source: StatsError,
    },
    #[from]
    #[display("{_0}")]
    MissingLimit(MissingLimitError),
    #[from]
    #[display("{_0}")]
    UnknownCategory(UnknownCategoryError),
    #[from]
    #[display("{_0}")]
    EmptyTable(EmptyTableError),
}

impl AnalysisError {
    /// The statistical precondition behind this error, if any.
    #[must_use]
    pub fn stats_error(&self) -> Option<&StatsError> {
        match self {
            Self::Statistics { source, .. } | Self::Group { source, .. } => Some(source),
            Self::MissingLimit(_) | Self::UnknownCategory(_) | Self::EmptyTable(_) => None,
        }
    }

    /// Whether the error means "no data" rather than a statistical failure.
    #[must_use]
    pub fn is_empty_group(&self) -> bool {
        matches!(self.stats_error(), Some(StatsError::Empty))
    }
}
