//! Statistical inference over water-sample metal concentrations
//!
//! This crate turns a [`sample::SampleTable`] of station measurements into
//! interval estimates, hypothesis tests and compliance associations. It does
//! no I/O: tables are built by the caller and every result is a plain,
//! serializable value.
//!
//! # Overview
//!
//! - **Data model** ([`metal::Metal`], [`category::Category`], [`sample::SampleTable`]):
//!   the fixed metal universe, the closed exposure-category enumeration and the
//!   immutable sample table
//! - **Group statistics** ([`interval::GroupedIntervals`]): Student-t confidence
//!   intervals per category, per station or per any custom key
//! - **Threshold classification** ([`classify::ThresholdClassifier`]): readings
//!   labelled `above` / `within` a [`limits::ReferenceLimits`] catalog entry
//! - **Location testing** ([`hypothesis::compare_samples`]): Shapiro–Wilk gated
//!   choice between Welch's t-test and the Mann–Whitney U test
//! - **Association testing** ([`association::AssociationTester`]): category ×
//!   compliance contingency table with a chi-square independence test
//! - **Orchestration** ([`engine::AnalysisEngine`]): all of the above per metal,
//!   isolating failures to the metal they occur in
//! - **Dataset overview** ([`overview::DatasetOverview`]): counts, missing
//!   readings, distributions and incident frequency per station
//!
//! # Examples
//!
//! ```
//! use metalwatch_analysis::{
//!     category::Category,
//!     engine::{AnalysisConfig, AnalysisEngine},
//!     limits::ReferenceLimits,
//!     metal::Metal,
//!     sample::{Sample, SampleTable},
//! };
//!
//! let readings = [
//!     ("RD009", Category::Incident, 0.021),
//!     ("RD075", Category::Incident, 0.018),
//!     ("RD083", Category::Medium, 0.009),
//!     ("RD039", Category::Medium, 0.011),
//!     ("RD095", Category::Far, 0.004),
//!     ("RD085", Category::Far, 0.003),
//! ];
//! let table = readings
//!     .into_iter()
//!     .map(|(station, category, value)| {
//!         Sample::new(station, category).with_reading(Metal::ArsenicTotal, value)
//!     })
//!     .collect::<SampleTable>();
//!
//! let engine = AnalysisEngine::new(ReferenceLimits::default(), AnalysisConfig::default());
//! let report = engine.analyze(&table).unwrap();
//! let arsenic = &report.metals[&Metal::ArsenicTotal];
//! let intervals = arsenic.intervals.as_ref().unwrap();
//! assert_eq!(intervals.groups.len(), 3);
//! assert_eq!(arsenic.limit, Some(0.01));
//! ```

pub mod association;
pub mod category;
pub mod classify;
pub mod engine;
pub mod error;
pub mod hypothesis;
pub mod interval;
pub mod limits;
pub mod metal;
pub mod overview;
pub mod sample;

/// Significance threshold for every hypothesis test in this crate.
///
/// Fixed by regulatory convention; not configurable.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Normalizes a column name or label for matching.
///
/// Trims, lowercases, turns `_` and `-` into spaces and collapses runs of
/// whitespace.
///
/// ```
/// assert_eq!(metalwatch_analysis::normalize_name("  Arsênio_TOTAL "), "arsênio total");
/// assert_eq!(metalwatch_analysis::normalize_name("Station-ID"), "station id");
/// ```
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
