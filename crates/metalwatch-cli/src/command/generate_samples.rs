use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use chrono::{Months, NaiveDate};
use clap::Args;
use metalwatch_analysis::{category::Category, metal::Metal};
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use rand_pcg::Pcg64;

use crate::util::Output;

/// Monitoring stations and their exposure category.
const STATIONS: [(&str, Category); 8] = [
    ("RD009", Category::Incident),
    ("RD075", Category::Incident),
    ("RD074", Category::Incident),
    ("RD059", Category::Incident),
    ("RD083", Category::Medium),
    ("RD039", Category::Medium),
    ("RD095", Category::Far),
    ("RD085", Category::Far),
];

/// Probability that a reading is left blank.
const MISSING_PROBABILITY: f64 = 0.05;
/// Log-scale spread of the concentrations.
const SIGMA: f64 = 0.5;

#[derive(Debug, Clone, Args)]
pub(crate) struct GenerateSamplesArg {
    /// Random seed (a random one if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of monthly records per station
    #[arg(long, default_value_t = 24)]
    records_per_station: u32,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Median concentration in mg/L.
fn median_concentration(metal: Metal, category: Category) -> f64 {
    let scale = match category {
        Category::Incident => 1.0,
        Category::Medium => 0.45,
        Category::Far => 0.15,
    };
    let incident_median = match metal {
        Metal::ArsenicTotal => 0.02,
        Metal::IronDissolved => 0.8,
        Metal::ManganeseTotal => 0.3,
    };
    incident_median * scale
}

pub(crate) fn run(arg: &GenerateSamplesArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("generating samples with seed {seed}");
    let mut rng = Pcg64::seed_from_u64(seed);

    let start = NaiveDate::from_ymd_opt(2020, 1, 15).context("Invalid start date")?;
    let distributions = Metal::ALL
        .into_iter()
        .flat_map(|metal| Category::ALL.into_iter().map(move |category| (metal, category)))
        .map(|(metal, category)| {
            LogNormal::new(median_concentration(metal, category).ln(), SIGMA)
                .map(|dist| ((metal, category), dist))
                .with_context(|| format!("Invalid distribution for {metal} at {category}"))
        })
        .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

    let output = Output::create(arg.output.as_deref())?;
    let display_path = output.to_string();
    let mut writer = csv::Writer::from_writer(output);
    let mut header = vec!["station".to_owned(), "category".to_owned(), "date".to_owned()];
    header.extend(Metal::ALL.iter().map(|metal| metal.id().to_owned()));
    writer
        .write_record(&header)
        .with_context(|| format!("Failed to write CSV header to {display_path}"))?;

    let mut count = 0;
    for (station, category) in STATIONS {
        for month in 0..arg.records_per_station {
            let date = start
                .checked_add_months(Months::new(month))
                .context("Sample date out of range")?;
            let mut record = vec![
                station.to_owned(),
                category.to_string().to_lowercase(),
                date.format("%Y-%m-%d").to_string(),
            ];
            for metal in Metal::ALL {
                let cell = if rng.random_bool(MISSING_PROBABILITY) {
                    String::new()
                } else {
                    let dist = distributions
                        .get(&(metal, category))
                        .context("Missing concentration distribution")?;
                    format!("{:.5}", dist.sample(&mut rng))
                };
                record.push(cell);
            }
            writer
                .write_record(&record)
                .with_context(|| format!("Failed to write CSV record to {display_path}"))?;
            count += 1;
        }
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush output to {display_path}"))?;
    log::info!("wrote {count} samples to {display_path}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medians_decrease_away_from_incident() {
        for metal in Metal::ALL {
            let incident = median_concentration(metal, Category::Incident);
            let medium = median_concentration(metal, Category::Medium);
            let far = median_concentration(metal, Category::Far);
            assert!(incident > medium && medium > far, "{metal}");
        }
    }

    #[test]
    fn test_far_medians_are_within_default_limits() {
        let limits = metalwatch_analysis::limits::ReferenceLimits::default();
        for metal in Metal::ALL {
            let limit = limits.get(metal).unwrap();
            assert!(median_concentration(metal, Category::Far) < limit, "{metal}");
            assert!(median_concentration(metal, Category::Incident) > limit, "{metal}");
        }
    }
}
