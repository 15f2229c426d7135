//! CSV dataset loader
//!
//! Column names are matched after normalization (case, `_`/`-` and
//! whitespace are ignored). Recognized columns:
//!
//! | Column   | Accepted names                                          |
//! |----------|---------------------------------------------------------|
//! | station  | `station`, `station id`, `station code`, `estação`, `estacao` |
//! | category | `category`, `categoria`                                 |
//! | date     | `date`, `sampled at`, `data` (optional)                 |
//! | metals   | anything [`Metal::from_column`] recognizes              |
//!
//! Other columns are ignored. Empty or non-numeric metal cells are missing
//! readings; negative readings are logged and treated as missing.

use std::{fs::File, io, path::Path};

use anyhow::{Context, bail};
use chrono::NaiveDate;
use metalwatch_analysis::{
    category::Category,
    metal::Metal,
    normalize_name,
    sample::{Sample, SampleTable},
};

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

pub(crate) fn load_samples(path: &Path) -> anyhow::Result<SampleTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset file: {}", path.display()))?;
    let table = read_samples(file)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    log::info!("loaded {} samples from {}", table.len(), path.display());
    Ok(table)
}

pub(crate) fn read_samples<R>(reader: R) -> anyhow::Result<SampleTable>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().context("Failed to read CSV header")?;
    let columns = Columns::from_headers(headers)?;

    let mut samples = vec![];
    for (idx, record) in reader.records().enumerate() {
        // header is line 1
        let line = idx + 2;
        let record = record.with_context(|| format!("Failed to read CSV line {line}"))?;
        let sample = columns
            .parse_record(&record, line)
            .with_context(|| format!("Invalid record on CSV line {line}"))?;
        samples.push(sample);
    }
    Ok(SampleTable::new(samples))
}

#[derive(Debug)]
struct Columns {
    station: usize,
    category: usize,
    date: Option<usize>,
    metals: Vec<(usize, Metal)>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let mut station = None;
        let mut category = None;
        let mut date = None;
        let mut metals = Vec::<(usize, Metal)>::new();

        for (idx, header) in headers.iter().enumerate() {
            match normalize_name(header).as_str() {
                "station" | "station id" | "station code" | "estação" | "estacao" => {
                    station.get_or_insert(idx);
                }
                "category" | "categoria" => {
                    category.get_or_insert(idx);
                }
                "date" | "sampled at" | "data" => {
                    date.get_or_insert(idx);
                }
                _ => match Metal::from_column(header) {
                    Some(metal) if metals.iter().any(|(_, m)| *m == metal) => {
                        log::warn!("ignoring duplicate column '{header}' for {metal}");
                    }
                    Some(metal) => metals.push((idx, metal)),
                    None => log::debug!("ignoring column '{header}'"),
                },
            }
        }

        let Some(station) = station else {
            bail!("CSV has no station column");
        };
        let Some(category) = category else {
            bail!("CSV has no category column");
        };
        if metals.is_empty() {
            log::warn!("CSV has no metal columns");
        }
        Ok(Self {
            station,
            category,
            date,
            metals,
        })
    }

    fn parse_record(&self, record: &csv::StringRecord, line: usize) -> anyhow::Result<Sample> {
        let station_id = record.get(self.station).unwrap_or_default();
        if station_id.is_empty() {
            bail!("empty station id");
        }
        let category = record
            .get(self.category)
            .unwrap_or_default()
            .parse::<Category>()?;
        let mut sample = Sample::new(station_id, category);

        if let Some(cell) = self.date.and_then(|idx| record.get(idx))
            && !cell.is_empty()
        {
            match parse_date(cell) {
                Some(date) => sample = sample.with_date(date),
                None => log::warn!("line {line}: unrecognized date '{cell}'"),
            }
        }

        for &(idx, metal) in &self.metals {
            match parse_reading(record.get(idx).unwrap_or_default()) {
                Some(value) if value < 0.0 => {
                    log::warn!("line {line}: dropping negative {metal} reading {value}");
                }
                Some(value) => sample = sample.with_reading(metal, value),
                None => {}
            }
        }
        Ok(sample)
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
}

/// Numeric cell value; decimal commas are accepted.
fn parse_reading(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>()
        .or_else(|_| cell.replace(',', ".").parse::<f64>())
        .ok()
        .filter(|value| value.is_finite())
}
