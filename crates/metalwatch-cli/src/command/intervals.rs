use std::{fmt, io::Write as _, path::PathBuf};

use clap::{Args, ValueEnum};
use metalwatch_analysis::{interval::GroupedIntervals, metal::Metal};
use metalwatch_stats::confidence::DEFAULT_CONFIDENCE_LEVEL;
use serde::Serialize;

use crate::{
    dataset::load_samples,
    table,
    util::{Output, OutputFormat},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum GroupBy {
    #[default]
    Category,
    Station,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct IntervalsArg {
    /// Path to the samples CSV file
    data: PathBuf,
    /// Metal to estimate
    #[arg(long)]
    metal: Metal,
    /// Grouping of the samples
    #[arg(long, value_enum, default_value_t)]
    by: GroupBy,
    /// Confidence level of the intervals
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_LEVEL)]
    confidence: f64,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &IntervalsArg) -> anyhow::Result<()> {
    let samples = load_samples(&arg.data)?;
    let output = Output::create(arg.output.as_deref())?;
    match arg.by {
        GroupBy::Category => {
            let intervals = GroupedIntervals::by_category(&samples, arg.metal, arg.confidence)?;
            write(output, arg.format, &intervals)
        }
        GroupBy::Station => {
            let intervals = GroupedIntervals::by_station(&samples, arg.metal, arg.confidence)?;
            write(output, arg.format, &intervals)
        }
    }
}

fn write<K>(
    output: Output,
    format: OutputFormat,
    intervals: &GroupedIntervals<K>,
) -> anyhow::Result<()>
where
    K: fmt::Display + Serialize,
{
    output.write_report(format, intervals, |out| {
        writeln!(
            out,
            "{} mean, {:.0}% confidence intervals",
            intervals.metal,
            intervals.confidence_level * 100.0
        )?;
        table::write_intervals(out, intervals)
    })
}
