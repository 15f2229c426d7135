use std::path::PathBuf;

use clap::Args;
use metalwatch_analysis::overview::{DEFAULT_HISTOGRAM_BINS, DatasetOverview};

use crate::{
    dataset::load_samples,
    table,
    util::{Output, OutputFormat},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    /// Path to the samples CSV file
    data: PathBuf,
    /// Number of histogram bins per metal
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins: usize,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let samples = load_samples(&arg.data)?;
    let overview = DatasetOverview::from_table(&samples, arg.bins);

    Output::create(arg.output.as_deref())?.write_report(arg.format, &overview, |out| {
        table::write_overview(out, &overview)
    })
}
