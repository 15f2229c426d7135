use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use metalwatch_analysis::{
    engine::{AnalysisConfig, AnalysisEngine},
    metal::Metal,
};
use metalwatch_stats::confidence::DEFAULT_CONFIDENCE_LEVEL;

use crate::{
    dataset::load_samples,
    table,
    util::{Output, OutputFormat, load_limits},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Path to the samples CSV file
    data: PathBuf,
    /// Reference-limit catalog JSON file (built-in limits if omitted)
    #[arg(long)]
    limits: Option<PathBuf>,
    /// Confidence level of the group intervals
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_LEVEL)]
    confidence: f64,
    /// Analyze metals one after another instead of in parallel
    #[arg(long)]
    sequential: bool,
    /// Metals to analyze (all if omitted)
    #[arg(long = "metal")]
    metals: Vec<Metal>,
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let table = load_samples(&arg.data)?;
    let limits = load_limits(arg.limits.as_deref())?;
    let engine = AnalysisEngine::new(
        limits,
        AnalysisConfig {
            confidence_level: arg.confidence,
            parallel: !arg.sequential,
        },
    );

    let metals = if arg.metals.is_empty() {
        Metal::ALL.to_vec()
    } else {
        arg.metals.clone()
    };
    let report = engine
        .analyze_metals(&table, &metals)
        .with_context(|| format!("Cannot analyze {}", arg.data.display()))?;

    Output::create(arg.output.as_deref())?.write_report(arg.format, &report, |out| {
        table::write_analysis(out, &report)
    })
}
