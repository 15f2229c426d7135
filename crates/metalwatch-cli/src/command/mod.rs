use clap::{Parser, Subcommand};

use self::{
    analyze::AnalyzeArg, generate_samples::GenerateSamplesArg, intervals::IntervalsArg,
    summary::SummaryArg,
};

mod analyze;
mod generate_samples;
mod intervals;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run every analysis for each metal
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Confidence intervals of one metal by category or station
    Intervals(#[clap(flatten)] IntervalsArg),
    /// Dataset overview: counts, missing readings and distributions
    Summary(#[clap(flatten)] SummaryArg),
    /// Write a synthetic samples CSV file
    GenerateSamples(#[clap(flatten)] GenerateSamplesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Intervals(arg) => intervals::run(&arg)?,
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::GenerateSamples(arg) => generate_samples::run(&arg)?,
    }
    Ok(())
}
