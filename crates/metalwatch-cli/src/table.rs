//! Plain-text report tables

use std::{fmt, io};

use metalwatch_analysis::{
    association::AssociationResult,
    engine::{AnalysisReport, MetalReport},
    error::AnalysisError,
    hypothesis::LocationTestResult,
    interval::GroupedIntervals,
    overview::DatasetOverview,
};
use metalwatch_stats::confidence::ConfidenceInterval;

const HISTOGRAM_BAR_WIDTH: usize = 40;

pub(crate) fn write_analysis<W>(out: &mut W, report: &AnalysisReport) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(
        out,
        "Analysis of {} samples ({:.0}% confidence intervals)",
        report.sample_count,
        report.confidence_level * 100.0
    )?;
    for metal_report in report.metals.values() {
        writeln!(out)?;
        write_metal_report(out, metal_report)?;
    }
    Ok(())
}

fn write_metal_report<W>(out: &mut W, report: &MetalReport) -> io::Result<()>
where
    W: io::Write,
{
    let title = match report.limit {
        Some(limit) => format!("{} (limit {limit} mg/L)", report.metal),
        None => format!("{} (no reference limit)", report.metal),
    };
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(title.chars().count()))?;

    writeln!(out, "\nConfidence intervals by category:")?;
    match &report.intervals {
        Ok(intervals) => write_intervals(out, intervals)?,
        Err(err) => write_error(out, err)?,
    }

    writeln!(out, "\nIncident vs. rest:")?;
    match &report.location_test {
        Ok(result) => write_location_test(out, result)?,
        Err(err) => write_error(out, err)?,
    }

    writeln!(out, "\nCategory x compliance:")?;
    match &report.association {
        Ok(result) => write_association(out, result)?,
        Err(err) => write_error(out, err)?,
    }
    Ok(())
}

fn write_error<W>(out: &mut W, err: &AnalysisError) -> io::Result<()>
where
    W: io::Write,
{
    if err.is_empty_group() {
        writeln!(out, "  no data available ({err})")
    } else {
        writeln!(out, "  not available: {err}")
    }
}

pub(crate) fn write_intervals<W, K>(out: &mut W, intervals: &GroupedIntervals<K>) -> io::Result<()>
where
    W: io::Write,
    K: fmt::Display,
{
    writeln!(
        out,
        "  {:<12} {:>5} {:>12} {:>12} {:>12} {:>12}",
        "Group", "n", "Mean", "Margin", "Lower", "Upper"
    )?;
    writeln!(out, "  {}", "-".repeat(70))?;
    for (group, interval) in &intervals.groups {
        write_interval_row(out, &group.to_string(), interval)?;
    }
    if intervals.groups.is_empty() {
        writeln!(out, "  (no group has enough readings)")?;
    }
    for warning in &intervals.warnings {
        writeln!(out, "  warning: {}: {}", warning.group, warning.error)?;
    }
    Ok(())
}

fn write_interval_row<W>(out: &mut W, label: &str, interval: &ConfidenceInterval) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(
        out,
        "  {:<12} {:>5} {:>12.5} {:>12.5} {:>12.5} {:>12.5}",
        label,
        interval.n,
        interval.mean,
        interval.margin_of_error,
        interval.lower_bound,
        interval.upper_bound
    )
}

fn write_location_test<W>(out: &mut W, result: &LocationTestResult) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(
        out,
        "  normality p-values: {:.4} (n={}), {:.4} (n={})",
        result.normality_p_values[0], result.n1, result.normality_p_values[1], result.n2
    )?;
    let details = match (result.degrees_of_freedom, result.p_value_method) {
        (Some(df), _) => format!(", df = {df:.2}"),
        (None, Some(method)) => format!(", {method:?} p-value").to_lowercase(),
        (None, None) => String::new(),
    };
    writeln!(
        out,
        "  {}: statistic = {:.4}, p = {:.4e}{details}",
        result.method, result.statistic, result.p_value
    )?;
    writeln!(out, "  {}", significance_label(result.significant))
}

fn write_association<W, K>(out: &mut W, result: &AssociationResult<K>) -> io::Result<()>
where
    W: io::Write,
    K: fmt::Display,
{
    writeln!(
        out,
        "  {:<12} {:>8} {:>8} {:>8}",
        "Group",
        result.column_labels[0].to_string(),
        result.column_labels[1].to_string(),
        "Total"
    )?;
    writeln!(out, "  {}", "-".repeat(39))?;
    for ((label, counts), (row_total, expected)) in result
        .row_labels
        .iter()
        .zip(&result.counts)
        .zip(result.row_totals.iter().zip(&result.expected_frequencies))
    {
        writeln!(
            out,
            "  {:<12} {:>8} {:>8} {:>8}   expected {:.2} / {:.2}",
            label.to_string(),
            counts[0],
            counts[1],
            row_total,
            expected[0],
            expected[1]
        )?;
    }
    writeln!(
        out,
        "  {:<12} {:>8} {:>8} {:>8}",
        "Total", result.column_totals[0], result.column_totals[1], result.total
    )?;
    writeln!(
        out,
        "  chi-square = {:.4}, df = {}, p = {:.4e}",
        result.statistic, result.degrees_of_freedom, result.p_value
    )?;
    writeln!(out, "  {}", significance_label(result.significant))
}

fn significance_label(significant: bool) -> &'static str {
    if significant {
        "significant at the 5% level"
    } else {
        "not significant at the 5% level"
    }
}

pub(crate) fn write_overview<W>(out: &mut W, overview: &DatasetOverview) -> io::Result<()>
where
    W: io::Write,
{
    writeln!(out, "Records: {}", overview.total_records)?;
    writeln!(out, "\nRecords per category:")?;
    for (category, count) in &overview.records_per_category {
        writeln!(out, "  {:<12} {count:>6}", category.to_string())?;
    }

    writeln!(out, "\nMissing readings:")?;
    for (metal, count) in &overview.missing_readings {
        writeln!(out, "  {:<16} {count:>6}", metal.to_string())?;
    }

    writeln!(out, "\nDistributions:")?;
    writeln!(
        out,
        "  {:<16} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Metal", "n", "Mean", "Std", "Min", "P5", "P25", "P50", "P75", "P95", "Max"
    )?;
    for (metal, summary) in &overview.distributions {
        let Some(summary) = summary else {
            writeln!(out, "  {:<16} {:>5}", metal.to_string(), 0)?;
            continue;
        };
        let stats = &summary.stats;
        write!(
            out,
            "  {:<16} {:>5} {:>9.4} {:>9.4} {:>9.4}",
            metal.to_string(),
            stats.count,
            stats.mean,
            stats.std_dev,
            stats.min
        )?;
        for point in summary.percentiles.points() {
            write!(out, " {:>9.4}", point.value)?;
        }
        writeln!(out, " {:>9.4}", stats.max)?;
    }

    for (metal, summary) in &overview.distributions {
        let Some(summary) = summary else {
            continue;
        };
        writeln!(out, "\n{metal} histogram:")?;
        let max_count = summary
            .histogram
            .bins
            .iter()
            .map(|bin| bin.count)
            .max()
            .unwrap_or(1)
            .max(1);
        for bin in &summary.histogram.bins {
            #[expect(clippy::cast_possible_truncation)]
            let bar_width = (bin.count * HISTOGRAM_BAR_WIDTH as u64 / max_count) as usize;
            writeln!(
                out,
                "  {:>10.4} | {:<5} {}",
                bin.range.start,
                bin.count,
                "#".repeat(bar_width)
            )?;
        }
    }

    writeln!(out, "\nIncident records per station:")?;
    if overview.incident_frequency.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for frequency in &overview.incident_frequency {
        writeln!(out, "  {:<12} {:>6}", frequency.station_id, frequency.count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use metalwatch_analysis::{
        category::Category,
        engine::{AnalysisConfig, AnalysisEngine},
        limits::ReferenceLimits,
        metal::Metal,
        overview::DatasetOverview,
        sample::{Sample, SampleTable},
    };

    use super::*;

    fn table() -> SampleTable {
        [
            ("RD009", Category::Incident, 0.021),
            ("RD075", Category::Incident, 0.018),
            ("RD074", Category::Incident, 0.025),
            ("RD083", Category::Medium, 0.009),
            ("RD039", Category::Medium, 0.012),
            ("RD095", Category::Far, 0.004),
        ]
        .into_iter()
        .map(|(station, category, value)| {
            Sample::new(station, category).with_reading(Metal::ArsenicTotal, value)
        })
        .collect()
    }

    #[test]
    fn test_analysis_text_mentions_every_section() {
        let engine = AnalysisEngine::new(ReferenceLimits::default(), AnalysisConfig::default());
        let report = engine.analyze(&table()).unwrap();
        let mut out = vec![];
        write_analysis(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Arsenic-Total (limit 0.01 mg/L)"));
        assert!(text.contains("Incident vs. rest:"));
        assert!(text.contains("warning: Far"));
        // manganese was never measured
        assert!(text.contains("no data available"));
    }

    #[test]
    fn test_overview_text() {
        let overview = DatasetOverview::from_table(&table(), 5);
        let mut out = vec![];
        write_overview(&mut out, &overview).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Records: 6"));
        assert!(text.contains("Arsenic-Total histogram:"));
        assert!(text.contains("RD009"));
    }
}
