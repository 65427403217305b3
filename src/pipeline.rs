use crate::{
    config::PipelineConfig,
    error::Result,
    load::load_transactions,
    process::Cleaner,
    report::CleaningReport,
    write::{stage_report, write_parquet},
};
use std::time::Instant;
use tracing::info;

/// Run the cleaning stage end to end: load → clean → write table → write report.
///
/// The report is staged before the table is renamed into place, so any
/// failure up to that point leaves both previous outputs untouched. The
/// report rename follows the table rename.
#[tracing::instrument(level = "info", skip_all, fields(input = %config.input_path.display()))]
pub fn run(config: &PipelineConfig) -> Result<CleaningReport> {
    let start = Instant::now();

    let raw = load_transactions(&config.input_path)?;
    let cleaned = Cleaner::new(config.missing_description.as_str()).clean(&raw)?;
    drop(raw);

    let report = CleaningReport::build(&cleaned.stats, &cleaned.batch)?;
    let staged = stage_report(&report, &config.report_path)?;
    write_parquet(&cleaned.batch, &config.output_path)?;
    staged.commit()?;

    report.log();
    info!(elapsed = ?start.elapsed(), "cleaning stage done");
    Ok(report)
}
