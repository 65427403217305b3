use anyhow::{Context, Result};
use retail_clean::{pipeline, PipelineConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure paths ──────────────────────────────────────────
    let config = PipelineConfig::load().context("loading pipeline config")?;
    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        "configured"
    );

    // ─── 3) clean + persist ──────────────────────────────────────────
    let report = pipeline::run(&config).with_context(|| {
        format!("cleaning {} failed", config.input_path.display())
    })?;

    info!(
        rows = report.output_rows,
        columns = report.output_columns,
        "all done"
    );
    Ok(())
}
