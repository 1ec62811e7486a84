//! jobsum - resource-usage summary for a single Slurm job.

use clap::Parser;
use jobsum_cli::Args;
use jobsum_influx::InfluxClient;
use jobsum_slurm::Sacct;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let influx = build_influx(&args)?;

    let resolved = jobsum_summary::resolve(&args.job_id, &Sacct)
        .await
        .into_diagnostic()?;
    let summary = jobsum_summary::summarize(&resolved, influx.as_ref()).await;

    println!("{}", jobsum_summary::render(&summary));
    Ok(())
}

/// Build the metrics gateway, or None when it is disabled or has no
/// token. A missing gateway degrades the report to "No data available"
/// for metrics-dependent fields rather than failing.
fn build_influx(args: &Args) -> Result<Option<InfluxClient>> {
    if args.no_influx {
        return Ok(None);
    }

    let Some(token) = &args.influx_token else {
        tracing::warn!("No InfluxDB token configured; metrics queries disabled");
        return Ok(None);
    };

    InfluxClient::new(
        &args.influx_url,
        &args.influx_org,
        token.as_str(),
        args.influx_bucket.as_str(),
    )
    .map(Some)
    .into_diagnostic()
}
