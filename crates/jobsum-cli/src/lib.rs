//! CLI argument parsing for jobsum.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "jobsum")]
#[command(about = "Summarize resource usage for a Slurm job")]
pub struct Args {
    /// Job ID: plain ("123"), array task ("123_4"), or heterogeneous ("100+2")
    pub job_id: String,

    /// Skip the metrics store entirely
    #[arg(long)]
    pub no_influx: bool,

    /// InfluxDB server URL
    #[arg(long, default_value = "http://localhost:8086")]
    pub influx_url: String,

    /// InfluxDB organization
    #[arg(long, default_value = "jobmon")]
    pub influx_org: String,

    /// InfluxDB bucket holding jobmon telemetry
    #[arg(long, default_value = "jobmon-stats")]
    pub influx_bucket: String,

    /// InfluxDB API token
    #[arg(long, env = "INFLUX_TOKEN", hide_env_values = true)]
    pub influx_token: Option<String>,
}
