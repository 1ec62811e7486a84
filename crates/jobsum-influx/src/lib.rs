//! Metrics-store integration for jobsum.
//!
//! Translates abstract metric requests (peak memory, average CPU, Lustre
//! jobstats) into Flux queries against an InfluxDB 2.x server holding
//! jobmon telemetry, and parses the CSV responses back into typed values.

pub mod client;
pub mod flux;
pub mod types;

pub use client::{InfluxClient, InfluxError};
pub use types::{FieldSeries, JobstatsData};

/// How far back to look for samples of an unfinished job.
pub const SEARCH_WINDOW: &str = "7d";

/// Abstract metric queries consumed by the summary aggregator.
///
/// All absence is modeled as `None`: a failed or empty query is "no
/// data", never an error the aggregator has to handle.
pub trait MetricsSource {
    /// Last recorded peak memory sample for a job within a window, in bytes.
    fn peak_memory(
        &self,
        metrics_id: &str,
        window: &str,
    ) -> impl std::future::Future<Output = Option<u64>> + Send;

    /// Average CPU usage percentage for a job, as aggregated by the store.
    fn average_cpu(&self, metrics_id: &str) -> impl std::future::Future<Output = Option<f64>> + Send;

    /// Lustre jobstats series for a job, grouped fs -> server -> field.
    fn lustre_jobstats(
        &self,
        metrics_id: &str,
    ) -> impl std::future::Future<Output = Option<JobstatsData>> + Send;
}
