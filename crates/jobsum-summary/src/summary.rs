//! The summary aggregator.
//!
//! Decides, per metric, whether authoritative data comes from the
//! finished job's accounting statistics or from a live metrics query,
//! and merges everything into one immutable [`JobSummary`].

use crate::ident::ResolvedJob;
use jobsum_influx::{JobstatsData, MetricsSource, SEARCH_WINDOW};
use jobsum_slurm::{JobRecord, JobState};
use std::collections::BTreeMap;

/// Totals for one Lustre filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LustreUsage {
    pub total_read: u64,
    pub total_write: u64,
    pub total_iops: u64,
}

/// A job's aggregated resource usage, built once per report.
#[derive(Debug, Clone)]
pub struct JobSummary {
    /// The identifier as the user supplied it, for the report title
    pub job_id: String,

    /// Job state
    pub state: JobState,

    /// Requested memory per node, in bytes (0 until the job starts)
    pub req_mem_bytes: u64,

    /// Peak resident memory, in bytes; None when no source has data
    pub max_mem_bytes: Option<u64>,

    /// Elapsed wall time in seconds
    pub elapsed_seconds: u64,

    /// Time limit in seconds; None for unlimited
    pub time_limit_seconds: Option<u64>,

    /// Average CPU usage percentage; unclamped, None when unknown
    pub avg_cpu_percent: Option<f64>,

    /// Per-filesystem I/O totals; None when metrics are unavailable
    pub lustre_stats: Option<BTreeMap<String, LustreUsage>>,

    /// Efficiency warnings, in generation order
    pub warnings: Vec<String>,
}

/// Build a summary from an accounting record and an optional metrics
/// gateway.
///
/// Finished jobs read peak memory and CPU from their accounting
/// statistics; unfinished jobs fall back to the gateway when one is
/// configured and to "no data" otherwise. Lustre stats only ever come
/// from the gateway.
pub async fn summarize<M: MetricsSource>(
    resolved: &ResolvedJob,
    metrics: Option<&M>,
) -> JobSummary {
    let record = &resolved.record;
    let metrics_id = resolved.metrics_id.as_str();

    let req_mem_bytes = req_mem_per_node(record);
    let max_mem_bytes = max_mem(record, metrics, metrics_id).await;
    let avg_cpu_percent = avg_cpu(record, metrics, metrics_id).await;

    let lustre_stats = match metrics {
        Some(m) => m.lustre_jobstats(metrics_id).await.map(lustre_totals),
        None => None,
    };

    let warnings = warnings_for(max_mem_bytes, req_mem_bytes, avg_cpu_percent);

    JobSummary {
        job_id: resolved.user_id.clone(),
        state: record.state.clone(),
        req_mem_bytes,
        max_mem_bytes,
        elapsed_seconds: record.elapsed_seconds.unwrap_or(0),
        time_limit_seconds: record.time_limit_minutes.map(|m| m * 60),
        avg_cpu_percent,
        lustre_stats,
        warnings,
    }
}

/// Requested memory per node: total / nodes, exactly 0 before the job
/// has any nodes allocated.
fn req_mem_per_node(record: &JobRecord) -> u64 {
    if record.num_nodes == 0 {
        0
    } else {
        record.req_mem_bytes / record.num_nodes as u64
    }
}

async fn max_mem<M: MetricsSource>(
    record: &JobRecord,
    metrics: Option<&M>,
    metrics_id: &str,
) -> Option<u64> {
    if record.state.is_finished() {
        Some(record.stats.max_resident_memory)
    } else if let Some(m) = metrics {
        m.peak_memory(metrics_id, SEARCH_WINDOW).await
    } else {
        None
    }
}

async fn avg_cpu<M: MetricsSource>(
    record: &JobRecord,
    metrics: Option<&M>,
    metrics_id: &str,
) -> Option<f64> {
    if record.state.is_finished() {
        if record.stats.elapsed_cpu_time == 0 {
            return Some(0.0);
        }
        let user_cpu = record.total_user_cpu_seconds();
        Some(user_cpu as f64 / record.stats.elapsed_cpu_time as f64 * 100.0)
    } else if let Some(m) = metrics {
        m.average_cpu(metrics_id).await
    } else {
        None
    }
}

/// Reduce raw jobstats series to per-filesystem totals.
///
/// The counters are cumulative, so the last sample of each series is
/// the total. Missing keys are zero readings, not errors; sparse
/// telemetry is expected.
fn lustre_totals(data: JobstatsData) -> BTreeMap<String, LustreUsage> {
    let last_value = |fs: &str, server: &str, field: &str| -> u64 {
        data.get(fs)
            .and_then(|servers| servers.get(server))
            .and_then(|fields| fields.get(field))
            .and_then(|series| series.value.last())
            .map(|v| *v as u64)
            .unwrap_or(0)
    };

    data.keys()
        .map(|fs| {
            let usage = LustreUsage {
                total_read: last_value(fs, "oss", "read_bytes"),
                total_write: last_value(fs, "oss", "write_bytes"),
                total_iops: last_value(fs, "mds", "iops"),
            };
            (fs.clone(), usage)
        })
        .collect()
}

/// Derive warnings from already-computed summary fields.
///
/// Pure and order-preserving; both conditions are independent and can
/// fire together.
fn warnings_for(max_mem: Option<u64>, req_mem: u64, avg_cpu: Option<f64>) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(max) = max_mem {
        if req_mem > 0 && (max as f64 / req_mem as f64) < 0.5 {
            warnings.push("Too much memory requested".to_string());
        }
    }

    if let Some(cpu) = avg_cpu {
        if cpu < 75.0 {
            warnings.push("CPU usage is low".to_string());
        }
    }

    warnings
}
