//! Flux query construction for jobmon telemetry.

/// Query the last peak-memory sample for a job within a window.
pub fn max_memory_query(bucket: &str, job_id: &str, window: &str) -> String {
    format!(
        r#"from(bucket: "{bucket}")
|> range(start: -{window})
|> filter(fn: (r) => r["_measurement"] == "job_max_memory")
|> filter(fn: (r) => r["job_id"] == "{job_id}")
|> last()"#
    )
}

/// Query the last average-CPU sample for a job.
pub fn avg_cpu_query(bucket: &str, job_id: &str, window: &str) -> String {
    format!(
        r#"from(bucket: "{bucket}")
|> range(start: -{window})
|> filter(fn: (r) => r["_measurement"] == "job_avg_cpu")
|> filter(fn: (r) => r["job_id"] == "{job_id}")
|> last()"#
    )
}

/// Query all Lustre jobstats series for a job.
///
/// Rows come back tagged with `fs` and `server`, with cumulative
/// read_bytes / write_bytes / iops fields in time order.
pub fn lustre_jobstats_query(bucket: &str, job_id: &str, window: &str) -> String {
    format!(
        r#"from(bucket: "{bucket}")
|> range(start: -{window})
|> filter(fn: (r) => r["_measurement"] == "lustre_jobstats")
|> filter(fn: (r) => r["job_id"] == "{job_id}")"#
    )
}
