//! Query the Slurm accounting database via sacct.

use crate::types::{JobRecord, JobState, StepStats};
use jobsum_util::{parse_duration_secs, parse_memory_bytes, run_command, split_delimited};
use std::collections::HashMap;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum SacctError {
    #[error("Failed to execute sacct: {0}")]
    Execution(String),
    #[error("Failed to parse sacct output: {0}")]
    Parse(String),
    #[error("Job {0} not found in the accounting database")]
    NotFound(String),
}

/// sacct output format (--parsable2 uses | delimiter).
///
/// Job rows carry the record fields; step rows carry MaxRSS and UserCPU.
const SACCT_FORMAT: &str =
    "JobIDRaw,State,ReqMem,NNodes,ElapsedRaw,TimelimitRaw,ArrayJobID,ArrayTaskID,MaxRSS,CPUTimeRAW,UserCPU";

const SACCT_FIELDS: usize = 11;

/// Read-only view of the accounting database.
///
/// The resolver and aggregator depend on this rather than on sacct
/// directly so they can be tested against canned records.
pub trait JobDatabase {
    /// Fetch a single job record by raw ID.
    fn fetch_job(
        &self,
        id: u64,
    ) -> impl std::future::Future<Output = Result<JobRecord, SacctError>> + Send;

    /// Fetch all records sharing an array base ID, keyed by task index.
    fn fetch_array_jobs(
        &self,
        array_id: u64,
    ) -> impl std::future::Future<Output = Result<HashMap<u32, JobRecord>, SacctError>> + Send;
}

/// sacct-backed accounting client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sacct;

impl JobDatabase for Sacct {
    async fn fetch_job(&self, id: u64) -> Result<JobRecord, SacctError> {
        let mut cmd = Command::new("sacct");
        cmd.args(["-j", &id.to_string(), "--parsable2", "--noheader"]);
        cmd.args(["--format", SACCT_FORMAT]);

        let stdout = run_command(&mut cmd, "sacct")
            .await
            .map_err(|e| SacctError::Execution(e.to_string()))?;

        let records = parse_sacct_output(&stdout);
        records
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| SacctError::NotFound(id.to_string()))
    }

    async fn fetch_array_jobs(&self, array_id: u64) -> Result<HashMap<u32, JobRecord>, SacctError> {
        let mut cmd = Command::new("sacct");
        // -X keeps this to one row per task; steps are not needed here
        cmd.args(["-j", &array_id.to_string(), "-X", "--parsable2", "--noheader"]);
        cmd.args(["--format", SACCT_FORMAT]);

        let stdout = run_command(&mut cmd, "sacct")
            .await
            .map_err(|e| SacctError::Execution(e.to_string()))?;

        let mut tasks = HashMap::new();
        for record in parse_sacct_output(&stdout) {
            if let Some(task_id) = record.array_task_id {
                tasks.insert(task_id, record);
            }
        }

        Ok(tasks)
    }
}

/// Parse full sacct output into job records with attached step stats.
///
/// Job rows have a numeric JobIDRaw; step rows use "<id>.<step>" and are
/// folded into the preceding job's peak RSS and step list. Unparseable
/// lines are logged and skipped.
pub fn parse_sacct_output(stdout: &str) -> Vec<JobRecord> {
    let mut records: Vec<JobRecord> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for line in stdout.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let fields = match split_delimited(line, SACCT_FIELDS) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Failed to parse sacct line: {}", e);
                continue;
            }
        };

        match fields[0].split_once('.') {
            // Step row: fold into its parent job
            Some((base, _step)) => {
                let Some(&i) = base.parse::<u64>().ok().and_then(|id| index.get(&id)) else {
                    tracing::warn!("sacct step row without parent job: {}", fields[0]);
                    continue;
                };
                apply_step(&mut records[i], &fields);
            }
            // Job row
            None => match parse_job_row(&fields) {
                Ok(record) => {
                    index.insert(record.id, records.len());
                    records.push(record);
                }
                Err(e) => tracing::warn!("Failed to parse sacct line: {}", e),
            },
        }
    }

    records
}

fn parse_job_row(fields: &[&str]) -> Result<JobRecord, String> {
    let id: u64 = fields[0]
        .parse()
        .map_err(|_| format!("Bad job ID: {}", fields[0]))?;

    Ok(JobRecord {
        id,
        state: JobState::parse(fields[1]),
        req_mem_bytes: parse_memory_bytes(fields[2]).unwrap_or(0),
        num_nodes: fields[3].parse().unwrap_or(0),
        elapsed_seconds: fields[4].parse().ok(),
        time_limit_minutes: fields[5].parse().ok(),
        array_job_id: fields[6].parse().ok().filter(|&v: &u64| v != 0),
        array_task_id: fields[7].parse().ok(),
        stats: crate::types::JobStats {
            max_resident_memory: 0,
            elapsed_cpu_time: fields[9].parse().unwrap_or(0),
        },
        steps: Vec::new(),
    })
}

fn apply_step(record: &mut JobRecord, fields: &[&str]) {
    if let Some(rss) = parse_memory_bytes(fields[8]) {
        record.stats.max_resident_memory = record.stats.max_resident_memory.max(rss);
    }
    record.steps.push(StepStats {
        name: fields[0].to_string(),
        user_cpu_seconds: parse_duration_secs(fields[10]).unwrap_or(0),
    });
}
