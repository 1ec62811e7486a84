//! Job identifier parsing and resolution.
//!
//! Users refer to jobs three ways: plain ("123"), array task ("123_4"),
//! or heterogeneous component ("100+2"). The accounting database only
//! addresses jobs by raw numeric ID, so array tasks need a lookup among
//! the jobs sharing the array base before the record can be fetched.

use crate::SummaryError;
use jobsum_slurm::{JobDatabase, JobRecord, SacctError};
use once_cell::sync::Lazy;
use regex::Regex;

static ARRAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)_(\d+)$").unwrap());
static HET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\+(\d+)$").unwrap());
static PLAIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// A parsed job identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobId {
    Plain(u64),
    ArrayTask { array_id: u64, task_id: u32 },
    Heterogeneous { base_id: u64, offset: u64 },
}

impl JobId {
    /// Parse a user-supplied identifier string.
    pub fn parse(s: &str) -> Result<Self, SummaryError> {
        if let Some(caps) = ARRAY_RE.captures(s) {
            return Ok(Self::ArrayTask {
                array_id: parse_capture(&caps, 1, s)?,
                task_id: parse_capture(&caps, 2, s)?,
            });
        }
        if let Some(caps) = HET_RE.captures(s) {
            return Ok(Self::Heterogeneous {
                base_id: parse_capture(&caps, 1, s)?,
                offset: parse_capture(&caps, 2, s)?,
            });
        }
        if PLAIN_RE.is_match(s) {
            return Ok(Self::Plain(parse_number(s, s)?));
        }
        Err(SummaryError::InvalidIdentifier(s.to_string()))
    }
}

fn parse_capture<T: std::str::FromStr>(
    caps: &regex::Captures<'_>,
    group: usize,
    original: &str,
) -> Result<T, SummaryError> {
    parse_number(&caps[group], original)
}

fn parse_number<T: std::str::FromStr>(s: &str, original: &str) -> Result<T, SummaryError> {
    // Digits that overflow the target type are still a bad identifier
    s.parse()
        .map_err(|_| SummaryError::InvalidIdentifier(original.to_string()))
}

/// A job identifier resolved against the accounting database.
#[derive(Debug, Clone)]
pub struct ResolvedJob {
    /// The identifier exactly as the user supplied it
    pub user_id: String,

    /// The job's accounting record
    pub record: JobRecord,

    /// Identifier used to tag this job's samples in the metrics store
    pub metrics_id: String,
}

/// Resolve a user identifier to its accounting record and metrics ID.
///
/// Array tasks are located by scanning the jobs sharing the array base
/// for a matching task index; a missing task is `JobNotFound` even
/// though the array lookup itself succeeded.
pub async fn resolve<D: JobDatabase>(user_id: &str, db: &D) -> Result<ResolvedJob, SummaryError> {
    let parsed = JobId::parse(user_id)?;

    let raw_id = match parsed {
        JobId::Plain(id) => id,
        JobId::Heterogeneous { base_id, offset } => base_id + offset,
        JobId::ArrayTask { array_id, task_id } => {
            let tasks = db
                .fetch_array_jobs(array_id)
                .await
                .map_err(|e| not_found(e, user_id))?;
            tasks
                .get(&task_id)
                .map(|r| r.id)
                .ok_or_else(|| SummaryError::JobNotFound(user_id.to_string()))?
        }
    };

    let record = db.fetch_job(raw_id).await.map_err(|e| not_found(e, user_id))?;

    // Mirror the scheduler's own labeling so metrics queries line up
    // with how array-job samples are tagged.
    let metrics_id = match (record.array_job_id, record.array_task_id) {
        (Some(array), Some(task)) => format!("{array}_{task}"),
        _ => user_id.to_string(),
    };

    Ok(ResolvedJob {
        user_id: user_id.to_string(),
        record,
        metrics_id,
    })
}

fn not_found(e: SacctError, user_id: &str) -> SummaryError {
    match e {
        SacctError::NotFound(_) => SummaryError::JobNotFound(user_id.to_string()),
        other => SummaryError::Accounting(other),
    }
}
