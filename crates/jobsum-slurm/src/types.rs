//! Slurm accounting record types.

use std::fmt;

/// Slurm job state as reported by the accounting database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Requeued,
    Resizing,
    Suspended,
    Completed,
    Cancelled,
    Failed,
    Timeout,
    OutOfMemory,
    NodeFail,
    Unknown(String),
}

impl JobState {
    /// Parse an sacct state string.
    ///
    /// sacct states can have suffixes like "CANCELLED by 12345".
    pub fn parse(s: &str) -> Self {
        let base = s.split_whitespace().next().unwrap_or(s);
        match base.to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "REQUEUED" => Self::Requeued,
            "RESIZING" => Self::Resizing,
            "SUSPENDED" => Self::Suspended,
            "COMPLETED" => Self::Completed,
            "CANCELLED" => Self::Cancelled,
            "FAILED" => Self::Failed,
            "TIMEOUT" => Self::Timeout,
            "OUT_OF_MEMORY" => Self::OutOfMemory,
            "NODE_FAIL" => Self::NodeFail,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the job has finished executing.
    ///
    /// Finished jobs have authoritative usage statistics in the
    /// accounting database; unfinished jobs do not.
    pub fn is_finished(&self) -> bool {
        !matches!(
            self,
            Self::Pending | Self::Running | Self::Requeued | Self::Resizing | Self::Suspended
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Requeued => "REQUEUED",
            Self::Resizing => "RESIZING",
            Self::Suspended => "SUSPENDED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::NodeFail => "NODE_FAIL",
            Self::Unknown(s) => s,
        };
        f.write_str(s)
    }
}

/// Aggregate usage statistics for a finished job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Peak resident memory of any step, in bytes
    pub max_resident_memory: u64,

    /// Elapsed CPU time (elapsed wall time x allocated CPUs), in seconds
    pub elapsed_cpu_time: u64,
}

/// Per-step usage statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStats {
    /// Step name (e.g. "123.batch", "123.0")
    pub name: String,

    /// User CPU time consumed by the step, in seconds
    pub user_cpu_seconds: u64,
}

/// One job's record from the accounting database.
#[derive(Debug, Clone)]
pub struct JobRecord {
    /// Raw (canonical) job ID
    pub id: u64,

    /// Job state
    pub state: JobState,

    /// Requested memory across all nodes, in bytes (0 if not recorded)
    pub req_mem_bytes: u64,

    /// Allocated node count (0 until the job starts)
    pub num_nodes: u32,

    /// Elapsed wall time in seconds
    pub elapsed_seconds: Option<u64>,

    /// Time limit in minutes
    pub time_limit_minutes: Option<u64>,

    /// Array job base ID, for array tasks
    pub array_job_id: Option<u64>,

    /// Array task index, for array tasks
    pub array_task_id: Option<u32>,

    /// Aggregate usage statistics
    pub stats: JobStats,

    /// Per-step usage statistics
    pub steps: Vec<StepStats>,
}

impl JobRecord {
    /// Total user CPU time across all steps, in seconds.
    pub fn total_user_cpu_seconds(&self) -> u64 {
        self.steps.iter().map(|s| s.user_cpu_seconds).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(JobState::parse("COMPLETED"), JobState::Completed);
        assert_eq!(JobState::parse("CANCELLED by 12345"), JobState::Cancelled);
        assert_eq!(JobState::parse("running"), JobState::Running);
        assert_eq!(
            JobState::parse("SPECIAL_EXIT"),
            JobState::Unknown("SPECIAL_EXIT".to_string())
        );
    }

    #[test]
    fn test_is_finished() {
        assert!(JobState::Completed.is_finished());
        assert!(JobState::Failed.is_finished());
        assert!(JobState::Cancelled.is_finished());
        assert!(JobState::Unknown("SPECIAL_EXIT".to_string()).is_finished());

        assert!(!JobState::Pending.is_finished());
        assert!(!JobState::Running.is_finished());
        assert!(!JobState::Requeued.is_finished());
        assert!(!JobState::Resizing.is_finished());
        assert!(!JobState::Suspended.is_finished());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(JobState::OutOfMemory.to_string(), "OUT_OF_MEMORY");
        assert_eq!(
            JobState::Unknown("SPECIAL_EXIT".to_string()).to_string(),
            "SPECIAL_EXIT"
        );
    }

    #[test]
    fn test_total_user_cpu() {
        let record = JobRecord {
            id: 1,
            state: JobState::Completed,
            req_mem_bytes: 0,
            num_nodes: 1,
            elapsed_seconds: Some(10),
            time_limit_minutes: Some(1),
            array_job_id: None,
            array_task_id: None,
            stats: JobStats::default(),
            steps: vec![
                StepStats {
                    name: "1.batch".to_string(),
                    user_cpu_seconds: 30,
                },
                StepStats {
                    name: "1.0".to_string(),
                    user_cpu_seconds: 50,
                },
            ],
        };
        assert_eq!(record.total_user_cpu_seconds(), 80);
    }
}
