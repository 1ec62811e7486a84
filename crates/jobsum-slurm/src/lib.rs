//! Slurm accounting-database integration for jobsum.
//!
//! Query historical job records and resource statistics via sacct.

pub mod sacct;
pub mod types;

pub use sacct::{JobDatabase, Sacct, SacctError};
pub use types::{JobRecord, JobState, JobStats, StepStats};
