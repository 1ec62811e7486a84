//! Job summary core for jobsum.
//!
//! Resolves user-supplied job identifiers, merges accounting-database
//! records with metrics-store fallback values into one immutable
//! [`JobSummary`], and renders the bordered text report.

pub mod ident;
pub mod report;
pub mod summary;

use jobsum_slurm::SacctError;
use thiserror::Error;

pub use ident::{JobId, ResolvedJob, resolve};
pub use report::render;
pub use summary::{JobSummary, LustreUsage, summarize};

/// Fatal errors while building a report.
///
/// Metrics absence is never an error; only identifier and accounting
/// failures abort the report.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Invalid job identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Job {0} not found")]
    JobNotFound(String),
    #[error(transparent)]
    Accounting(#[from] SacctError),
}
