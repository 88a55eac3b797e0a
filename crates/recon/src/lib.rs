//! `berth-recon`: PRS/MDMS berth configuration reconciliation engine.
//!
//! Pure engine crate: receives fully materialized rows, returns classified
//! discrepancies, duplicate groups and summary statistics. No IO.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;

pub use config::ReconConfig;
pub use engine::{run, ReconInput, RunOptions};
pub use error::ReconError;
pub use filter::{DiscrepancyFilter, DuplicateFilter};
pub use model::{
    BerthNumber, Discrepancy, DiscrepancyKind, DuplicateGroup, DuplicateOrigin, DuplicateReport,
    JoinKey, MdmsRecord, PrsRecord, SummaryStatistics,
};
pub use report::{Envelope, ReconReport};
