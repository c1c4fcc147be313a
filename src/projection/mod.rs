//! Projection engine: occurrence matching, daily aggregation, and summaries

mod engine;
mod matcher;
mod records;
mod summary;

pub use engine::{ProjectionConfig, ProjectionEngine};
pub use matcher::{occurrence, Occurrence};
pub use records::{
    Bucket, DailyCashFlowRecord, Origin, PhaseInfo, ProjectionResult, TransactionDetail,
};
pub use summary::{summarize, ProjectionSummary};
