//! Batch orchestration and deferred persistence.

mod batch;
mod unit_of_work;

pub use batch::{BatchReport, InstanceOutcome, InstanceReport, Pipeline, FAILURE_MESSAGE};
pub use unit_of_work::{CommitSummary, UnitOfWork};
