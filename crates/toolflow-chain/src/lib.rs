//! Toolflow Chain
//!
//! Executes a [`toolflow_plan::Plan`] against a [`toolflow_invoker::ToolInvoker`]:
//! - [`ChainExecutor`]: the entry point; picks the strategy, aggregates step
//!   results into a [`toolflow_plan::ChainResult`] and applies the plan's
//!   fallback policy
//! - `strategy`: sequential, parallel, parallel-with-join, conditional and
//!   retry-with-backoff scheduling of a plan's steps

mod error;
mod executor;
mod invoke;
mod strategy;

pub use error::OrchestrationError;
pub use executor::ChainExecutor;
pub use invoke::DEPENDENCIES_NOT_MET;
