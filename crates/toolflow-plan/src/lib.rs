//! Toolflow Plan
//!
//! Plain data types shared by every other toolflow crate:
//! - [`Step`] and [`Plan`]: the declarative description of a chain of tool invocations
//! - [`ToolResult`]: the uniform success/data/error contract every tool returns
//! - [`ChainResult`]: the aggregated outcome of executing a plan
//!
//! Nothing in this crate performs work. Plans are built by the caller and are
//! never mutated by the engine.

mod error;
mod plan;
mod result;
mod step;

pub use error::ExecutionStrategyError;
pub use plan::{ExecutionStrategy, OnError, Plan, RetryConfig};
pub use result::{ChainResult, ChainSummary, StepResults, ToolResult};
pub use step::{Condition, InvokeOptions, SharedState, Step, StepId, Transform};
