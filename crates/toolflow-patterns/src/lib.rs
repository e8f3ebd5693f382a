//! Toolflow Patterns
//!
//! Reusable async combinators built directly on [`ToolInvoker`], for callers
//! that need one pattern without authoring a full plan.
//!
//! Every combinator borrows the invoker and the request [`Context`]. Groups of
//! invocations are polled concurrently on the current task; a group is a join
//! barrier except for [`race_tools`], which resolves on the first success.
//!
//! [`ToolInvoker`]: toolflow_invoker::ToolInvoker
//! [`Context`]: toolflow_invoker::Context

mod branch;
mod error;
mod map_reduce;
mod pipeline;
mod race;
pub mod reducers;
mod resilience;

pub use branch::{branch_on_condition, scatter_gather_tools};
pub use error::PatternError;
pub use map_reduce::{fan_out, map_reduce_tools};
pub use pipeline::{PipelineStage, pipeline_tools, waterfall_tools};
pub use race::race_tools;
pub use resilience::{fallback_tool, retry_tool, retry_tool_with_options};
