//! Toolflow Invoker
//!
//! The seam between the orchestrator and the tools it runs:
//! - [`Context`]: request-scoped shared state, execution log and correlation id
//! - [`ToolInvoker`]: `invoke(name, args, ctx, options) -> ToolResult`, the only
//!   place where work happens
//! - [`ToolRegistry`]: a name → [`ToolHandler`] map built once at startup,
//!   enforcing per-invocation timeouts and recording the execution log

mod context;
mod error;
mod invoker;
mod registry;

pub use context::{Context, ExecutionLogEntry, InvocationStatus};
pub use error::ToolError;
pub use invoker::{Invocation, ToolInvoker};
pub use registry::{FnHandler, ToolHandler, ToolRegistry};
