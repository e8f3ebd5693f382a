use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolflow_plan::{InvokeOptions, ToolResult};

use crate::context::Context;

/// A tool name paired with its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
  pub tool_name: String,
  #[serde(default)]
  pub args: Value,
}

impl Invocation {
  pub fn new(tool_name: impl Into<String>, args: Value) -> Self {
    Self {
      tool_name: tool_name.into(),
      args,
    }
  }
}

/// Executes named tools on behalf of the orchestrator.
///
/// Implementations never fail: every problem, including an unknown tool name
/// or a timeout, is reported as a failed [`ToolResult`].
#[async_trait]
pub trait ToolInvoker: Send + Sync {
  /// Invoke one tool.
  async fn invoke(
    &self,
    tool_name: &str,
    args: Value,
    ctx: &Context,
    options: &InvokeOptions,
  ) -> ToolResult;

  /// Invoke several tools concurrently. Results are in input order.
  async fn batch_invoke(&self, invocations: &[Invocation], ctx: &Context) -> Vec<ToolResult> {
    let options = InvokeOptions::default();
    let calls = invocations
      .iter()
      .map(|invocation| self.invoke(&invocation.tool_name, invocation.args.clone(), ctx, &options));
    futures::future::join_all(calls).await
  }

  /// Whether a tool with this name can be invoked.
  fn contains(&self, tool_name: &str) -> bool;
}
