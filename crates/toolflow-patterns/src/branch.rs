use std::collections::HashMap;

use futures::future::join_all;
use serde_json::Value;
use toolflow_invoker::{Context, Invocation, ToolInvoker};
use toolflow_plan::{InvokeOptions, SharedState, ToolResult};
use tracing::debug;

/// Evaluate `predicate` once against the shared state and invoke exactly one
/// of the two tools with `args`.
pub async fn branch_on_condition(
  invoker: &dyn ToolInvoker,
  predicate: impl FnOnce(&SharedState) -> bool,
  tool_if_true: &str,
  tool_if_false: &str,
  args: Value,
  ctx: &Context,
) -> ToolResult {
  let taken = ctx.with_shared_state(predicate);
  let tool_name = if taken { tool_if_true } else { tool_if_false };

  debug!(
    correlation_id = %ctx.correlation_id(),
    condition = taken,
    tool_name = %tool_name,
    "branch_taken"
  );

  invoker
    .invoke(tool_name, args, ctx, &InvokeOptions::default())
    .await
}

/// Invoke a heterogeneous set of tools at once and gather the results by
/// tool name.
///
/// Results are keyed by tool name only: when a name appears more than once,
/// the result of the later entry replaces the earlier one.
pub async fn scatter_gather_tools<R>(
  invoker: &dyn ToolInvoker,
  invocations: &[Invocation],
  ctx: &Context,
  gatherer: impl FnOnce(HashMap<String, ToolResult>) -> R,
) -> R {
  let options = InvokeOptions::default();
  let results = join_all(
    invocations
      .iter()
      .map(|i| invoker.invoke(&i.tool_name, i.args.clone(), ctx, &options)),
  )
  .await;

  let mut gathered = HashMap::with_capacity(invocations.len());
  for (invocation, result) in invocations.iter().zip(results) {
    gathered.insert(invocation.tool_name.clone(), result);
  }

  gatherer(gathered)
}
