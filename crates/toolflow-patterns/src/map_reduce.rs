use futures::future::join_all;
use serde_json::Value;
use toolflow_invoker::{Context, ToolInvoker};
use toolflow_plan::{InvokeOptions, ToolResult};
use tracing::debug;

/// Invoke `tool_name` once per input, all at once, and reduce the raw results.
///
/// Failures are handed to the reducer untouched; see [`crate::reducers`] for
/// the usual ways of folding them.
pub async fn map_reduce_tools<R>(
  invoker: &dyn ToolInvoker,
  tool_name: &str,
  inputs: Vec<Value>,
  ctx: &Context,
  reducer: impl FnOnce(&[ToolResult]) -> R,
) -> R {
  debug!(
    correlation_id = %ctx.correlation_id(),
    tool_name = %tool_name,
    inputs = inputs.len(),
    "map_reduce"
  );

  let options = InvokeOptions::default();
  let results = join_all(
    inputs
      .into_iter()
      .map(|input| invoker.invoke(tool_name, input, ctx, &options)),
  )
  .await;

  reducer(&results)
}

/// Invoke `tool_name` once per argument set, in batches of `max_concurrency`.
///
/// Without a limit (or with one at least as large as the input, or zero) every
/// invocation runs at once. Otherwise the input is split into consecutive
/// batches; a batch starts only after the previous one has fully settled, so
/// one slow invocation holds back the next batch. Results are in input order.
pub async fn fan_out(
  invoker: &dyn ToolInvoker,
  tool_name: &str,
  args_list: Vec<Value>,
  ctx: &Context,
  max_concurrency: Option<usize>,
) -> Vec<ToolResult> {
  let options = InvokeOptions::default();
  let batch_size = match max_concurrency {
    Some(limit) if limit > 0 && limit < args_list.len() => limit,
    _ => args_list.len().max(1),
  };

  let mut results = Vec::with_capacity(args_list.len());
  for (index, batch) in args_list.chunks(batch_size).enumerate() {
    debug!(
      correlation_id = %ctx.correlation_id(),
      tool_name = %tool_name,
      batch = index,
      size = batch.len(),
      "fan_out_batch"
    );
    let settled = join_all(
      batch
        .iter()
        .map(|args| invoker.invoke(tool_name, args.clone(), ctx, &options)),
    )
    .await;
    results.extend(settled);
  }

  results
}
