use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use toolflow_invoker::{Context, Invocation, ToolInvoker};
use toolflow_plan::{InvokeOptions, ToolResult};
use tracing::debug;

/// Invoke every tool at once and return the first successful result.
///
/// A failed result does not end the race; the remaining competitors keep
/// going. Once a winner is found the competitors still in flight are dropped.
/// If every competitor fails, the errors are reported in input order.
pub async fn race_tools(
  invoker: &dyn ToolInvoker,
  invocations: &[Invocation],
  ctx: &Context,
) -> ToolResult {
  let options = InvokeOptions::default();
  let mut in_flight: FuturesUnordered<_> = invocations
    .iter()
    .enumerate()
    .map(|(index, i)| {
      invoker
        .invoke(&i.tool_name, i.args.clone(), ctx, &options)
        .map(move |result| (index, result))
    })
    .collect();

  let mut errors: Vec<Option<String>> = vec![None; invocations.len()];
  while let Some((index, result)) = in_flight.next().await {
    if result.success {
      debug!(
        correlation_id = %ctx.correlation_id(),
        winner = %invocations[index].tool_name,
        "race_won"
      );
      return result;
    }
    errors[index] = Some(format!(
      "{}: {}",
      invocations[index].tool_name,
      result.error_message()
    ));
  }

  let errors: Vec<String> = errors.into_iter().flatten().collect();
  ToolResult::err(format!("All tools failed in race: {}", errors.join("; ")))
}
