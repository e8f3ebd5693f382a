use serde_json::Value;
use toolflow_invoker::{Context, ToolInvoker};
use toolflow_plan::{InvokeOptions, RetryConfig, ToolResult};
use tracing::{debug, warn};

/// Invoke a tool until it succeeds or `retry.max_retries` retries are spent.
///
/// Returns the first success, or the last failure.
pub async fn retry_tool(
  invoker: &dyn ToolInvoker,
  tool_name: &str,
  args: Value,
  ctx: &Context,
  retry: &RetryConfig,
) -> ToolResult {
  retry_tool_with_options(invoker, tool_name, args, ctx, &InvokeOptions::default(), retry).await
}

/// [`retry_tool`] with explicit per-invocation options.
///
/// After failed attempt `n` the task sleeps `retry.delay_for_attempt(n)`; the
/// sleep is not interrupted.
pub async fn retry_tool_with_options(
  invoker: &dyn ToolInvoker,
  tool_name: &str,
  args: Value,
  ctx: &Context,
  options: &InvokeOptions,
  retry: &RetryConfig,
) -> ToolResult {
  let max_attempts = retry.max_attempts();
  let mut attempt = 1;

  loop {
    let result = invoker.invoke(tool_name, args.clone(), ctx, options).await;
    if result.success || attempt >= max_attempts {
      if !result.success {
        warn!(
          correlation_id = %ctx.correlation_id(),
          tool_name = %tool_name,
          attempts = attempt,
          error = %result.error_message(),
          "retries_exhausted"
        );
      }
      return result;
    }

    let delay = retry.delay_for_attempt(attempt);
    debug!(
      correlation_id = %ctx.correlation_id(),
      tool_name = %tool_name,
      attempt,
      delay_ms = delay.as_millis() as u64,
      error = %result.error_message(),
      "retrying"
    );
    tokio::time::sleep(delay).await;
    attempt += 1;
  }
}

/// Invoke `primary`; if it fails, invoke `fallback` with the same arguments.
pub async fn fallback_tool(
  invoker: &dyn ToolInvoker,
  primary: &str,
  fallback: &str,
  args: Value,
  ctx: &Context,
) -> ToolResult {
  let options = InvokeOptions::default();
  let result = invoker.invoke(primary, args.clone(), ctx, &options).await;
  if result.success {
    return result;
  }

  warn!(
    correlation_id = %ctx.correlation_id(),
    primary = %primary,
    fallback = %fallback,
    error = %result.error_message(),
    "primary_failed_using_fallback"
  );
  invoker.invoke(fallback, args, ctx, &options).await
}
