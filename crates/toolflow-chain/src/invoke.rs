//! Step-level helpers shared by every strategy.

use serde_json::Value;
use toolflow_invoker::{Context, ToolInvoker};
use toolflow_plan::{OnError, Step, StepResults, ToolResult};
use tracing::{debug, warn};

use crate::error::OrchestrationError;

/// Error recorded for a step whose dependencies did not all succeed.
pub const DEPENDENCIES_NOT_MET: &str = "Dependencies not met";

/// Whether every dependency of `step` has a successful result.
pub(crate) fn dependencies_met(step: &Step, results: &StepResults) -> bool {
  step.dependencies.iter().all(|dep| results.succeeded(dep))
}

/// Arguments for `step`: its transform applied to the first dependency's
/// output, or its static args.
pub(crate) fn step_args(step: &Step, results: &StepResults) -> Value {
  match &step.transform {
    Some(transform) => {
      let prior = step
        .primary_dependency()
        .and_then(|dep| results.get(dep))
        .map(ToolResult::data_or_null)
        .unwrap_or(Value::Null);
      transform(&prior)
    }
    None => step.args.clone(),
  }
}

pub(crate) async fn invoke_step(
  invoker: &dyn ToolInvoker,
  step: &Step,
  args: Value,
  ctx: &Context,
) -> ToolResult {
  debug!(
    correlation_id = %ctx.correlation_id(),
    step_id = %step.id,
    tool_name = %step.tool_name,
    "step_dispatched"
  );
  invoker.invoke(&step.tool_name, args, ctx, &step.options).await
}

/// Record a dependency skip. Never escalates.
pub(crate) fn record_unmet(step: &Step, results: &mut StepResults, ctx: &Context) {
  debug!(
    correlation_id = %ctx.correlation_id(),
    step_id = %step.id,
    dependencies = ?step.dependencies,
    "dependencies_not_met"
  );
  results.insert(step.id.clone(), ToolResult::err(DEPENDENCIES_NOT_MET));
}

/// Record a settled invocation, then apply the error policy to it.
pub(crate) fn settle(
  step: &Step,
  result: ToolResult,
  on_error: OnError,
  results: &mut StepResults,
  ctx: &Context,
) -> Result<(), OrchestrationError> {
  let failure = (!result.success).then(|| result.error_message().to_string());
  results.insert(step.id.clone(), result);

  let Some(message) = failure else {
    return Ok(());
  };

  warn!(
    correlation_id = %ctx.correlation_id(),
    step_id = %step.id,
    tool_name = %step.tool_name,
    error = %message,
    on_error = ?on_error,
    "step_failed"
  );

  if on_error.escalates() {
    return Err(OrchestrationError::StepFailed {
      step_id: step.id.clone(),
      message,
    });
  }
  Ok(())
}
