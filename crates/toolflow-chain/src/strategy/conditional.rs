use toolflow_invoker::ExecutionLogEntry;
use toolflow_plan::StepResults;
use tracing::debug;

use super::Run;
use crate::error::OrchestrationError;
use crate::invoke::{dependencies_met, invoke_step, record_unmet, settle, step_args};

/// Sequential execution where a step whose condition is false is left out
/// entirely: it gets no step result, only a skipped log entry.
pub(super) async fn execute(run: &Run<'_>, results: &mut StepResults) -> Result<(), OrchestrationError> {
  for step in &run.plan.steps {
    if let Some(condition) = &step.condition
      && !run.ctx.with_shared_state(|state| condition(state))
    {
      debug!(
        correlation_id = %run.ctx.correlation_id(),
        step_id = %step.id,
        tool_name = %step.tool_name,
        "step_condition_false"
      );
      run.ctx.record(ExecutionLogEntry::skipped(&step.tool_name));
      continue;
    }

    if !dependencies_met(step, results) {
      record_unmet(step, results, run.ctx);
      continue;
    }

    let args = step_args(step, results);
    let result = invoke_step(run.invoker, step, args, run.ctx).await;
    settle(step, result, run.plan.on_error, results, run.ctx)?;
  }

  Ok(())
}
