use toolflow_patterns::retry_tool_with_options;
use toolflow_plan::StepResults;
use tracing::debug;

use super::Run;
use crate::error::OrchestrationError;
use crate::invoke::{dependencies_met, record_unmet, settle, step_args};

/// Sequential execution with every step retried under exponential backoff.
///
/// The plan's retry config wins over the executor default. The error policy
/// applies only once a step's attempts are exhausted.
pub(super) async fn execute(run: &Run<'_>, results: &mut StepResults) -> Result<(), OrchestrationError> {
  let retry = run
    .plan
    .retry_config
    .as_ref()
    .unwrap_or(&run.config.default_retry);

  for step in &run.plan.steps {
    if !dependencies_met(step, results) {
      record_unmet(step, results, run.ctx);
      continue;
    }

    debug!(
      correlation_id = %run.ctx.correlation_id(),
      step_id = %step.id,
      tool_name = %step.tool_name,
      max_attempts = retry.max_attempts(),
      "step_dispatched"
    );
    let args = step_args(step, results);
    let result = retry_tool_with_options(
      run.invoker,
      &step.tool_name,
      args,
      run.ctx,
      &step.options,
      retry,
    )
    .await;
    settle(step, result, run.plan.on_error, results, run.ctx)?;
  }

  Ok(())
}
