use toolflow_plan::StepResults;

use super::Run;
use crate::error::OrchestrationError;
use crate::invoke::{dependencies_met, invoke_step, record_unmet, settle, step_args};

/// Run steps one at a time in declaration order.
pub(super) async fn execute(run: &Run<'_>, results: &mut StepResults) -> Result<(), OrchestrationError> {
  for step in &run.plan.steps {
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
