use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use toolflow_plan::{Step, StepResults, ToolResult};
use toolflow_resolver::levels;
use tracing::debug;

use super::Run;
use crate::error::OrchestrationError;
use crate::invoke::{dependencies_met, invoke_step, record_unmet, settle, step_args};

/// Run the plan level by level, dispatching each level concurrently.
///
/// A level is a barrier: every step of it settles and is recorded before the
/// error policy is applied and before the next level starts.
pub(super) async fn execute(run: &Run<'_>, results: &mut StepResults) -> Result<(), OrchestrationError> {
  let levels = levels(&run.plan.steps)?;

  for (index, level) in levels.iter().enumerate() {
    debug!(
      correlation_id = %run.ctx.correlation_id(),
      level = index,
      steps = level.len(),
      "level_dispatched"
    );

    let settled = dispatch_level(run, level, results).await;

    let mut escalated = None;
    for (step, outcome) in level.iter().zip(settled) {
      match outcome {
        None => record_unmet(step, results, run.ctx),
        Some(result) => {
          if let Err(e) = settle(step, result, run.plan.on_error, results, run.ctx)
            && escalated.is_none()
          {
            escalated = Some(e);
          }
        }
      }
    }

    if let Some(e) = escalated {
      return Err(e);
    }
  }

  Ok(())
}

/// [`execute`], then publish the data of every successful step to the shared
/// state under the configured key, in result order.
pub(super) async fn execute_with_join(
  run: &Run<'_>,
  results: &mut StepResults,
) -> Result<(), OrchestrationError> {
  execute(run, results).await?;

  let merged: Vec<Value> = results
    .iter()
    .filter(|(_, result)| result.success)
    .map(|(_, result)| result.data_or_null())
    .collect();

  debug!(
    correlation_id = %run.ctx.correlation_id(),
    key = %run.config.merged_results_key,
    count = merged.len(),
    "results_merged"
  );
  run
    .ctx
    .set_state(run.config.merged_results_key.clone(), Value::Array(merged));

  Ok(())
}

/// Invoke every step of a level whose dependencies are met. `None` marks a
/// step that was not dispatched. Outcomes are in level order.
async fn dispatch_level(
  run: &Run<'_>,
  level: &[&Step],
  results: &StepResults,
) -> Vec<Option<ToolResult>> {
  let calls: Vec<BoxFuture<'_, Option<ToolResult>>> = level
    .iter()
    .map(|step| {
      if dependencies_met(step, results) {
        let args = step_args(step, results);
        invoke_step(run.invoker, step, args, run.ctx).map(Some).boxed()
      } else {
        future::ready(None).boxed()
      }
    })
    .collect();

  match run.config.max_concurrency {
    Some(limit) if limit > 0 => stream::iter(calls).buffered(limit).collect().await,
    _ => future::join_all(calls).await,
  }
}
