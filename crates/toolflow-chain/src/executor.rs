//! Chain executor implementation.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use toolflow_config::ChainConfig;
use toolflow_invoker::{Context, InvocationStatus, ToolInvoker};
use toolflow_plan::{ChainResult, ChainSummary, InvokeOptions, OnError, Plan, StepResults};
use toolflow_resolver::{ResolveError, validate_plan};
use tracing::{error, info, instrument, warn};

use crate::error::OrchestrationError;
use crate::strategy::Run;

/// Top-level entry point for executing plans.
///
/// Owns the invoker every step is dispatched through and the engine settings.
/// One executor can run any number of plans, concurrently or not; all
/// per-request state lives in the [`Context`] passed to [`execute_chain`].
///
/// [`execute_chain`]: ChainExecutor::execute_chain
#[derive(Clone)]
pub struct ChainExecutor {
  invoker: Arc<dyn ToolInvoker>,
  config: ChainConfig,
}

impl ChainExecutor {
  pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
    Self {
      invoker,
      config: ChainConfig::default(),
    }
  }

  pub fn with_config(mut self, config: ChainConfig) -> Self {
    self.config = config;
    self
  }

  pub fn config(&self) -> &ChainConfig {
    &self.config
  }

  /// Check a plan against this executor's invoker without running it.
  pub fn validate(&self, plan: &Plan) -> Result<(), ResolveError> {
    validate_plan(plan, self.invoker.as_ref())
  }

  /// Execute a plan.
  ///
  /// Never fails: an error that ends the strategy early is reported in the
  /// returned [`ChainResult`] alongside the results recorded so far, unless the
  /// plan's fallback tool recovers it.
  ///
  /// Errors that can reach the fallback policy are a dependency cycle and an
  /// escalated step failure. An unknown strategy name never gets this far: it
  /// is rejected when the plan definition is compiled, since
  /// [`ExecutionStrategy`](toolflow_plan::ExecutionStrategy) is a closed enum.
  #[instrument(
    name = "execute_chain",
    skip(self, plan, ctx),
    fields(
      correlation_id = %ctx.correlation_id(),
      strategy = %plan.strategy,
    )
  )]
  pub async fn execute_chain(&self, plan: &Plan, ctx: &Context) -> ChainResult {
    let started = Instant::now();
    let log_start = ctx.log_len();

    info!(
      correlation_id = %ctx.correlation_id(),
      strategy = %plan.strategy,
      steps = plan.steps.len(),
      on_error = ?plan.on_error,
      "chain_started"
    );

    let run = Run {
      plan,
      ctx,
      invoker: self.invoker.as_ref(),
      config: &self.config,
    };
    let mut results = StepResults::new();
    let outcome = run.execute(&mut results).await;

    let error = match outcome {
      Ok(()) => None,
      Err(e) => {
        error!(
          correlation_id = %ctx.correlation_id(),
          error = %e,
          "chain_failed"
        );
        if let Some(recovered) = self.try_fallback(plan, ctx, &e, started, log_start).await {
          return recovered;
        }
        Some(e.to_string())
      }
    };

    let result = summarize(plan, ctx, results, error, started, log_start);
    info!(
      correlation_id = %ctx.correlation_id(),
      success = result.success,
      successful_steps = result.summary.successful_steps,
      failed_steps = result.summary.failed_steps,
      skipped_steps = result.summary.skipped_steps,
      duration_ms = result.summary.total_duration_ms,
      "chain_completed"
    );
    result
  }

  /// Run the plan's fallback tool after an escalated error. Returns a result
  /// only when the fallback succeeded.
  async fn try_fallback(
    &self,
    plan: &Plan,
    ctx: &Context,
    cause: &OrchestrationError,
    started: Instant,
    log_start: usize,
  ) -> Option<ChainResult> {
    if plan.on_error != OnError::Fallback {
      return None;
    }
    let fallback = plan.fallback_tool.as_deref()?;

    warn!(
      correlation_id = %ctx.correlation_id(),
      fallback_tool = %fallback,
      cause = %cause,
      "chain_fallback"
    );

    let args = plan.fallback_args.clone().unwrap_or(Value::Null);
    let result = self
      .invoker
      .invoke(fallback, args, ctx, &InvokeOptions::default())
      .await;

    if !result.success {
      error!(
        correlation_id = %ctx.correlation_id(),
        fallback_tool = %fallback,
        error = %result.error_message(),
        "fallback_failed"
      );
      return None;
    }

    info!(
      correlation_id = %ctx.correlation_id(),
      fallback_tool = %fallback,
      "chain_completed"
    );
    let final_output = result.data.clone();
    let mut step_results = StepResults::new();
    step_results.insert("fallback", result);

    Some(ChainResult {
      success: true,
      step_results,
      final_output,
      error: None,
      summary: ChainSummary {
        total_steps: 1,
        successful_steps: 1,
        failed_steps: 0,
        skipped_steps: ctx.count_since(log_start, InvocationStatus::Skipped),
        total_duration_ms: started.elapsed().as_millis() as u64,
      },
    })
  }
}

fn summarize(
  plan: &Plan,
  ctx: &Context,
  step_results: StepResults,
  error: Option<String>,
  started: Instant,
  log_start: usize,
) -> ChainResult {
  // Last step in declaration order that succeeded.
  let final_output = plan
    .steps
    .iter()
    .rev()
    .filter_map(|step| step_results.get(&step.id))
    .find(|result| result.success)
    .and_then(|result| result.data.clone());

  let summary = ChainSummary {
    total_steps: plan.steps.len(),
    successful_steps: step_results.successful_count(),
    failed_steps: step_results.failed_count(),
    skipped_steps: ctx.count_since(log_start, InvocationStatus::Skipped),
    total_duration_ms: started.elapsed().as_millis() as u64,
  };

  ChainResult {
    success: error.is_none() && summary.failed_steps == 0,
    step_results,
    final_output,
    error,
    summary,
  }
}
