//! Scheduling of a plan's steps.
//!
//! Every strategy fills the caller's [`StepResults`] as it goes, so partial
//! progress survives an escalated failure.

mod conditional;
mod parallel;
mod retry;
mod sequential;

use toolflow_config::ChainConfig;
use toolflow_invoker::{Context, ToolInvoker};
use toolflow_plan::{ExecutionStrategy, Plan, StepResults};

use crate::error::OrchestrationError;

/// Everything a strategy needs for one chain execution.
pub(crate) struct Run<'a> {
  pub plan: &'a Plan,
  pub ctx: &'a Context,
  pub invoker: &'a dyn ToolInvoker,
  pub config: &'a ChainConfig,
}

impl Run<'_> {
  pub(crate) async fn execute(&self, results: &mut StepResults) -> Result<(), OrchestrationError> {
    match self.plan.strategy {
      ExecutionStrategy::Sequential => sequential::execute(self, results).await,
      ExecutionStrategy::Parallel => parallel::execute(self, results).await,
      ExecutionStrategy::ParallelWithJoin => parallel::execute_with_join(self, results).await,
      ExecutionStrategy::Conditional => conditional::execute(self, results).await,
      ExecutionStrategy::RetryWithBackoff => retry::execute(self, results).await,
    }
  }
}
