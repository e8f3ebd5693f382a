use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExecutionStrategyError;
use crate::step::Step;

/// How the steps of a plan are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStrategy {
  /// Declaration order, one step at a time.
  Sequential,
  /// Dependency levels, each level dispatched concurrently.
  Parallel,
  /// `Parallel`, then successful outputs published to the shared state.
  ParallelWithJoin,
  /// Declaration order, steps gated by their condition.
  Conditional,
  /// Declaration order, each step retried with exponential backoff.
  RetryWithBackoff,
}

impl ExecutionStrategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExecutionStrategy::Sequential => "sequential",
      ExecutionStrategy::Parallel => "parallel",
      ExecutionStrategy::ParallelWithJoin => "parallel-with-join",
      ExecutionStrategy::Conditional => "conditional",
      ExecutionStrategy::RetryWithBackoff => "retry-with-backoff",
    }
  }
}

impl fmt::Display for ExecutionStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ExecutionStrategy {
  type Err = ExecutionStrategyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "sequential" => Ok(ExecutionStrategy::Sequential),
      "parallel" => Ok(ExecutionStrategy::Parallel),
      "parallel-with-join" => Ok(ExecutionStrategy::ParallelWithJoin),
      "conditional" => Ok(ExecutionStrategy::Conditional),
      "retry-with-backoff" => Ok(ExecutionStrategy::RetryWithBackoff),
      other => Err(ExecutionStrategyError(other.to_string())),
    }
  }
}

/// What happens when a step invocation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
  /// Stop the chain at the first failed invocation.
  #[default]
  Abort,
  /// Record the failure and keep going.
  Skip,
  /// Stop like `Abort`, then run the plan's fallback tool in place of the chain.
  Fallback,
}

impl OnError {
  /// Whether a failed invocation ends the chain.
  pub fn escalates(&self) -> bool {
    matches!(self, OnError::Abort | OnError::Fallback)
  }
}

/// Exponential backoff settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
  pub max_retries: u32,
  pub initial_delay_ms: u64,
  pub max_delay_ms: u64,
  pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_retries: 3,
      initial_delay_ms: 1000,
      max_delay_ms: 10_000,
      backoff_multiplier: 2.0,
    }
  }
}

impl RetryConfig {
  /// Total number of attempts, including the first one.
  pub fn max_attempts(&self) -> u32 {
    self.max_retries.saturating_add(1)
  }

  /// Sleep before the next attempt, after `attempt` (1-based) failed.
  pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1) as i32;
    let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
    let capped = delay.min(self.max_delay_ms as f64).max(0.0);
    Duration::from_millis(capped as u64)
  }
}

/// A declarative chain of tool invocations.
#[derive(Debug, Clone)]
pub struct Plan {
  pub strategy: ExecutionStrategy,
  pub steps: Vec<Step>,
  pub on_error: OnError,
  pub fallback_tool: Option<String>,
  pub fallback_args: Option<Value>,
  pub retry_config: Option<RetryConfig>,
}

impl Plan {
  pub fn new(strategy: ExecutionStrategy, steps: Vec<Step>) -> Self {
    Self {
      strategy,
      steps,
      on_error: OnError::default(),
      fallback_tool: None,
      fallback_args: None,
      retry_config: None,
    }
  }

  pub fn on_error(mut self, on_error: OnError) -> Self {
    self.on_error = on_error;
    self
  }

  pub fn with_fallback(mut self, tool_name: impl Into<String>, args: Value) -> Self {
    self.fallback_tool = Some(tool_name.into());
    self.fallback_args = Some(args);
    self
  }

  pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
    self.retry_config = Some(retry_config);
    self
  }

  /// Get a step by ID.
  pub fn get_step(&self, step_id: &str) -> Option<&Step> {
    self.steps.iter().find(|s| s.id == step_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_strategy_round_trips_through_str() {
    for strategy in [
      ExecutionStrategy::Sequential,
      ExecutionStrategy::Parallel,
      ExecutionStrategy::ParallelWithJoin,
      ExecutionStrategy::Conditional,
      ExecutionStrategy::RetryWithBackoff,
    ] {
      assert_eq!(strategy.as_str().parse::<ExecutionStrategy>(), Ok(strategy));
    }
  }

  #[test]
  fn test_unknown_strategy_is_rejected() {
    let err = "round-robin".parse::<ExecutionStrategy>().unwrap_err();
    assert_eq!(err.to_string(), "unknown execution strategy: round-robin");
  }

  #[test]
  fn test_strategy_serde_names() {
    let value = serde_json::to_value(ExecutionStrategy::ParallelWithJoin).unwrap();
    assert_eq!(value, serde_json::json!("parallel-with-join"));
    let on_error: OnError = serde_json::from_value(serde_json::json!("skip")).unwrap();
    assert_eq!(on_error, OnError::Skip);
  }

  #[test]
  fn test_backoff_doubles_and_caps() {
    let config = RetryConfig::default();
    assert_eq!(config.max_attempts(), 4);
    assert_eq!(config.delay_for_attempt(1), Duration::from_millis(1000));
    assert_eq!(config.delay_for_attempt(2), Duration::from_millis(2000));
    assert_eq!(config.delay_for_attempt(3), Duration::from_millis(4000));
    assert_eq!(config.delay_for_attempt(5), Duration::from_millis(10_000));
  }

  #[test]
  fn test_retry_config_partial_deserialize_uses_defaults() {
    let config: RetryConfig =
      serde_json::from_value(serde_json::json!({ "max_retries": 1 })).unwrap();
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.initial_delay_ms, 1000);
    assert_eq!(config.backoff_multiplier, 2.0);
  }
}
