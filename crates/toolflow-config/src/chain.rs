use serde::{Deserialize, Serialize};
use toolflow_plan::RetryConfig;

/// Shared-state key the parallel-with-join strategy publishes into.
pub const DEFAULT_MERGED_RESULTS_KEY: &str = "merged_results";

/// Settings for the chain executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
  /// Backoff used by retry-with-backoff when a plan carries no retry config.
  pub default_retry: RetryConfig,
  /// Cap on concurrent invocations within one level. `None` is unbounded.
  pub max_concurrency: Option<usize>,
  /// Where parallel-with-join publishes successful outputs.
  pub merged_results_key: String,
}

impl Default for ChainConfig {
  fn default() -> Self {
    Self {
      default_retry: RetryConfig::default(),
      max_concurrency: None,
      merged_results_key: DEFAULT_MERGED_RESULTS_KEY.to_string(),
    }
  }
}
