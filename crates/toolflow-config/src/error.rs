use std::path::PathBuf;

use thiserror::Error;
use toolflow_plan::ExecutionStrategyError;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read plan file {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse plan definition: {0}")]
  Parse(#[from] serde_json::Error),

  #[error(transparent)]
  Strategy(#[from] ExecutionStrategyError),

  #[error("step '{step_id}' has an invalid JSON pointer: {pointer:?}")]
  InvalidPointer { step_id: String, pointer: String },
}
