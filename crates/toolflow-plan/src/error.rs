use thiserror::Error;

/// Raised when a plan names an execution strategy that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown execution strategy: {0}")]
pub struct ExecutionStrategyError(pub String);
