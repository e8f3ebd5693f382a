use thiserror::Error;
use toolflow_resolver::ResolveError;

/// Errors that end a strategy before every step has run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
  /// The plan's dependency graph could not be levelled.
  #[error(transparent)]
  Resolve(#[from] ResolveError),

  /// A step invocation failed under an escalating error policy.
  #[error("Step {step_id} failed: {message}")]
  StepFailed { step_id: String, message: String },
}
