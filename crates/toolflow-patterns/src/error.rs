use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
  /// A pipeline stage failed; `stage` is 1-based.
  #[error("Pipeline failed at stage {stage} ({tool_name}): {message}")]
  PipelineFailed {
    stage: usize,
    tool_name: String,
    message: String,
  },
}
