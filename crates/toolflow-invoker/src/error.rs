use thiserror::Error;

/// Errors a tool handler (or the registry on its behalf) can report.
///
/// Every variant is converted into a failed `ToolResult`; none of them
/// escapes `ToolInvoker::invoke`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
  /// The tool ran and reported a failure.
  #[error("{0}")]
  Failed(String),

  /// The arguments did not have the shape the tool expects.
  #[error("invalid arguments: {0}")]
  InvalidArguments(String),

  /// No handler is registered under this name.
  #[error("unknown tool: {0}")]
  UnknownTool(String),

  /// The invocation exceeded `InvokeOptions::timeout_ms`.
  #[error("tool '{tool_name}' timed out after {timeout_ms}ms")]
  Timeout { tool_name: String, timeout_ms: u64 },
}

impl ToolError {
  pub fn failed(message: impl Into<String>) -> Self {
    ToolError::Failed(message.into())
  }
}
