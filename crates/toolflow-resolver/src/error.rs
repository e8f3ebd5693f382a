use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
  /// No remaining step has all of its dependencies levelled.
  #[error("circular dependency detected among steps: {}", steps.join(", "))]
  CircularDependency { steps: Vec<String> },

  #[error("duplicate step id: {0}")]
  DuplicateStepId(String),

  #[error("step '{step_id}' depends on unknown step '{dependency}'")]
  UnknownDependency { step_id: String, dependency: String },

  #[error("step '{step_id}' references unknown tool '{tool_name}'")]
  UnknownTool { step_id: String, tool_name: String },
}
