use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a step, unique within a plan.
pub type StepId = String;

/// Request-scoped key/value state visible to conditions and tools.
pub type SharedState = serde_json::Map<String, Value>;

/// Maps the output of a step's first dependency to the step's arguments.
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Predicate over the shared state deciding whether a step runs.
pub type Condition = Arc<dyn Fn(&SharedState) -> bool + Send + Sync>;

/// Per-invocation options handed to the invoker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeOptions {
  /// Upper bound for a single invocation, enforced by the invoker.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
  /// Tool that issued this invocation, if it is nested.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_tool_name: Option<String>,
  /// Nesting depth; top-level invocations are depth 0.
  #[serde(default)]
  pub depth: u32,
}

impl InvokeOptions {
  pub fn with_timeout_ms(timeout_ms: u64) -> Self {
    Self {
      timeout_ms: Some(timeout_ms),
      ..Self::default()
    }
  }

  /// Options for a tool invoked from inside another tool's handler.
  pub fn nested_under(parent_tool_name: impl Into<String>, parent_depth: u32) -> Self {
    Self {
      timeout_ms: None,
      parent_tool_name: Some(parent_tool_name.into()),
      depth: parent_depth + 1,
    }
  }
}

/// One named tool invocation inside a plan.
#[derive(Clone)]
pub struct Step {
  pub id: StepId,
  pub tool_name: String,
  pub args: Value,
  /// Steps that must have succeeded before this one runs. Only the first
  /// entry feeds `transform`; the rest gate ordering only.
  pub dependencies: Vec<StepId>,
  pub transform: Option<Transform>,
  pub options: InvokeOptions,
  pub condition: Option<Condition>,
}

impl Step {
  pub fn new(id: impl Into<StepId>, tool_name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      tool_name: tool_name.into(),
      args: Value::Null,
      dependencies: Vec::new(),
      transform: None,
      options: InvokeOptions::default(),
      condition: None,
    }
  }

  pub fn with_args(mut self, args: Value) -> Self {
    self.args = args;
    self
  }

  pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<StepId>,
  {
    self.dependencies = dependencies.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_transform<F>(mut self, transform: F) -> Self
  where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
  {
    self.transform = Some(Arc::new(transform));
    self
  }

  pub fn with_condition<F>(mut self, condition: F) -> Self
  where
    F: Fn(&SharedState) -> bool + Send + Sync + 'static,
  {
    self.condition = Some(Arc::new(condition));
    self
  }

  pub fn with_options(mut self, options: InvokeOptions) -> Self {
    self.options = options;
    self
  }

  /// The dependency whose output is piped through `transform`.
  pub fn primary_dependency(&self) -> Option<&str> {
    self.dependencies.first().map(String::as_str)
  }
}

impl fmt::Debug for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Step")
      .field("id", &self.id)
      .field("tool_name", &self.tool_name)
      .field("args", &self.args)
      .field("dependencies", &self.dependencies)
      .field("transform", &self.transform.is_some())
      .field("options", &self.options)
      .field("condition", &self.condition.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_builder_sets_fields() {
    let step = Step::new("b", "transform")
      .with_args(json!({"x": 1}))
      .depends_on(["a", "c"])
      .with_transform(|prior| json!({ "wrapped": prior }));

    assert_eq!(step.id, "b");
    assert_eq!(step.tool_name, "transform");
    assert_eq!(step.dependencies, vec!["a".to_string(), "c".to_string()]);
    assert_eq!(step.primary_dependency(), Some("a"));

    let transform = step.transform.as_ref().unwrap();
    assert_eq!(transform(&json!(3)), json!({"wrapped": 3}));
  }

  #[test]
  fn test_nested_options_increment_depth() {
    let options = InvokeOptions::nested_under("outer", 2);
    assert_eq!(options.depth, 3);
    assert_eq!(options.parent_tool_name.as_deref(), Some("outer"));
    assert_eq!(options.timeout_ms, None);
  }

  #[test]
  fn test_debug_hides_closures() {
    let step = Step::new("a", "fetch").with_condition(|_| true);
    let rendered = format!("{:?}", step);
    assert!(rendered.contains("condition: true"));
    assert!(rendered.contains("transform: false"));
  }
}
