use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolflow_plan::{ExecutionStrategy, InvokeOptions, OnError, Plan, RetryConfig, Step};

use crate::condition::ConditionDef;
use crate::error::ConfigError;
use crate::transform::TransformDef;

/// Serializable form of a [`Plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDef {
  /// Strategy name; validated when the plan is compiled.
  pub strategy: String,
  pub steps: Vec<StepDef>,
  #[serde(default, alias = "onError")]
  pub on_error: OnError,
  #[serde(default, alias = "fallbackTool", skip_serializing_if = "Option::is_none")]
  pub fallback_tool: Option<String>,
  #[serde(default, alias = "fallbackArgs", skip_serializing_if = "Option::is_none")]
  pub fallback_args: Option<Value>,
  #[serde(default, alias = "retryConfig", skip_serializing_if = "Option::is_none")]
  pub retry_config: Option<RetryConfig>,
}

/// Serializable form of a [`Step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub id: String,
  #[serde(alias = "toolName")]
  pub tool_name: String,
  #[serde(default)]
  pub args: Value,
  #[serde(default)]
  pub dependencies: Vec<String>,
  #[serde(default, alias = "timeoutMs", skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<ConditionDef>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub transform: Option<TransformDef>,
}

impl PlanDef {
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }

  /// Compile into an executable plan.
  pub fn into_plan(self) -> Result<Plan, ConfigError> {
    let strategy: ExecutionStrategy = self.strategy.parse()?;
    let steps = self
      .steps
      .into_iter()
      .map(StepDef::into_step)
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Plan {
      strategy,
      steps,
      on_error: self.on_error,
      fallback_tool: self.fallback_tool,
      fallback_args: self.fallback_args,
      retry_config: self.retry_config,
    })
  }
}

impl StepDef {
  pub fn into_step(self) -> Result<Step, ConfigError> {
    if let Some(transform @ TransformDef::Pointer { pointer }) = &self.transform
      && !transform.is_valid()
    {
      return Err(ConfigError::InvalidPointer {
        step_id: self.id.clone(),
        pointer: pointer.clone(),
      });
    }

    Ok(Step {
      id: self.id,
      tool_name: self.tool_name,
      args: self.args,
      dependencies: self.dependencies,
      transform: self.transform.map(TransformDef::compile),
      options: InvokeOptions {
        timeout_ms: self.timeout_ms,
        ..InvokeOptions::default()
      },
      condition: self.condition.map(ConditionDef::compile),
    })
  }
}

/// Read and compile a JSON plan file.
pub async fn load_plan(path: impl AsRef<Path>) -> Result<Plan, ConfigError> {
  let path = path.as_ref();
  let content = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
  PlanDef::from_json(&content)?.into_plan()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use toolflow_plan::SharedState;

  const PLAN: &str = r#"{
    "strategy": "conditional",
    "onError": "skip",
    "fallbackTool": "notify",
    "steps": [
      { "id": "a", "toolName": "fetch", "args": { "url": "https://example.com" } },
      {
        "id": "b",
        "tool_name": "summarize",
        "dependencies": ["a"],
        "timeout_ms": 250,
        "transform": { "type": "pointer", "pointer": "/body" },
        "condition": { "type": "exists", "key": "enabled" }
      }
    ]
  }"#;

  #[test]
  fn test_compile_plan() {
    let plan = PlanDef::from_json(PLAN).unwrap().into_plan().unwrap();

    assert_eq!(plan.strategy, ExecutionStrategy::Conditional);
    assert_eq!(plan.on_error, OnError::Skip);
    assert_eq!(plan.fallback_tool.as_deref(), Some("notify"));
    assert_eq!(plan.fallback_args, None);
    assert_eq!(plan.steps.len(), 2);

    let a = plan.get_step("a").unwrap();
    assert_eq!(a.args, json!({"url": "https://example.com"}));
    assert!(a.transform.is_none());

    let b = plan.get_step("b").unwrap();
    assert_eq!(b.dependencies, vec!["a".to_string()]);
    assert_eq!(b.options.timeout_ms, Some(250));

    let transform = b.transform.as_ref().unwrap();
    assert_eq!(transform(&json!({"body": "hi"})), json!("hi"));

    let condition = b.condition.as_ref().unwrap();
    assert!(!condition(&SharedState::new()));
  }

  #[test]
  fn test_unknown_strategy() {
    let def = PlanDef::from_json(r#"{ "strategy": "round-robin", "steps": [] }"#).unwrap();
    let err = def.into_plan().unwrap_err();
    assert!(matches!(err, ConfigError::Strategy(_)));
    assert_eq!(err.to_string(), "unknown execution strategy: round-robin");
  }

  #[test]
  fn test_invalid_pointer() {
    let def = PlanDef::from_json(
      r#"{ "strategy": "sequential", "steps": [
        { "id": "a", "tool_name": "t", "transform": { "type": "pointer", "pointer": "body" } }
      ] }"#,
    )
    .unwrap();
    assert!(matches!(
      def.into_plan(),
      Err(ConfigError::InvalidPointer { step_id, pointer }) if step_id == "a" && pointer == "body"
    ));
  }

  #[test]
  fn test_non_pointer_transforms_always_compile() {
    let def = PlanDef::from_json(
      r#"{ "strategy": "sequential", "steps": [
        { "id": "a", "tool_name": "t", "transform": { "type": "wrap", "key": "body" } },
        { "id": "b", "tool_name": "t", "transform": { "type": "merge", "args": { "page": 1 } } },
        { "id": "c", "tool_name": "t", "transform": { "type": "pointer", "pointer": "" } }
      ] }"#,
    )
    .unwrap();
    let plan = def.into_plan().unwrap();
    assert!(plan.steps.iter().all(|step| step.transform.is_some()));
  }

  #[test]
  fn test_malformed_json() {
    assert!(matches!(
      PlanDef::from_json("{ not json"),
      Err(ConfigError::Parse(_))
    ));
  }

  #[tokio::test]
  async fn test_load_plan_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    std::fs::write(&path, PLAN).unwrap();

    let plan = load_plan(&path).await.unwrap();
    assert_eq!(plan.steps.len(), 2);

    let missing = load_plan(dir.path().join("missing.json")).await;
    assert!(matches!(missing, Err(ConfigError::Io { .. })));
  }
}
