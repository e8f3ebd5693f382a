use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolflow_plan::{Condition, SharedState};

/// Declarative predicate over the shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionDef {
  /// The key is present.
  Exists { key: String },
  /// The key is present and equal to `value`.
  Equals { key: String, value: Value },
  /// The key is present and not `null`, `false`, `0`, `""`, `[]` or `{}`.
  Truthy { key: String },
  Not { condition: Box<ConditionDef> },
}

impl ConditionDef {
  pub fn evaluate(&self, state: &SharedState) -> bool {
    match self {
      ConditionDef::Exists { key } => state.contains_key(key),
      ConditionDef::Equals { key, value } => state.get(key) == Some(value),
      ConditionDef::Truthy { key } => state.get(key).is_some_and(is_truthy),
      ConditionDef::Not { condition } => !condition.evaluate(state),
    }
  }

  pub fn compile(self) -> Condition {
    Arc::new(move |state: &SharedState| self.evaluate(state))
  }
}

fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(a) => !a.is_empty(),
    Value::Object(o) => !o.is_empty(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn state() -> SharedState {
    let mut state = SharedState::new();
    state.insert("mode".to_string(), json!("fast"));
    state.insert("count".to_string(), json!(0));
    state.insert("items".to_string(), json!([1]));
    state
  }

  #[test]
  fn test_parse_tagged() {
    let def: ConditionDef =
      serde_json::from_value(json!({ "type": "equals", "key": "mode", "value": "fast" })).unwrap();
    assert_eq!(
      def,
      ConditionDef::Equals {
        key: "mode".to_string(),
        value: json!("fast")
      }
    );
  }

  #[test]
  fn test_evaluate() {
    let state = state();
    assert!(ConditionDef::Exists { key: "count".into() }.evaluate(&state));
    assert!(!ConditionDef::Exists { key: "nope".into() }.evaluate(&state));
    assert!(!ConditionDef::Truthy { key: "count".into() }.evaluate(&state));
    assert!(ConditionDef::Truthy { key: "items".into() }.evaluate(&state));
    assert!(
      ConditionDef::Not {
        condition: Box::new(ConditionDef::Equals {
          key: "mode".into(),
          value: json!("slow")
        })
      }
      .evaluate(&state)
    );
  }

  #[test]
  fn test_compiled_condition_matches_evaluate() {
    let condition = ConditionDef::Truthy { key: "mode".into() }.compile();
    assert!(condition(&state()));
    assert!(!condition(&SharedState::new()));
  }
}
