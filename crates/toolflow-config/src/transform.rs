use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolflow_plan::Transform;

/// Declarative mapping from a prior step's output to a step's arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformDef {
  /// Select part of the prior output with a JSON pointer; `null` if absent.
  Pointer { pointer: String },
  /// Wrap the prior output as `{ key: output }`.
  Wrap { key: String },
  /// Merge static `args` over the prior output. A non-object output is
  /// replaced by `args`.
  Merge { args: serde_json::Map<String, Value> },
}

impl TransformDef {
  pub fn apply(&self, prior: &Value) -> Value {
    match self {
      TransformDef::Pointer { pointer } => prior.pointer(pointer).cloned().unwrap_or(Value::Null),
      TransformDef::Wrap { key } => {
        let mut wrapped = serde_json::Map::new();
        wrapped.insert(key.clone(), prior.clone());
        Value::Object(wrapped)
      }
      TransformDef::Merge { args } => {
        let mut merged = match prior {
          Value::Object(map) => map.clone(),
          _ => serde_json::Map::new(),
        };
        for (k, v) in args {
          merged.insert(k.clone(), v.clone());
        }
        Value::Object(merged)
      }
    }
  }

  /// Whether a pointer transform uses valid JSON pointer syntax.
  pub fn is_valid(&self) -> bool {
    match self {
      TransformDef::Pointer { pointer } => pointer.is_empty() || pointer.starts_with('/'),
      _ => true,
    }
  }

  pub fn compile(self) -> Transform {
    Arc::new(move |prior: &Value| self.apply(prior))
  }
}
