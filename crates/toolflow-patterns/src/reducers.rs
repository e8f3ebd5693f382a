//! Canonical reducers for [`map_reduce_tools`](crate::map_reduce_tools).

use serde_json::{Map, Value};
use toolflow_plan::ToolResult;

/// Data of every successful result, in input order.
pub fn collect_successful(results: &[ToolResult]) -> Vec<Value> {
  results
    .iter()
    .filter(|r| r.success)
    .map(ToolResult::data_or_null)
    .collect()
}

pub fn count_successful(results: &[ToolResult]) -> usize {
  results.iter().filter(|r| r.success).count()
}

/// True for an empty slice.
pub fn all_succeeded(results: &[ToolResult]) -> bool {
  results.iter().all(|r| r.success)
}

pub fn any_succeeded(results: &[ToolResult]) -> bool {
  results.iter().any(|r| r.success)
}

/// Shallow merge of the object payloads of successful results.
///
/// Later results overwrite earlier keys. Failures and non-object payloads are
/// ignored.
pub fn merge_results(results: &[ToolResult]) -> Value {
  let mut merged = Map::new();
  for result in results.iter().filter(|r| r.success) {
    if let Some(Value::Object(data)) = &result.data {
      for (key, value) in data {
        merged.insert(key.clone(), value.clone());
      }
    }
  }
  Value::Object(merged)
}
