//! Invocation and chain results.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::step::StepId;

/// Uniform outcome of a single tool invocation.
///
/// The engine never inspects `data`; it only routes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl ToolResult {
  pub fn ok(data: Value) -> Self {
    Self {
      success: true,
      data: Some(data),
      error: None,
    }
  }

  pub fn err(error: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      error: Some(error.into()),
    }
  }

  /// The error message, or a placeholder when a failure carried none.
  pub fn error_message(&self) -> &str {
    self.error.as_deref().unwrap_or("unknown error")
  }

  /// The data payload, `null` when absent.
  pub fn data_or_null(&self) -> Value {
    self.data.clone().unwrap_or(Value::Null)
  }
}

/// Step results in the order they were recorded.
///
/// Behaves as a map keyed by step id; inserting an existing id replaces the
/// entry in place. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResults {
  entries: Vec<(StepId, ToolResult)>,
}

impl StepResults {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, step_id: impl Into<StepId>, result: ToolResult) {
    let step_id = step_id.into();
    match self.entries.iter_mut().find(|(id, _)| *id == step_id) {
      Some((_, existing)) => *existing = result,
      None => self.entries.push((step_id, result)),
    }
  }

  pub fn get(&self, step_id: &str) -> Option<&ToolResult> {
    self
      .entries
      .iter()
      .find(|(id, _)| id == step_id)
      .map(|(_, r)| r)
  }

  pub fn contains(&self, step_id: &str) -> bool {
    self.get(step_id).is_some()
  }

  /// Whether the step has an entry and that entry succeeded.
  pub fn succeeded(&self, step_id: &str) -> bool {
    self.get(step_id).is_some_and(|r| r.success)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolResult)> {
    self.entries.iter().map(|(id, r)| (id.as_str(), r))
  }

  pub fn successful_count(&self) -> usize {
    self.entries.iter().filter(|(_, r)| r.success).count()
  }

  pub fn failed_count(&self) -> usize {
    self.entries.len() - self.successful_count()
  }
}

impl FromIterator<(StepId, ToolResult)> for StepResults {
  fn from_iter<T: IntoIterator<Item = (StepId, ToolResult)>>(iter: T) -> Self {
    let mut results = StepResults::new();
    for (id, result) in iter {
      results.insert(id, result);
    }
    results
  }
}

impl Serialize for StepResults {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.entries.len()))?;
    for (id, result) in &self.entries {
      map.serialize_entry(id, result)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for StepResults {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct StepResultsVisitor;

    impl<'de> Visitor<'de> for StepResultsVisitor {
      type Value = StepResults;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of step id to tool result")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StepResults, A::Error> {
        let mut results = StepResults::new();
        while let Some((id, result)) = access.next_entry::<StepId, ToolResult>()? {
          results.insert(id, result);
        }
        Ok(results)
      }
    }

    deserializer.deserialize_map(StepResultsVisitor)
  }
}

/// Counters describing one chain execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
  pub total_steps: usize,
  pub successful_steps: usize,
  pub failed_steps: usize,
  pub skipped_steps: usize,
  pub total_duration_ms: u64,
}

/// Aggregated outcome of executing a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResult {
  pub success: bool,
  pub step_results: StepResults,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub final_output: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub summary: ChainSummary,
}
