//! Request-scoped execution context.
//!
//! A [`Context`] is created once per logical request and borrowed by every
//! invocation made on its behalf, including concurrent branches of a level.
//! Each single read or write of the shared state is atomic, but a read
//! followed by a write is not: two branches doing read-modify-write on the
//! same key race and the last writer wins.

use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolflow_plan::SharedState;

/// Outcome recorded in the execution log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
  Success,
  Failure,
  Skipped,
}

/// One entry of the append-only execution log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
  pub tool_name: String,
  pub depth: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_tool_name: Option<String>,
  pub status: InvocationStatus,
  pub duration_ms: u64,
}

impl ExecutionLogEntry {
  /// A top-level entry for a tool that was not invoked.
  pub fn skipped(tool_name: impl Into<String>) -> Self {
    Self {
      tool_name: tool_name.into(),
      depth: 0,
      parent_tool_name: None,
      status: InvocationStatus::Skipped,
      duration_ms: 0,
    }
  }
}

/// Shared state, execution log and correlation id of one logical request.
#[derive(Debug)]
pub struct Context {
  correlation_id: String,
  shared_state: RwLock<SharedState>,
  execution_log: Mutex<Vec<ExecutionLogEntry>>,
}

impl Context {
  /// Create a context with a fresh correlation id.
  pub fn new() -> Self {
    Self::with_correlation_id(uuid::Uuid::new_v4().to_string())
  }

  pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
    Self {
      correlation_id: correlation_id.into(),
      shared_state: RwLock::new(SharedState::new()),
      execution_log: Mutex::new(Vec::new()),
    }
  }

  /// Seed the shared state.
  pub fn with_state(self, state: SharedState) -> Self {
    *self.shared_state.write().unwrap_or_else(|e| e.into_inner()) = state;
    self
  }

  pub fn correlation_id(&self) -> &str {
    &self.correlation_id
  }

  pub fn get_state(&self, key: &str) -> Option<Value> {
    self.with_shared_state(|state| state.get(key).cloned())
  }

  /// Write a key, returning the previous value.
  pub fn set_state(&self, key: impl Into<String>, value: Value) -> Option<Value> {
    let mut state = self.shared_state.write().unwrap_or_else(|e| e.into_inner());
    state.insert(key.into(), value)
  }

  pub fn remove_state(&self, key: &str) -> Option<Value> {
    let mut state = self.shared_state.write().unwrap_or_else(|e| e.into_inner());
    state.remove(key)
  }

  /// Run `f` against the current shared state under a read lock.
  pub fn with_shared_state<R>(&self, f: impl FnOnce(&SharedState) -> R) -> R {
    let state = self.shared_state.read().unwrap_or_else(|e| e.into_inner());
    f(&state)
  }

  /// Snapshot of the shared state.
  pub fn shared_state(&self) -> SharedState {
    self.with_shared_state(|state| state.clone())
  }

  /// Append an entry to the execution log.
  pub fn record(&self, entry: ExecutionLogEntry) {
    self
      .execution_log
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .push(entry);
  }

  /// Snapshot of the whole execution log.
  pub fn execution_log(&self) -> Vec<ExecutionLogEntry> {
    self.log_since(0)
  }

  /// Entries appended at or after position `start`.
  pub fn log_since(&self, start: usize) -> Vec<ExecutionLogEntry> {
    let log = self.execution_log.lock().unwrap_or_else(|e| e.into_inner());
    log.iter().skip(start).cloned().collect()
  }

  pub fn log_len(&self) -> usize {
    self
      .execution_log
      .lock()
      .unwrap_or_else(|e| e.into_inner())
      .len()
  }

  /// Count entries with `status` appended at or after position `start`.
  pub fn count_since(&self, start: usize, status: InvocationStatus) -> usize {
    let log = self.execution_log.lock().unwrap_or_else(|e| e.into_inner());
    log
      .iter()
      .skip(start)
      .filter(|entry| entry.status == status)
      .count()
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new()
  }
}
