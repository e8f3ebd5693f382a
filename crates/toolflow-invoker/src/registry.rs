//! Typed tool registry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use toolflow_plan::{InvokeOptions, ToolResult};
use tracing::{debug, warn};

use crate::context::{Context, ExecutionLogEntry, InvocationStatus};
use crate::error::ToolError;
use crate::invoker::ToolInvoker;

/// The unit of work behind a tool name.
#[async_trait]
pub trait ToolHandler: Send + Sync {
  async fn call(&self, args: Value, ctx: &Context) -> Result<Value, ToolError>;
}

/// Adapts an async closure that only needs its arguments into a [`ToolHandler`].
pub struct FnHandler<F> {
  f: F,
}

impl<F> FnHandler<F> {
  pub fn new(f: F) -> Self {
    Self { f }
  }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
  F: Fn(Value) -> Fut + Send + Sync,
  Fut: Future<Output = Result<Value, ToolError>> + Send,
{
  async fn call(&self, args: Value, _ctx: &Context) -> Result<Value, ToolError> {
    (self.f)(args).await
  }
}

/// Name → handler map, resolved once at startup.
#[derive(Default, Clone)]
pub struct ToolRegistry {
  tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a handler, replacing any previous handler with the same name.
  pub fn register(&mut self, name: impl Into<String>, handler: impl ToolHandler + 'static) {
    self.tools.insert(name.into(), Arc::new(handler));
  }

  /// Register a plain async closure.
  pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, f: F)
  where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
  {
    self.register(name, FnHandler::new(f));
  }

  /// Registered tool names, sorted.
  pub fn tool_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }

  pub fn len(&self) -> usize {
    self.tools.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tools.is_empty()
  }

  async fn call_handler(
    &self,
    tool_name: &str,
    args: Value,
    ctx: &Context,
    options: &InvokeOptions,
  ) -> Result<Value, ToolError> {
    let handler = self
      .tools
      .get(tool_name)
      .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

    match options.timeout_ms {
      Some(timeout_ms) => tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        handler.call(args, ctx),
      )
      .await
      .map_err(|_| ToolError::Timeout {
        tool_name: tool_name.to_string(),
        timeout_ms,
      })?,
      None => handler.call(args, ctx).await,
    }
  }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
  async fn invoke(
    &self,
    tool_name: &str,
    args: Value,
    ctx: &Context,
    options: &InvokeOptions,
  ) -> ToolResult {
    let started = Instant::now();

    debug!(
      correlation_id = %ctx.correlation_id(),
      tool_name = %tool_name,
      depth = options.depth,
      "tool_invoked"
    );

    let outcome = self.call_handler(tool_name, args, ctx, options).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let (status, result) = match outcome {
      Ok(data) => (InvocationStatus::Success, ToolResult::ok(data)),
      Err(e) => {
        warn!(
          correlation_id = %ctx.correlation_id(),
          tool_name = %tool_name,
          error = %e,
          "tool_failed"
        );
        (InvocationStatus::Failure, ToolResult::err(e.to_string()))
      }
    };

    ctx.record(ExecutionLogEntry {
      tool_name: tool_name.to_string(),
      depth: options.depth,
      parent_tool_name: options.parent_tool_name.clone(),
      status,
      duration_ms,
    });

    result
  }

  fn contains(&self, tool_name: &str) -> bool {
    self.tools.contains_key(tool_name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::invoker::Invocation;
  use serde_json::json;

  struct StateWriter;

  #[async_trait]
  impl ToolHandler for StateWriter {
    async fn call(&self, args: Value, ctx: &Context) -> Result<Value, ToolError> {
      let key = args["key"]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments("missing key".to_string()))?;
      ctx.set_state(key, args["value"].clone());
      Ok(json!({ "written": key }))
    }
  }

  fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_fn("echo", |args| async move { Ok(args) });
    registry.register_fn("fail", |_| async move { Err(ToolError::failed("boom")) });
    registry.register_fn("slow", |args| async move {
      tokio::time::sleep(Duration::from_millis(500)).await;
      Ok(args)
    });
    registry.register("write", StateWriter);
    registry
  }

  #[tokio::test]
  async fn test_invoke_success_records_log() {
    let registry = registry();
    let ctx = Context::new();

    let result = registry
      .invoke("echo", json!({"x": 1}), &ctx, &InvokeOptions::default())
      .await;

    assert_eq!(result, ToolResult::ok(json!({"x": 1})));
    let log = ctx.execution_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].tool_name, "echo");
    assert_eq!(log[0].status, InvocationStatus::Success);
    assert_eq!(log[0].depth, 0);
  }

  #[tokio::test]
  async fn test_handler_error_becomes_failed_result() {
    let registry = registry();
    let ctx = Context::new();

    let result = registry
      .invoke("fail", Value::Null, &ctx, &InvokeOptions::default())
      .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("boom"));
    assert_eq!(ctx.execution_log()[0].status, InvocationStatus::Failure);
  }

  #[tokio::test]
  async fn test_unknown_tool() {
    let registry = registry();
    let ctx = Context::new();

    let result = registry
      .invoke("missing", Value::Null, &ctx, &InvokeOptions::default())
      .await;

    assert_eq!(result.error.as_deref(), Some("unknown tool: missing"));
    assert!(!registry.contains("missing"));
    assert!(registry.contains("echo"));
  }

  #[tokio::test(start_paused = true)]
  async fn test_timeout_is_enforced_per_invocation() {
    let registry = registry();
    let ctx = Context::new();

    let result = registry
      .invoke("slow", json!(1), &ctx, &InvokeOptions::with_timeout_ms(100))
      .await;
    assert_eq!(
      result.error.as_deref(),
      Some("tool 'slow' timed out after 100ms")
    );

    let result = registry
      .invoke("slow", json!(2), &ctx, &InvokeOptions::with_timeout_ms(1000))
      .await;
    assert_eq!(result, ToolResult::ok(json!(2)));
  }

  #[tokio::test]
  async fn test_handler_sees_context() {
    let registry = registry();
    let ctx = Context::new();

    let result = registry
      .invoke(
        "write",
        json!({"key": "answer", "value": 42}),
        &ctx,
        &InvokeOptions::default(),
      )
      .await;

    assert!(result.success);
    assert_eq!(ctx.get_state("answer"), Some(json!(42)));

    let bad = registry
      .invoke("write", json!({}), &ctx, &InvokeOptions::default())
      .await;
    assert_eq!(bad.error.as_deref(), Some("invalid arguments: missing key"));
  }

  #[tokio::test]
  async fn test_nested_options_are_logged() {
    let registry = registry();
    let ctx = Context::new();

    registry
      .invoke("echo", json!(1), &ctx, &InvokeOptions::nested_under("outer", 0))
      .await;

    let entry = &ctx.execution_log()[0];
    assert_eq!(entry.depth, 1);
    assert_eq!(entry.parent_tool_name.as_deref(), Some("outer"));
  }

  #[tokio::test]
  async fn test_batch_invoke_preserves_order() {
    let registry = registry();
    let ctx = Context::new();

    let results = registry
      .batch_invoke(
        &[
          Invocation::new("slow", json!("first")),
          Invocation::new("fail", Value::Null),
          Invocation::new("echo", json!("third")),
        ],
        &ctx,
      )
      .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].data, Some(json!("first")));
    assert!(!results[1].success);
    assert_eq!(results[2].data, Some(json!("third")));
  }

  #[test]
  fn test_tool_names_sorted() {
    assert_eq!(registry().tool_names(), vec!["echo", "fail", "slow", "write"]);
  }
}
