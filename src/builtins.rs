//! Tools available to plans run from the command line.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use toolflow_invoker::{Context, ToolError, ToolHandler, ToolRegistry};

/// Registry holding every builtin tool.
pub fn registry() -> ToolRegistry {
  let mut registry = ToolRegistry::new();
  registry.register_fn("echo", |args| async move { Ok(args) });
  registry.register_fn("fail", |args: Value| async move {
    let message = args["message"].as_str().unwrap_or("failed on purpose");
    Err(ToolError::failed(message))
  });
  registry.register_fn("sleep", |args: Value| async move {
    let ms = args["ms"]
      .as_u64()
      .ok_or_else(|| ToolError::InvalidArguments("'ms' must be a non-negative integer".to_string()))?;
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(json!({ "slept_ms": ms }))
  });
  registry.register("set_state", SetState);
  registry.register("get_state", GetState);
  registry
}

fn key_arg(args: &Value) -> Result<&str, ToolError> {
  args["key"]
    .as_str()
    .ok_or_else(|| ToolError::InvalidArguments("'key' must be a string".to_string()))
}

/// Writes `args.value` to the shared state under `args.key`.
struct SetState;

#[async_trait]
impl ToolHandler for SetState {
  async fn call(&self, args: Value, ctx: &Context) -> Result<Value, ToolError> {
    let key = key_arg(&args)?;
    let previous = ctx.set_state(key, args["value"].clone());
    Ok(json!({ "key": key, "previous": previous }))
  }
}

/// Reads `args.key` from the shared state; `null` when unset.
struct GetState;

#[async_trait]
impl ToolHandler for GetState {
  async fn call(&self, args: Value, ctx: &Context) -> Result<Value, ToolError> {
    let key = key_arg(&args)?;
    Ok(ctx.get_state(key).unwrap_or(Value::Null))
  }
}
