use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use toolflow_invoker::{Context, ToolInvoker};
use toolflow_plan::{InvokeOptions, ToolResult, Transform};
use tracing::{debug, warn};

use crate::error::PatternError;

/// One stage of [`pipeline_tools`].
#[derive(Clone)]
pub struct PipelineStage {
  pub tool_name: String,
  /// Maps the previous stage's output to this stage's arguments. Without it
  /// the output is passed through unchanged.
  pub transform: Option<Transform>,
}

impl PipelineStage {
  pub fn new(tool_name: impl Into<String>) -> Self {
    Self {
      tool_name: tool_name.into(),
      transform: None,
    }
  }

  pub fn with_transform<F>(mut self, transform: F) -> Self
  where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
  {
    self.transform = Some(Arc::new(transform));
    self
  }
}

impl fmt::Debug for PipelineStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PipelineStage")
      .field("tool_name", &self.tool_name)
      .field("transform", &self.transform.is_some())
      .finish()
  }
}

/// Run stages strictly in order, each fed the previous stage's output.
///
/// The first stage receives `initial_input`. Any failed stage stops the
/// pipeline with [`PatternError::PipelineFailed`]; there is no partial result.
pub async fn pipeline_tools(
  invoker: &dyn ToolInvoker,
  stages: &[PipelineStage],
  ctx: &Context,
  initial_input: Value,
) -> Result<Value, PatternError> {
  let options = InvokeOptions::default();
  let mut current = initial_input;

  for (index, stage) in stages.iter().enumerate() {
    let args = match &stage.transform {
      Some(transform) => transform(&current),
      None => current,
    };

    debug!(
      correlation_id = %ctx.correlation_id(),
      stage = index + 1,
      tool_name = %stage.tool_name,
      "pipeline_stage"
    );

    let result = invoker.invoke(&stage.tool_name, args, ctx, &options).await;
    if !result.success {
      let error = PatternError::PipelineFailed {
        stage: index + 1,
        tool_name: stage.tool_name.clone(),
        message: result.error_message().to_string(),
      };
      warn!(correlation_id = %ctx.correlation_id(), error = %error, "pipeline_failed");
      return Err(error);
    }
    current = result.data_or_null();
  }

  Ok(current)
}

/// Thread data through tools in order with no per-stage mapping.
///
/// The first failure is returned as-is. An empty tool list returns the
/// initial input as a success.
pub async fn waterfall_tools(
  invoker: &dyn ToolInvoker,
  tool_names: &[&str],
  ctx: &Context,
  initial_input: Value,
) -> ToolResult {
  let options = InvokeOptions::default();
  let mut last = ToolResult::ok(initial_input);

  for tool_name in tool_names {
    let result = invoker
      .invoke(tool_name, last.data_or_null(), ctx, &options)
      .await;
    if !result.success {
      return result;
    }
    last = result;
  }

  last
}
