use std::collections::HashSet;

use toolflow_invoker::ToolInvoker;
use toolflow_plan::{Plan, Step};

use crate::error::ResolveError;

/// Group steps into dependency levels.
///
/// Each pass selects, in declaration order, every step not yet levelled whose
/// dependencies are all levelled; the selection becomes the next level. A pass
/// that selects nothing while steps remain means the remaining steps form (or
/// hang off) a cycle, or depend on an id that does not exist.
pub fn levels(steps: &[Step]) -> Result<Vec<Vec<&Step>>, ResolveError> {
  let mut levelled: HashSet<&str> = HashSet::with_capacity(steps.len());
  let mut remaining: Vec<&Step> = steps.iter().collect();
  let mut result = Vec::new();

  while !remaining.is_empty() {
    let (ready, blocked): (Vec<&Step>, Vec<&Step>) = remaining.into_iter().partition(|step| {
      step
        .dependencies
        .iter()
        .all(|dep| levelled.contains(dep.as_str()))
    });

    if ready.is_empty() {
      return Err(ResolveError::CircularDependency {
        steps: blocked.iter().map(|s| s.id.clone()).collect(),
      });
    }

    levelled.extend(ready.iter().map(|s| s.id.as_str()));
    result.push(ready);
    remaining = blocked;
  }

  Ok(result)
}

/// Check a plan before execution.
///
/// Rejects duplicate step ids, dependencies on unknown steps, tool names (the
/// fallback tool included) the catalog cannot invoke, and cycles.
pub fn validate_plan(plan: &Plan, catalog: &dyn ToolInvoker) -> Result<(), ResolveError> {
  let mut ids: HashSet<&str> = HashSet::with_capacity(plan.steps.len());
  for step in &plan.steps {
    if !ids.insert(step.id.as_str()) {
      return Err(ResolveError::DuplicateStepId(step.id.clone()));
    }
  }

  for step in &plan.steps {
    if let Some(dependency) = step.dependencies.iter().find(|d| !ids.contains(d.as_str())) {
      return Err(ResolveError::UnknownDependency {
        step_id: step.id.clone(),
        dependency: dependency.clone(),
      });
    }
    if !catalog.contains(&step.tool_name) {
      return Err(ResolveError::UnknownTool {
        step_id: step.id.clone(),
        tool_name: step.tool_name.clone(),
      });
    }
  }

  if let Some(fallback) = &plan.fallback_tool
    && !catalog.contains(fallback)
  {
    return Err(ResolveError::UnknownTool {
      step_id: "fallback".to_string(),
      tool_name: fallback.clone(),
    });
  }

  levels(&plan.steps).map(|_| ())
}
