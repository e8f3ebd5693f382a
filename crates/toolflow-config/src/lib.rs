//! Toolflow Config
//!
//! Serializable configuration types for toolflow. These represent plans before
//! they are compiled into executable [`toolflow_plan::Plan`]s, plus the engine
//! settings used by the chain executor.
//!
//! Plan definitions can be loaded from JSON files (via the CLI) or built from
//! JSON values. Step conditions and transforms are declarative here and are
//! compiled into closures by [`PlanDef::into_plan`].

mod chain;
mod condition;
mod error;
mod plan;
mod transform;

pub use chain::{ChainConfig, DEFAULT_MERGED_RESULTS_KEY};
pub use condition::ConditionDef;
pub use error::ConfigError;
pub use plan::{PlanDef, StepDef, load_plan};
pub use transform::TransformDef;
