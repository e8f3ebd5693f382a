//! Toolflow Resolver
//!
//! Groups the steps of a plan into dependency levels and validates plans
//! before they are executed.
//!
//! A level is a set of steps whose dependencies are all satisfied by earlier
//! levels. Levels are dispatched one after the other; the steps of one level
//! are dispatched concurrently.

mod error;
mod resolver;

pub use error::ResolveError;
pub use resolver::{levels, validate_plan};
