//! Execution plan generation
//!
//! Turns the engine's result list into an [`ExecutionPlan`] by asking the
//! primary result's provider for commands, environment and toolchain needs.

mod generator;
mod schema;

pub use generator::{PlanGenerator, PlanOptions, DEFAULT_BASE_IMAGE, NATIVE_BUILD_PACKAGES};
pub use schema::{Alternative, ExecutionPlan};
