//! Installation engine: per-tool tables, a generic planner and the
//! dispatcher that executes plans.

pub mod dispatcher;
pub mod plan;
pub mod recipe;
pub mod step;

pub use dispatcher::{InstallState, Installer, Outcome, ToolStatus};
pub use recipe::{recipe, Method, ToolRecipe, UpdatePolicy};
pub use step::{Action, Procedure, Step, Verification};
