//! Tool prerequisites: a static catalog and the manager that checks and
//! installs them.

pub mod catalog;
pub mod manager;

pub use manager::{DependencyManager, DependencyReport};
