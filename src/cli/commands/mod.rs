//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads settings,
//! builds an [`Installer`](crate::install::Installer) for the host and
//! routes the subcommand to its implementation.

pub mod deps;
pub mod dispatcher;
pub mod display;
pub mod install;
pub mod list;
pub mod platform;
pub mod status;
pub mod uninstall;
pub mod update;
pub mod versions;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
