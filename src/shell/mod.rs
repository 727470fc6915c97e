//! External command execution.

pub mod command;
pub mod mock;

pub use command::{CommandResult, CommandRunner, CommandSpec, SystemRunner};
pub use mock::{MockResponse, MockRunner};
