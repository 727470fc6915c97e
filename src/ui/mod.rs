//! User-facing output.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands can be tested without a terminal
//! - [`TerminalUI`] for real terminals
//! - [`MockUI`] which records everything it is asked to show
//!
//! # Example
//!
//! ```
//! use devops_cli::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.success("helm installed via apt-get");
//! assert!(ui.has_success("helm installed"));
//! ```

pub mod mock;
pub mod output;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use table::Table;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, DevopsTheme};

/// Trait for user interface interactions.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Plain line.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors are shown in every output mode.
    fn error(&mut self, msg: &str);

    /// Suggested next step after a problem.
    fn hint(&mut self, msg: &str);

    fn show_header(&mut self, title: &str);
}
