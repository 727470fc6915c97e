//! Uninstall command implementation.

use crate::cli::args::ToolArgs;
use crate::error::Result;
use crate::install::Installer;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_outcome;

/// The uninstall command implementation.
pub struct UninstallCommand<'a> {
    installer: &'a mut Installer,
    args: ToolArgs,
}

impl<'a> UninstallCommand<'a> {
    pub fn new(installer: &'a mut Installer, args: ToolArgs) -> Self {
        Self { installer, args }
    }
}

impl Command for UninstallCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&format!("Removing {}", self.args.tool));

        let outcome = self
            .installer
            .uninstall(self.args.tool, self.args.version.as_deref());
        show_outcome(ui, &outcome);

        Ok(CommandResult::from_success(outcome.success))
    }
}
