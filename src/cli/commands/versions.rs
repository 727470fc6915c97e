//! Versions command implementation.
//!
//! Prints the installable versions of a tool, newest first, ending with
//! `latest`.

use crate::cli::args::VersionsArgs;
use crate::error::Result;
use crate::install::Installer;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The versions command implementation.
pub struct VersionsCommand<'a> {
    installer: &'a mut Installer,
    args: VersionsArgs,
}

impl<'a> VersionsCommand<'a> {
    pub fn new(installer: &'a mut Installer, args: VersionsArgs) -> Self {
        Self { installer, args }
    }
}

impl Command for VersionsCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.args.tool;
        ui.show_header(&format!("Available {} versions", tool));

        for version in self.installer.get_versions(tool).iter() {
            ui.message(&format!("  {}", version));
        }

        Ok(CommandResult::success())
    }
}
