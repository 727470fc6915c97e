//! Status command implementation.
//!
//! Probes every tool's version command and shows what is installed.

use crate::error::Result;
use crate::install::Installer;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand<'a> {
    installer: &'a Installer,
}

impl<'a> StatusCommand<'a> {
    pub fn new(installer: &'a Installer) -> Self {
        Self { installer }
    }
}

impl Command for StatusCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.show_header(&format!(
            "Tool status on {}",
            self.installer.platform().describe()
        ));

        let statuses = self.installer.status();
        let mut table = Table::new(&["TOOL", "STATUS", "VERSION"]);
        for status in &statuses {
            let state = if status.installed {
                "installed"
            } else {
                "not found"
            };
            table.add_row([
                status.tool.as_str(),
                state,
                status.version.as_deref().unwrap_or(""),
            ]);
        }
        for line in table.render() {
            ui.message(&line);
        }

        let installed = statuses.iter().filter(|s| s.installed).count();
        ui.message(&format!("\n{} of {} tools installed", installed, statuses.len()));

        Ok(CommandResult::success())
    }
}
