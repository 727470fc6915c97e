//! Deps command implementation.
//!
//! Without `--install` the prerequisites are only checked; with it, missing
//! ones are installed and each package's result is reported.

use crate::cli::args::DepsArgs;
use crate::error::Result;
use crate::install::Installer;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The deps command implementation.
pub struct DepsCommand<'a> {
    installer: &'a mut Installer,
    args: DepsArgs,
}

impl<'a> DepsCommand<'a> {
    pub fn new(installer: &'a mut Installer, args: DepsArgs) -> Self {
        Self { installer, args }
    }

    fn check(&self, ui: &mut dyn UserInterface) -> CommandResult {
        let tool = self.args.tool;
        if self.installer.validate_dependencies(tool) {
            ui.success(&format!("All prerequisites for {} are installed", tool));
            CommandResult::success()
        } else {
            ui.warning(&format!("Some prerequisites for {} are missing", tool));
            ui.hint(&format!("Run `devops-cli deps {} --install`", tool));
            CommandResult::failure(1)
        }
    }

    fn install(&self, ui: &mut dyn UserInterface) -> CommandResult {
        let report = self.installer.install_dependencies(self.args.tool);
        for package in &report.present {
            ui.message(&format!("  {} (already installed)", package));
        }
        for package in &report.installed {
            ui.success(&format!("Installed {}", package));
        }
        for package in &report.failed {
            ui.error(&format!("Could not install {}", package));
        }
        if !report.is_success() {
            ui.hint("Install the listed packages manually, then retry.");
        }
        CommandResult::from_success(report.is_success())
    }
}

impl Command for DepsCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.args.tool;
        let packages = self.installer.get_dependencies(tool);
        ui.show_header(&format!("Prerequisites for {}", tool));

        if packages.is_empty() {
            ui.message(&format!(
                "  none on {}",
                self.installer.platform().describe()
            ));
            return Ok(CommandResult::success());
        }
        ui.message(&format!("  {}", packages.join(", ")));

        Ok(if self.args.install {
            self.install(ui)
        } else {
            self.check(ui)
        })
    }
}
