//! Update command implementation.
//!
//! `devops-cli update <tool>` updates one tool; `devops-cli update all`
//! walks the whole catalog and keeps going past individual failures.

use crate::cli::args::{UpdateArgs, UpdateTarget};
use crate::error::Result;
use crate::install::Installer;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_outcome;

/// The update command implementation.
pub struct UpdateCommand<'a> {
    installer: &'a mut Installer,
    args: UpdateArgs,
}

impl<'a> UpdateCommand<'a> {
    pub fn new(installer: &'a mut Installer, args: UpdateArgs) -> Self {
        Self { installer, args }
    }
}

impl Command for UpdateCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let version = self.args.version.as_deref();
        match self.args.target {
            UpdateTarget::Tool(tool) => {
                ui.show_header(&format!("Updating {}", tool));
                let outcome = self.installer.update(tool, version);
                show_outcome(ui, &outcome);
                Ok(CommandResult::from_success(outcome.success))
            }
            UpdateTarget::All => {
                ui.show_header("Updating all tools");
                let outcomes = self.installer.update_all(version);
                for outcome in &outcomes {
                    show_outcome(ui, outcome);
                }

                let updated = outcomes.iter().filter(|o| o.success).count();
                let summary = format!("{} of {} tools updated", updated, outcomes.len());
                if updated == outcomes.len() {
                    ui.message(&summary);
                } else {
                    let failed: Vec<&str> = outcomes
                        .iter()
                        .filter(|o| !o.success)
                        .map(|o| o.tool.as_str())
                        .collect();
                    ui.message(&format!("{} (failed: {})", summary, failed.join(", ")));
                }
                Ok(CommandResult::from_success(updated == outcomes.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::TestInstaller;
    use crate::platform::{DistroFamily, PlatformProfile};
    use crate::shell::{MockResponse, MockRunner};
    use crate::tools::ToolIdentity;
    use crate::ui::MockUI;

    #[test]
    fn jenkins_update_removes_before_installing() {
        let mut t = TestInstaller::linux(DistroFamily::Ubuntu);
        let mut ui = MockUI::new();
        let args = UpdateArgs {
            target: UpdateTarget::Tool(ToolIdentity::Jenkins),
            version: None,
        };

        let result = UpdateCommand::new(&mut t.installer, args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let lines = t.runner.command_lines();
        let removed = lines.iter().position(|l| l.contains("remove -y jenkins"));
        let installed = lines.iter().position(|l| l.contains("install -y jenkins"));
        assert!(removed.is_some() && installed.is_some());
        assert!(removed < installed);
        assert!(ui.has_success("jenkins updated"));
    }

    #[test]
    fn update_all_reports_every_tool() {
        let runner = MockRunner::new();
        runner.respond("dpkg", &["-l"], MockResponse::Success("ii  pkg 1.0".into()));
        runner.respond("apt-get", &["install", "-y", "azure-cli"], MockResponse::Exit(100));
        let mut t = TestInstaller::with(
            PlatformProfile::linux(DistroFamily::Ubuntu).with_codename("jammy"),
            runner,
        );
        let mut ui = MockUI::new();
        let args = UpdateArgs {
            target: UpdateTarget::All,
            version: None,
        };

        let result = UpdateCommand::new(&mut t.installer, args)
            .execute(&mut ui)
            .unwrap();

        assert!(!result.success);
        assert_eq!(ui.successes().len() + ui.errors().len(), ToolIdentity::ALL.len());
        assert!(ui.has_error("update az failed"));
        assert!(ui.has_message("of 9 tools updated"));
        assert!(ui.has_message("az"));
        // Tools after the failure were still attempted.
        assert!(t.runner.ran_line("terraform"));
    }
}
