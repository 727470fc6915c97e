//! Install command implementation.
//!
//! The `devops-cli install <tool>` command installs one tool.

use crate::cli::args::ToolArgs;
use crate::error::Result;
use crate::install::Installer;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_outcome;

/// The install command implementation.
pub struct InstallCommand<'a> {
    installer: &'a mut Installer,
    args: ToolArgs,
}

impl<'a> InstallCommand<'a> {
    pub fn new(installer: &'a mut Installer, args: ToolArgs) -> Self {
        Self { installer, args }
    }
}

impl Command for InstallCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let version = self.args.version.as_deref().unwrap_or("latest");
        ui.show_header(&format!("Installing {} ({})", self.args.tool, version));

        let outcome = self
            .installer
            .install(self.args.tool, self.args.version.as_deref());
        show_outcome(ui, &outcome);

        Ok(CommandResult::from_success(outcome.success))
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
    fn install_reports_success() {
        let mut t = TestInstaller::linux(DistroFamily::Debian);
        let mut ui = MockUI::new();
        let args = ToolArgs {
            tool: ToolIdentity::Terraform,
            version: Some("1.6.0".to_string()),
        };

        let result = InstallCommand::new(&mut t.installer, args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(ui.headers(), ["Installing terraform (1.6.0)"]);
        assert!(ui.has_success("terraform 1.6.0 installed via apt-get"));
        assert!(t.runner.ran_line("terraform=1.6.0-1"));
    }

    #[test]
    fn failed_install_exits_nonzero_with_hint() {
        let runner = MockRunner::new();
        // Prerequisites present, package install fails.
        runner.respond("dpkg", &["-l"], MockResponse::Success("ii  pkg 1.0".into()));
        runner.respond("apt-get", &["install"], MockResponse::Exit(100));
        let mut t = TestInstaller::with(
            PlatformProfile::linux(DistroFamily::Ubuntu).with_codename("jammy"),
            runner,
        );
        let mut ui = MockUI::new();
        let args = ToolArgs {
            tool: ToolIdentity::Docker,
            version: None,
        };

        let result = InstallCommand::new(&mut t.installer, args)
            .execute(&mut ui)
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("install docker failed: Step"));
        assert!(!ui.hints().is_empty());
    }

    #[test]
    fn unsupported_platform_is_reported() {
        let mut t = TestInstaller::unsupported();
        let mut ui = MockUI::new();
        let args = ToolArgs {
            tool: ToolIdentity::Helm,
            version: None,
        };

        let result = InstallCommand::new(&mut t.installer, args)
            .execute(&mut ui)
            .unwrap();

        assert!(!result.success);
        assert!(ui.has_error("Unsupported platform"));
        assert!(t.runner.calls().is_empty());
    }
}
