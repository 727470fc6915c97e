//! Platform command implementation.

use crate::error::Result;
use crate::install::Installer;
use crate::platform::is_elevated;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Shows what the installer detected about this host.
pub struct PlatformCommand<'a> {
    installer: &'a Installer,
}

impl<'a> PlatformCommand<'a> {
    pub fn new(installer: &'a Installer) -> Self {
        Self { installer }
    }
}

impl Command for PlatformCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let platform = self.installer.platform();
        ui.show_header("Platform");

        ui.message(&format!("  os:              {}", platform.os));
        if let Some(distro) = platform.distro {
            ui.message(&format!("  distribution:    {}", distro));
        } else if let Some(id) = &platform.distro_id {
            ui.message(&format!("  distribution:    {} (unrecognized)", id));
        }
        if let Some(codename) = &platform.codename {
            ui.message(&format!("  codename:        {}", codename));
        }
        ui.message(&format!("  architecture:    {}", platform.arch.as_str()));
        let manager = platform
            .package_manager()
            .map(|pm| pm.program())
            .unwrap_or("none");
        ui.message(&format!("  package manager: {}", manager));
        ui.message(&format!(
            "  install root:    {}",
            self.installer.settings().install_root().display()
        ));
        ui.message(&format!(
            "  elevated:        {}",
            if is_elevated() { "yes" } else { "no" }
        ));

        if platform.is_supported() {
            Ok(CommandResult::success())
        } else {
            ui.warning(&format!("Unsupported platform: {}", platform.describe()));
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::TestInstaller;
    use crate::platform::DistroFamily;
    use crate::ui::MockUI;

    #[test]
    fn shows_detected_profile() {
        let t = TestInstaller::linux(DistroFamily::Ubuntu);
        let mut ui = MockUI::new();

        let result = PlatformCommand::new(&t.installer).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("os:              linux"));
        assert!(ui.has_message("distribution:    ubuntu"));
        assert!(ui.has_message("codename:        jammy"));
        assert!(ui.has_message("architecture:    amd64"));
        assert!(ui.has_message("package manager: apt-get"));
    }

    #[test]
    fn unsupported_host_fails() {
        let t = TestInstaller::unsupported();
        let mut ui = MockUI::new();

        let result = PlatformCommand::new(&t.installer).execute(&mut ui).unwrap();

        assert!(!result.success);
        assert!(ui.has_message("package manager: none"));
        assert!(ui.has_warning("Unsupported platform"));
    }
}
