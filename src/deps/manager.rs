//! Prerequisite installation.
//!
//! Checks and installs the system packages a tool's installation procedure
//! relies on, using the host's native package manager.

use std::cell::Cell;

use tracing::{debug, info, warn};

use crate::config::Timeouts;
use crate::error::{DevopsError, Result};
use crate::platform::{OsFamily, PackageManager, PlatformProfile};
use crate::shell::{CommandRunner, CommandSpec};
use crate::tools::ToolIdentity;

use super::catalog;

/// Outcome of installing a tool's prerequisites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyReport {
    /// Packages already present before the run.
    pub present: Vec<String>,
    /// Packages installed by this run.
    pub installed: Vec<String>,
    /// Packages that could not be installed.
    pub failed: Vec<String>,
}

impl DependencyReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Convert failures into an error naming every failed package.
    pub fn into_result(self, tool: ToolIdentity) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(DevopsError::DependencyFailure {
                tool: tool.to_string(),
                packages: self.failed,
            })
        }
    }
}

/// Checks and installs prerequisite packages.
pub struct DependencyManager<'a> {
    platform: &'a PlatformProfile,
    runner: &'a dyn CommandRunner,
    timeouts: &'a Timeouts,
    index_refreshed: Cell<bool>,
}

impl<'a> DependencyManager<'a> {
    pub fn new(
        platform: &'a PlatformProfile,
        runner: &'a dyn CommandRunner,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            platform,
            runner,
            timeouts,
            index_refreshed: Cell::new(false),
        }
    }

    /// Prerequisite packages for `tool` on this host.
    pub fn get_dependencies(&self, tool: ToolIdentity) -> Vec<String> {
        catalog::lookup(tool, self.platform.os, self.platform.distro)
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    /// Query the native package database. Any query failure, including a
    /// timeout, counts as "not installed".
    pub fn check_installed(&self, package: &str) -> bool {
        let query = match self.platform.package_manager() {
            Some(PackageManager::Apt) => CommandSpec::new("dpkg").args(["-l", package]),
            Some(PackageManager::Yum | PackageManager::Dnf) => {
                CommandSpec::new("rpm").args(["-q", package])
            }
            Some(PackageManager::Homebrew) => CommandSpec::new("brew").args(["list", package]),
            // No reliable query exists; rely on the installer reporting conflicts.
            Some(PackageManager::Winget) => return true,
            None => return false,
        }
        .timeout(self.timeouts.query());

        match self.runner.run(&query) {
            Ok(result) if result.success => {
                // dpkg -l also lists removed packages; "ii" marks installed ones.
                if query.program == "dpkg" {
                    result.stdout.lines().any(|l| l.starts_with("ii"))
                } else {
                    true
                }
            }
            Ok(_) => false,
            Err(e) => {
                debug!("Package query for {} failed: {}", package, e);
                false
            }
        }
    }

    /// Install one package. Returns false on failure, timeout or missing
    /// package manager.
    pub fn install_dependency(&self, package: &str) -> bool {
        let Some(manager) = self.platform.package_manager() else {
            warn!(
                "No package manager for {}; cannot install {}",
                self.platform.describe(),
                package
            );
            return false;
        };

        info!("Installing dependency {}", package);
        match manager {
            PackageManager::Apt => {
                if !self.refresh_index(manager) {
                    return false;
                }
                self.attempt(
                    &CommandSpec::new("apt-get")
                        .args(["install", "-y", package])
                        .env("DEBIAN_FRONTEND", "noninteractive")
                        .elevated()
                        .timeout(self.timeouts.install()),
                )
            }
            PackageManager::Yum | PackageManager::Dnf => self.attempt(
                &CommandSpec::new(manager.program())
                    .args(["install", "-y", package])
                    .elevated()
                    .timeout(self.timeouts.install()),
            ),
            PackageManager::Homebrew => self.attempt(
                &CommandSpec::new("brew")
                    .args(["install", package])
                    .timeout(self.timeouts.install()),
            ),
            PackageManager::Winget => {
                let choco = CommandSpec::new("choco")
                    .args(["install", package, "-y"])
                    .elevated()
                    .timeout(self.timeouts.install());
                if self.attempt(&choco) {
                    return true;
                }
                let winget = CommandSpec::new("winget")
                    .args([
                        "install",
                        package,
                        "--accept-package-agreements",
                        "--accept-source-agreements",
                    ])
                    .elevated()
                    .timeout(self.timeouts.install());
                if self.attempt(&winget) {
                    return true;
                }
                warn!(
                    "Could not install {} with choco or winget; manual installation required",
                    package
                );
                false
            }
        }
    }

    /// Install every missing prerequisite of `tool`.
    ///
    /// A failure does not stop the remaining packages; the report lists
    /// every failure.
    pub fn install_dependencies(&self, tool: ToolIdentity) -> DependencyReport {
        let mut report = DependencyReport::default();

        for package in self.get_dependencies(tool) {
            if self.check_installed(&package) {
                debug!("Dependency {} already installed", package);
                report.present.push(package);
            } else if self.install_dependency(&package) {
                report.installed.push(package);
            } else {
                report.failed.push(package);
            }
        }

        if !report.is_success() {
            warn!(
                "Dependencies for {} failed: {}",
                tool,
                report.failed.join(", ")
            );
        }
        report
    }

    /// Check that every prerequisite of `tool` is installed, without
    /// installing anything.
    pub fn validate_dependencies(&self, tool: ToolIdentity) -> bool {
        if self.platform.os == OsFamily::Linux && self.platform.distro.is_none() {
            return false;
        }
        self.get_dependencies(tool)
            .iter()
            .all(|package| self.check_installed(package))
    }

    /// Refresh the package index once per manager instance.
    fn refresh_index(&self, manager: PackageManager) -> bool {
        if self.index_refreshed.get() {
            return true;
        }
        let refreshed = self.attempt(
            &CommandSpec::new(manager.program())
                .arg("update")
                .elevated()
                .timeout(self.timeouts.index_refresh()),
        );
        self.index_refreshed.set(refreshed);
        refreshed
    }

    fn attempt(&self, spec: &CommandSpec) -> bool {
        match self.runner.run(spec) {
            Ok(result) if result.success => true,
            Ok(result) => {
                warn!("{} failed: {}", spec.display(), result.summary());
                false
            }
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}
