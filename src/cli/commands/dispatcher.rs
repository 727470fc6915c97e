//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::load_settings;
use crate::error::Result;
use crate::install::Installer;
use crate::ui::UserInterface;

use super::deps::DepsCommand;
use super::install::InstallCommand;
use super::list::ListCommand;
use super::platform::PlatformCommand;
use super::status::StatusCommand;
use super::uninstall::UninstallCommand;
use super::update::UpdateCommand;
use super::versions::VersionsCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// Failures of the underlying operation are reported through `ui` and
    /// the returned [`CommandResult`]; `Err` is reserved for problems
    /// outside the operation itself.
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Success or exit code 1.
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::success()
        } else {
            Self::failure(1)
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher reading settings from `config` (or the default
    /// location when `None`).
    pub fn new(config: Option<PathBuf>) -> Self {
        Self { config }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    /// Load settings, build an installer for this host and run the command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Listing needs neither settings nor a host probe.
        if let Commands::List = cli.command {
            return ListCommand::new().execute(ui);
        }

        let settings = load_settings(self.config_path())?;
        let mut installer = Installer::from_settings(settings)?;
        Self::dispatch_with(&cli.command, &mut installer, ui)
    }

    /// Run a command against an existing installer.
    pub fn dispatch_with(
        command: &Commands,
        installer: &mut Installer,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        match command {
            Commands::Install(args) => InstallCommand::new(installer, args.clone()).execute(ui),
            Commands::Uninstall(args) => UninstallCommand::new(installer, args.clone()).execute(ui),
            Commands::Update(args) => UpdateCommand::new(installer, args.clone()).execute(ui),
            Commands::Versions(args) => VersionsCommand::new(installer, args.clone()).execute(ui),
            Commands::Deps(args) => DepsCommand::new(installer, args.clone()).execute(ui),
            Commands::List => ListCommand::new().execute(ui),
            Commands::Status => StatusCommand::new(installer).execute(ui),
            Commands::Platform => PlatformCommand::new(installer).execute(ui),
        }
    }
}
