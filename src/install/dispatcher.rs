//! Installation dispatcher.
//!
//! One generic engine drives every tool: prerequisites first, then the
//! platform branch from the tool's recipe, then the planned steps in order,
//! then verification. Every run ends in an [`Outcome`]; errors never escape.

use std::fmt;
use std::fs;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::deps::{DependencyManager, DependencyReport};
use crate::download::{build_url_for_arch, Downloader, HttpDownloader};
use crate::error::{DevopsError, Result};
use crate::platform::{detect_platform, PlatformProfile};
use crate::shell::{CommandRunner, SystemRunner};
use crate::tools::ToolIdentity;
use crate::versions::{VersionList, VersionRequest, VersionResolver};

use super::plan::{plan_install, plan_native_update, plan_uninstall, version_command, PlanContext};
use super::recipe::{recipe, Method, ToolRecipe, UpdatePolicy};
use super::step::{Action, Procedure, Step, Verification};

static REPORTED_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bv?(\d+(?:\.\d+)+)\b").unwrap());

/// Progress of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallState {
    Start,
    DependenciesChecked,
    PlatformBranchSelected,
    StepsExecuting,
    Verified,
    Failed,
}

impl fmt::Display for InstallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::DependenciesChecked => "dependencies checked",
            Self::PlatformBranchSelected => "platform branch selected",
            Self::StepsExecuting => "steps executing",
            Self::Verified => "verified",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of an install, uninstall or update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub tool: ToolIdentity,
    pub action: Action,
    pub success: bool,
    /// Terminal state: `Verified` or `Failed`.
    pub state: InstallState,
    /// Last state reached before the run ended.
    pub reached: InstallState,
    pub message: String,
    /// Suggested manual remediation after a failure.
    pub hint: Option<String>,
    /// Warnings and instructions collected along the way.
    pub notices: Vec<String>,
}

/// Whether a tool answers its version command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStatus {
    pub tool: ToolIdentity,
    pub installed: bool,
    /// First line the version command printed.
    pub version: Option<String>,
}

struct Tracker {
    tool: ToolIdentity,
    action: Action,
    state: InstallState,
    notices: Vec<String>,
}

impl Tracker {
    fn new(tool: ToolIdentity, action: Action) -> Self {
        Self {
            tool,
            action,
            state: InstallState::Start,
            notices: Vec::new(),
        }
    }

    fn advance(&mut self, next: InstallState) {
        debug!("{} {}: {} -> {}", self.tool, self.action, self.state, next);
        self.state = next;
    }

    fn finish(mut self, result: Result<String>) -> Outcome {
        let reached = self.state;
        match result {
            Ok(message) => {
                self.advance(InstallState::Verified);
                info!("{}", message);
                Outcome {
                    tool: self.tool,
                    action: self.action,
                    success: true,
                    state: InstallState::Verified,
                    reached,
                    message,
                    hint: None,
                    notices: self.notices,
                }
            }
            Err(e) => {
                warn!("{} {} failed during '{}': {}", self.tool, self.action, reached, e);
                self.advance(InstallState::Failed);
                Outcome {
                    tool: self.tool,
                    action: self.action,
                    success: false,
                    state: InstallState::Failed,
                    reached,
                    hint: remediation(&e).map(str::to_string),
                    message: e.to_string(),
                    notices: self.notices,
                }
            }
        }
    }
}

fn remediation(error: &DevopsError) -> Option<&'static str> {
    match error {
        DevopsError::DependencyFailure { .. } => {
            Some("Install the listed packages manually, then retry.")
        }
        DevopsError::UnsupportedPlatform { .. } => Some(
            "Supported hosts: Ubuntu, Debian, CentOS, RHEL, Fedora, macOS and Windows.",
        ),
        DevopsError::VerificationFailed { .. } => {
            Some("Restart your terminal, or check that the install location is on PATH.")
        }
        DevopsError::StepFailed { .. } | DevopsError::DownloadUnsupported { .. } => {
            Some("Check your network connection and administrator rights, then retry.")
        }
        _ => None,
    }
}

/// How a run's procedures are planned.
#[derive(Debug, Clone, Copy)]
enum Plan {
    Install,
    Uninstall,
    Native(&'static [&'static str]),
    Replace,
}

/// Installs, updates and removes tools on one host.
pub struct Installer {
    platform: PlatformProfile,
    runner: Box<dyn CommandRunner>,
    downloader: Box<dyn Downloader>,
    resolver: VersionResolver,
    settings: Settings,
}

impl Installer {
    pub fn new(
        platform: PlatformProfile,
        runner: Box<dyn CommandRunner>,
        downloader: Box<dyn Downloader>,
        resolver: VersionResolver,
        settings: Settings,
    ) -> Self {
        Self {
            platform,
            runner,
            downloader,
            resolver,
            settings,
        }
    }

    /// Installer for the current host, talking to real upstreams.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let platform = detect_platform();
        info!("Detected platform: {}", platform.describe());
        Ok(Self::new(
            platform,
            Box::new(SystemRunner::new()),
            Box::new(HttpDownloader::from_settings(&settings)?),
            VersionResolver::from_settings(&settings)?,
            settings,
        ))
    }

    pub fn platform(&self) -> &PlatformProfile {
        &self.platform
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn install(&mut self, tool: ToolIdentity, version: Option<&str>) -> Outcome {
        self.perform(tool, Action::Install, version)
    }

    pub fn uninstall(&mut self, tool: ToolIdentity, version: Option<&str>) -> Outcome {
        self.perform(tool, Action::Uninstall, version)
    }

    pub fn update(&mut self, tool: ToolIdentity, version: Option<&str>) -> Outcome {
        self.perform(tool, Action::Update, version)
    }

    /// Update every tool in catalog order, continuing past failures.
    pub fn update_all(&mut self, version: Option<&str>) -> Vec<Outcome> {
        ToolIdentity::ALL
            .iter()
            .map(|&tool| self.update(tool, version))
            .collect()
    }

    pub fn get_versions(&mut self, tool: ToolIdentity) -> VersionList {
        self.resolver.get_versions_for(tool, &self.platform)
    }

    pub fn get_dependencies(&self, tool: ToolIdentity) -> Vec<String> {
        self.dependencies().get_dependencies(tool)
    }

    pub fn validate_dependencies(&self, tool: ToolIdentity) -> bool {
        self.dependencies().validate_dependencies(tool)
    }

    pub fn install_dependencies(&self, tool: ToolIdentity) -> DependencyReport {
        self.dependencies().install_dependencies(tool)
    }

    /// Probe every tool's version command.
    pub fn status(&self) -> Vec<ToolStatus> {
        ToolIdentity::ALL
            .iter()
            .map(|&tool| {
                let probe = version_command(recipe(tool).version_command, None)
                    .timeout(self.settings.timeouts.quick());
                match self.runner.run(&probe) {
                    Ok(result) if result.success => ToolStatus {
                        tool,
                        installed: true,
                        version: first_line(&result.stdout).or_else(|| first_line(&result.stderr)),
                    },
                    _ => ToolStatus {
                        tool,
                        installed: false,
                        version: None,
                    },
                }
            })
            .collect()
    }

    fn dependencies(&self) -> DependencyManager<'_> {
        DependencyManager::new(
            &self.platform,
            self.runner.as_ref(),
            &self.settings.timeouts,
        )
    }

    fn perform(&mut self, tool: ToolIdentity, action: Action, version: Option<&str>) -> Outcome {
        let request = VersionRequest::parse(version);
        info!("{} {} ({}) on {}", action, tool, request.as_str(), self.platform.describe());
        let mut tracker = Tracker::new(tool, action);
        let result = self.run(&mut tracker, &request);
        tracker.finish(result)
    }

    fn run(&mut self, tracker: &mut Tracker, request: &VersionRequest) -> Result<String> {
        let tool = tracker.tool;
        let action = tracker.action;

        if !self.platform.is_supported() {
            return Err(DevopsError::UnsupportedPlatform {
                platform: self.platform.describe(),
            });
        }

        let recipe = recipe(tool);
        let replaces = action == Action::Update && recipe.update == UpdatePolicy::UninstallFirst;
        if action != Action::Uninstall && !replaces {
            if let Some(message) = self.already_installed(&recipe, request) {
                return Ok(message);
            }
        }

        if action.needs_dependencies() {
            self.dependencies()
                .install_dependencies(tool)
                .into_result(tool)?;
        } else {
            debug!("Skipping prerequisites for {} {}", tool, action);
        }
        tracker.advance(InstallState::DependenciesChecked);

        let method = recipe
            .method_for(&self.platform, request)
            .ok_or_else(|| DevopsError::UnsupportedPlatform {
                platform: self.platform.describe(),
            })?;
        let plan = match (action, recipe.update) {
            (Action::Uninstall, _) => Plan::Uninstall,
            (Action::Update, UpdatePolicy::Native(args)) if self.responds(&recipe) => {
                Plan::Native(args)
            }
            (Action::Update, UpdatePolicy::UninstallFirst) => Plan::Replace,
            _ => Plan::Install,
        };
        tracker.advance(InstallState::PlatformBranchSelected);
        debug!("{} {}: {:?} via {}", tool, action, plan, method.describe(&self.platform));

        let download_url = match (plan, method) {
            (Plan::Install | Plan::Replace, Method::Download(_)) => {
                Some(self.download_url(tool, request)?)
            }
            _ => None,
        };

        let scratch = TempDir::new()?;
        let install_root = self.settings.install_root();
        let ctx = PlanContext {
            platform: &self.platform,
            version: request,
            download_url,
            install_root: &install_root,
            scratch: scratch.path(),
            timeouts: &self.settings.timeouts,
        };
        let procedures = match plan {
            Plan::Install => vec![plan_install(&recipe, method, &ctx)?],
            Plan::Uninstall => vec![plan_uninstall(&recipe, method, &ctx)?],
            Plan::Native(args) => vec![plan_native_update(&recipe, args, &ctx)],
            Plan::Replace => vec![
                plan_uninstall(&recipe, method, &ctx)?,
                plan_install(&recipe, method, &ctx)?,
            ],
        };

        tracker.advance(InstallState::StepsExecuting);
        for procedure in &procedures {
            self.execute(tracker, procedure)?;
        }

        let via = procedures
            .last()
            .map(|p| p.method.clone())
            .unwrap_or_default();
        let done = match action {
            Action::Install => "installed",
            Action::Uninstall => "removed",
            Action::Update => "updated",
        };
        Ok(match request {
            VersionRequest::Exact(version) if action != Action::Uninstall => {
                format!("{tool} {version} {done} via {via}")
            }
            _ => format!("{tool} {done} via {via}"),
        })
    }

    /// Exact versions already reported by the tool are not reinstalled.
    fn already_installed(&self, recipe: &ToolRecipe, request: &VersionRequest) -> Option<String> {
        let VersionRequest::Exact(version) = request else {
            return None;
        };
        let probe = version_command(recipe.version_command, None)
            .timeout(self.settings.timeouts.quick());
        match self.runner.run(&probe) {
            Ok(result) if result.success => {
                let reported = reports_version(&result.stdout, version)
                    || reports_version(&result.stderr, version);
                reported.then(|| format!("{} {} is already installed", recipe.tool, version))
            }
            _ => None,
        }
    }

    fn responds(&self, recipe: &ToolRecipe) -> bool {
        let probe = version_command(recipe.version_command, None)
            .timeout(self.settings.timeouts.quick());
        self.runner.succeeds(&probe)
    }

    /// Artifact URL for `request`; `latest` is resolved to a concrete
    /// version unless the vendor publishes an alias.
    fn download_url(&mut self, tool: ToolIdentity, request: &VersionRequest) -> Result<String> {
        let (os, arch) = (self.platform.os, self.platform.arch);
        if let Some(url) = build_url_for_arch(tool, request.as_str(), os, arch) {
            return Ok(url);
        }
        if request.is_latest() {
            let version = self.resolver.resolve_latest(tool, &self.platform)?;
            info!("Resolved latest {} to {}", tool, version);
            if let Some(url) = build_url_for_arch(tool, &version, os, arch) {
                return Ok(url);
            }
        }
        Err(DevopsError::DownloadUnsupported {
            tool: tool.to_string(),
            os: os.to_string(),
        })
    }

    fn execute(&self, tracker: &mut Tracker, procedure: &Procedure) -> Result<()> {
        for warning in &procedure.warnings {
            warn!("{}", warning);
            tracker.notices.push(warning.clone());
        }

        let total = procedure.steps.len();
        for (index, step) in procedure.steps.iter().enumerate() {
            debug!("[{}/{}] {}", index + 1, total, step.label());
            self.execute_step(tracker, step)?;
        }

        self.verify(procedure)
    }

    fn execute_step(&self, tracker: &mut Tracker, step: &Step) -> Result<()> {
        let failed = |message: String| DevopsError::StepFailed {
            step: step.label(),
            message,
        };

        match step {
            Step::Run { command, .. } => {
                info!("Running: {}", command.display());
                let result = self.runner.run(command).map_err(|e| failed(e.to_string()))?;
                if !result.success {
                    let error = DevopsError::CommandFailed {
                        command: command.display(),
                        code: result.exit_code,
                    };
                    let detail = result.summary();
                    return Err(failed(if detail.is_empty() {
                        error.to_string()
                    } else {
                        format!("{error} ({detail})")
                    }));
                }
            }
            Step::Download { url, dest, .. } => {
                self.downloader
                    .download(url, dest)
                    .map_err(|e| failed(e.to_string()))?;
            }
            Step::CreateDir(path) => {
                fs::create_dir_all(path).map_err(|e| failed(e.to_string()))?;
            }
            Step::RemoveDir(path) => {
                if path.exists() {
                    fs::remove_dir_all(path).map_err(|e| failed(e.to_string()))?;
                }
            }
            Step::Notice(text) => {
                info!("{}", text);
                tracker.notices.push(text.clone());
            }
        }
        Ok(())
    }

    fn verify(&self, procedure: &Procedure) -> Result<()> {
        let failed = |message: String| DevopsError::VerificationFailed {
            tool: procedure.tool.to_string(),
            message,
        };
        match &procedure.verify {
            Verification::Command(command) => match self.runner.run(command) {
                Ok(result) if result.success => {
                    debug!("{} verified: {}", procedure.tool, result.summary());
                    Ok(())
                }
                Ok(result) => Err(failed(format!(
                    "`{}` exited with {:?}",
                    command.display(),
                    result.exit_code
                ))),
                Err(e) => Err(failed(e.to_string())),
            },
            Verification::FileExists(path) if path.exists() => Ok(()),
            Verification::FileExists(path) => {
                Err(failed(format!("{} is missing", path.display())))
            }
            Verification::Skip => Ok(()),
        }
    }
}

/// Whether `output` names `version` as a whole version token.
fn reports_version(output: &str, version: &str) -> bool {
    let wanted = version.strip_prefix('v').unwrap_or(version);
    REPORTED_VERSION
        .captures_iter(output)
        .any(|caps| &caps[1] == wanted)
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
