//! Installation procedure model.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::shell::CommandSpec;
use crate::tools::ToolIdentity;

/// What a run does to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Install,
    Uninstall,
    Update,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Update => "update",
        }
    }

    /// Whether prerequisite packages are required first.
    pub fn needs_dependencies(&self) -> bool {
        !matches!(self, Self::Uninstall)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work. Steps run in order and the first failure aborts the
/// rest.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Run an external command.
    Run { label: String, command: CommandSpec },
    /// Fetch an artifact.
    Download {
        label: String,
        url: String,
        dest: PathBuf,
    },
    /// Create a user-owned directory.
    CreateDir(PathBuf),
    /// Remove a user-owned directory tree if present.
    RemoveDir(PathBuf),
    /// Something the user has to know or do by hand.
    Notice(String),
}

impl Step {
    pub fn run(label: impl Into<String>, command: CommandSpec) -> Self {
        Self::Run {
            label: label.into(),
            command,
        }
    }

    pub fn download(label: impl Into<String>, url: impl Into<String>, dest: PathBuf) -> Self {
        Self::Download {
            label: label.into(),
            url: url.into(),
            dest,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Run { label, .. } | Self::Download { label, .. } => label.clone(),
            Self::CreateDir(path) => format!("create {}", path.display()),
            Self::RemoveDir(path) => format!("remove {}", path.display()),
            Self::Notice(_) => "notice".to_string(),
        }
    }
}

/// Post-install check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// The command must exit successfully.
    Command(CommandSpec),
    /// The file must exist.
    FileExists(PathBuf),
    Skip,
}

/// Ordered steps for one (tool, action, platform, version) combination.
/// Built and executed immediately; never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub tool: ToolIdentity,
    pub action: Action,
    /// Human-readable mechanism, e.g. "apt-get" or "direct download".
    pub method: String,
    pub steps: Vec<Step>,
    pub verify: Verification,
    /// Caveats known while planning, e.g. an ignored version pin.
    pub warnings: Vec<String>,
}

impl Procedure {
    pub fn new(tool: ToolIdentity, action: Action, method: impl Into<String>) -> Self {
        Self {
            tool,
            action,
            method: method.into(),
            steps: Vec::new(),
            verify: Verification::Skip,
            warnings: Vec::new(),
        }
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Commands this procedure would run, rendered for display.
    pub fn command_lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::Run { command, .. } => Some(command.display()),
                _ => None,
            })
            .collect()
    }
}
