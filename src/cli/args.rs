//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::error::DevopsError;
use crate::tools::ToolIdentity;

/// devops-cli - Install, update and remove common DevOps tools.
#[derive(Debug, Parser)]
#[command(name = "devops-cli")]
#[command(author, version, long_about = None)]
#[command(about = "Install, update and remove common DevOps tools")]
pub struct Cli {
    /// Path to settings file (overrides ~/.devops-cli/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a tool
    Install(ToolArgs),

    /// Uninstall a tool
    Uninstall(ToolArgs),

    /// Update a tool, or every tool with `all`
    Update(UpdateArgs),

    /// Show installable versions of a tool
    Versions(VersionsArgs),

    /// Show or install a tool's prerequisites
    Deps(DepsArgs),

    /// List supported tools
    List,

    /// Show which tools are installed
    Status,

    /// Show the detected platform
    Platform,
}

/// Arguments for `install` and `uninstall`.
#[derive(Debug, Clone, Args)]
pub struct ToolArgs {
    /// Tool name (see `devops-cli list`)
    pub tool: ToolIdentity,

    /// Exact version, or `latest`
    #[arg(long)]
    pub version: Option<String>,
}

/// Arguments for `update`.
#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    /// Tool name, or `all`
    pub target: UpdateTarget,

    /// Exact version, or `latest`
    #[arg(long)]
    pub version: Option<String>,
}

/// Arguments for `versions`.
#[derive(Debug, Clone, Args)]
pub struct VersionsArgs {
    pub tool: ToolIdentity,
}

/// Arguments for `deps`.
#[derive(Debug, Clone, Args)]
pub struct DepsArgs {
    pub tool: ToolIdentity,

    /// Install missing prerequisites instead of only checking them
    #[arg(long)]
    pub install: bool,
}

/// What `update` acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    All,
    Tool(ToolIdentity),
}

impl FromStr for UpdateTarget {
    type Err = DevopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Tool)
        }
    }
}

impl fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Tool(tool) => write!(f, "{}", tool),
        }
    }
}
