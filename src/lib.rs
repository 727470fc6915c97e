//! devops-cli - Cross-platform installer for common DevOps tools.
//!
//! Installs, updates and removes a fixed catalog of tools (docker, kubectl,
//! awscli, gcloud, az, jenkins, helm, prometheus, terraform) using the
//! host's native package manager or the vendor's download artifacts.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings file loading and validation
//! - [`deps`] - Prerequisite packages per tool and platform
//! - [`download`] - Vendor download URLs and artifact fetching
//! - [`error`] - Error types and result aliases
//! - [`install`] - Per-tool recipes and the installation dispatcher
//! - [`platform`] - Host OS, distribution and architecture detection
//! - [`shell`] - External command execution
//! - [`tools`] - The tool catalog
//! - [`ui`] - Terminal output
//! - [`versions`] - Available-version discovery with caching and fallbacks
//!
//! # Example
//!
//! ```
//! use devops_cli::download::build_url_for_arch;
//! use devops_cli::platform::{Arch, OsFamily};
//! use devops_cli::tools::ToolIdentity;
//!
//! let url = build_url_for_arch(ToolIdentity::Kubectl, "1.28.0", OsFamily::Linux, Arch::Amd64);
//! assert_eq!(
//!     url.as_deref(),
//!     Some("https://dl.k8s.io/release/v1.28.0/bin/linux/amd64/kubectl")
//! );
//! ```

pub mod cli;
pub mod config;
pub mod deps;
pub mod download;
pub mod error;
pub mod install;
pub mod platform;
pub mod shell;
pub mod tools;
pub mod ui;
pub mod versions;

pub use error::{DevopsError, Result};
