//! Error types for devops-cli operations.
//!
//! This module defines [`DevopsError`], the error type used throughout the
//! engine, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `DevopsError` for failures that callers branch on
//! - Use `anyhow::Error` (via `DevopsError::Other`) at the HTTP edge
//! - The installation dispatcher turns every error into an `Outcome`, so
//!   nothing below it reaches the user unformatted

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for devops-cli operations.
#[derive(Debug, Error)]
pub enum DevopsError {
    /// Settings file not found at an explicitly requested location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the settings file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Settings parsed but hold unusable values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Tool name outside the supported set.
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    /// No installation procedure exists for this operating system or distribution.
    #[error("Unsupported platform: {platform}")]
    UnsupportedPlatform { platform: String },

    /// One or more prerequisite packages could not be installed.
    #[error("Dependencies for {tool} could not be installed: {}", packages.join(", "))]
    DependencyFailure { tool: String, packages: Vec<String> },

    /// External command exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// External command exceeded its time limit and was killed.
    #[error("Command timed out after {timeout_secs}s: {command}")]
    CommandTimedOut { command: String, timeout_secs: u64 },

    /// Executable is not on PATH.
    #[error("Command not found: {program}")]
    CommandNotFound { program: String },

    /// A procedure step failed; the run was aborted.
    #[error("Step '{step}' failed: {message}")]
    StepFailed { step: String, message: String },

    /// Installation steps ran but the tool does not respond.
    #[error("{tool} did not pass verification: {message}")]
    VerificationFailed { tool: String, message: String },

    /// Upstream HTTP endpoint unreachable or returned a non-success status.
    #[error("Network request to {url} failed: {message}")]
    NetworkFailure { url: String, message: String },

    /// Upstream payload could not be interpreted.
    #[error("Could not parse {what}: {message}")]
    ParseFailure { what: String, message: String },

    /// No download URL template exists for this tool and OS.
    #[error("No download available for {tool} on {os}")]
    DownloadUnsupported { tool: String, os: String },

    /// Neither upstream nor fallback data yields a concrete version.
    #[error("Could not resolve a concrete version of {tool}")]
    VersionUnresolvable { tool: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for devops-cli operations.
pub type Result<T> = std::result::Result<T, DevopsError>;
