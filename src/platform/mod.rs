//! Host platform classification.
//!
//! Detection runs once per engine and produces an immutable
//! [`PlatformProfile`] that every other component reads from.

pub mod detection;

use std::fmt;

use serde::Serialize;

pub use detection::{classify_distro, detect_platform, detect_with, is_elevated, OsRelease};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    Darwin,
    Windows,
    Unknown,
}

impl OsFamily {
    /// Classify a Rust target OS name (`std::env::consts::OS`).
    pub fn from_target(os: &str) -> Self {
        match os {
            "linux" => OsFamily::Linux,
            "macos" => OsFamily::Darwin,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Unknown,
        }
    }

    /// Name used in download URLs and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::Darwin => "darwin",
            OsFamily::Windows => "windows",
            OsFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized Linux distributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistroFamily {
    Ubuntu,
    Debian,
    Centos,
    Rhel,
    Fedora,
}

impl DistroFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistroFamily::Ubuntu => "ubuntu",
            DistroFamily::Debian => "debian",
            DistroFamily::Centos => "centos",
            DistroFamily::Rhel => "rhel",
            DistroFamily::Fedora => "fedora",
        }
    }

    /// Native package manager for this distribution.
    pub fn package_manager(&self) -> PackageManager {
        match self {
            DistroFamily::Ubuntu | DistroFamily::Debian => PackageManager::Apt,
            DistroFamily::Centos | DistroFamily::Rhel => PackageManager::Yum,
            DistroFamily::Fedora => PackageManager::Dnf,
        }
    }

    /// True for distributions that install `.deb` packages.
    pub fn is_debian_like(&self) -> bool {
        matches!(self, DistroFamily::Ubuntu | DistroFamily::Debian)
    }
}

impl fmt::Display for DistroFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// System package manager used for prerequisites and native installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Apt,
    Yum,
    Dnf,
    Homebrew,
    Winget,
}

impl PackageManager {
    /// Executable name.
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Yum => "yum",
            PackageManager::Dnf => "dnf",
            PackageManager::Homebrew => "brew",
            PackageManager::Winget => "winget",
        }
    }
}

/// CPU architecture, as it appears in vendor download names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Architecture of the running binary. Anything that is not ARM is
    /// treated as x86-64, which is what vendors ship by default.
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Arch::Arm64,
            _ => Arch::Amd64,
        }
    }

    /// Go-style name (`amd64`, `arm64`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }

    /// `uname -m` style name (`x86_64`, `aarch64`).
    pub fn uname(&self) -> &'static str {
        match self {
            Arch::Amd64 => "x86_64",
            Arch::Arm64 => "aarch64",
        }
    }
}

/// Immutable description of the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformProfile {
    pub os: OsFamily,
    /// Set only on Linux, and only for recognized distributions.
    pub distro: Option<DistroFamily>,
    /// Raw distribution identifier (`ID=` from os-release), kept for messages.
    pub distro_id: Option<String>,
    /// Release codename (`VERSION_CODENAME=`), used in apt repository lines.
    pub codename: Option<String>,
    pub arch: Arch,
}

impl PlatformProfile {
    /// Profile for a non-Linux OS, or a Linux host with no os-release data.
    pub fn new(os: OsFamily) -> Self {
        Self {
            os,
            distro: None,
            distro_id: None,
            codename: None,
            arch: Arch::host(),
        }
    }

    /// Linux profile for a known distribution.
    pub fn linux(distro: DistroFamily) -> Self {
        Self {
            os: OsFamily::Linux,
            distro: Some(distro),
            distro_id: Some(distro.as_str().to_string()),
            codename: None,
            arch: Arch::host(),
        }
    }

    pub fn with_codename(mut self, codename: impl Into<String>) -> Self {
        self.codename = Some(codename.into());
        self
    }

    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// The package manager installation procedures and prerequisites use,
    /// or `None` when the host is unsupported.
    pub fn package_manager(&self) -> Option<PackageManager> {
        match self.os {
            OsFamily::Linux => self.distro.map(|d| d.package_manager()),
            OsFamily::Darwin => Some(PackageManager::Homebrew),
            OsFamily::Windows => Some(PackageManager::Winget),
            OsFamily::Unknown => None,
        }
    }

    /// True when installation procedures exist for this host.
    pub fn is_supported(&self) -> bool {
        self.package_manager().is_some()
    }

    /// Human-readable platform description.
    pub fn describe(&self) -> String {
        match (self.os, &self.distro_id) {
            (OsFamily::Linux, Some(id)) => format!("linux ({id})"),
            (OsFamily::Linux, None) => "linux (unrecognized distribution)".to_string(),
            (os, _) => os.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_family_from_target() {
        assert_eq!(OsFamily::from_target("linux"), OsFamily::Linux);
        assert_eq!(OsFamily::from_target("macos"), OsFamily::Darwin);
        assert_eq!(OsFamily::from_target("windows"), OsFamily::Windows);
        assert_eq!(OsFamily::from_target("freebsd"), OsFamily::Unknown);
    }

    #[test]
    fn distro_package_managers() {
        assert_eq!(DistroFamily::Ubuntu.package_manager(), PackageManager::Apt);
        assert_eq!(DistroFamily::Debian.package_manager(), PackageManager::Apt);
        assert_eq!(DistroFamily::Centos.package_manager(), PackageManager::Yum);
        assert_eq!(DistroFamily::Rhel.package_manager(), PackageManager::Yum);
        assert_eq!(DistroFamily::Fedora.package_manager(), PackageManager::Dnf);
    }

    #[test]
    fn linux_without_distro_is_unsupported() {
        let profile = PlatformProfile::new(OsFamily::Linux);
        assert!(!profile.is_supported());
        assert_eq!(profile.package_manager(), None);
        assert!(profile.describe().contains("unrecognized"));
    }

    #[test]
    fn darwin_and_windows_are_supported() {
        assert_eq!(
            PlatformProfile::new(OsFamily::Darwin).package_manager(),
            Some(PackageManager::Homebrew)
        );
        assert_eq!(
            PlatformProfile::new(OsFamily::Windows).package_manager(),
            Some(PackageManager::Winget)
        );
    }

    #[test]
    fn unknown_os_is_unsupported() {
        assert!(!PlatformProfile::new(OsFamily::Unknown).is_supported());
    }

    #[test]
    fn arch_names() {
        assert_eq!(Arch::Amd64.as_str(), "amd64");
        assert_eq!(Arch::Arm64.uname(), "aarch64");
    }
}
