//! Operating system and distribution detection.

use std::path::Path;

use tracing::debug;

use super::{DistroFamily, OsFamily, PlatformProfile};

const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// Parsed subset of an os-release file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsRelease {
    pub id: Option<String>,
    pub id_like: Option<String>,
    pub name: Option<String>,
    pub codename: Option<String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines; quotes around values are stripped.
    pub fn parse(content: &str) -> Self {
        let mut release = OsRelease::default();
        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "ID" => release.id = Some(value),
                "ID_LIKE" => release.id_like = Some(value),
                "NAME" => release.name = Some(value),
                "VERSION_CODENAME" => release.codename = Some(value),
                "UBUNTU_CODENAME" if release.codename.is_none() => release.codename = Some(value),
                _ => {}
            }
        }
        release
    }

    /// All identifying text, for substring classification.
    fn identifier(&self) -> String {
        [&self.id, &self.id_like, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Classify a distribution identifier by case-insensitive substring match.
///
/// More specific names are tested first: an Ubuntu release also mentions
/// `debian` in `ID_LIKE`, and CentOS mentions `rhel` and `fedora`.
pub fn classify_distro(identifier: &str) -> Option<DistroFamily> {
    let identifier = identifier.to_lowercase();
    if identifier.contains("ubuntu") {
        Some(DistroFamily::Ubuntu)
    } else if identifier.contains("debian") {
        Some(DistroFamily::Debian)
    } else if identifier.contains("centos") {
        Some(DistroFamily::Centos)
    } else if identifier.contains("rhel") || identifier.contains("red hat") {
        Some(DistroFamily::Rhel)
    } else if identifier.contains("fedora") {
        Some(DistroFamily::Fedora)
    } else {
        None
    }
}

/// Detect the running host.
pub fn detect_platform() -> PlatformProfile {
    let os = OsFamily::from_target(std::env::consts::OS);
    let release = if os == OsFamily::Linux {
        OS_RELEASE_PATHS
            .iter()
            .find_map(|path| std::fs::read_to_string(Path::new(path)).ok())
    } else {
        None
    };
    detect_with(os, release.as_deref())
}

/// Build a profile from an OS family and optional os-release content (for testing).
pub fn detect_with(os: OsFamily, os_release: Option<&str>) -> PlatformProfile {
    let mut profile = PlatformProfile::new(os);
    if os != OsFamily::Linux {
        return profile;
    }

    let Some(content) = os_release else {
        debug!("No os-release data found; distribution is unrecognized");
        return profile;
    };

    let release = OsRelease::parse(content);
    profile.distro = classify_distro(&release.identifier());
    profile.distro_id = release.id.clone().or(release.name.clone());
    profile.codename = release.codename;

    debug!(
        "Detected linux distribution {:?} (id {:?})",
        profile.distro, profile.distro_id
    );
    profile
}

/// Check if running with elevated privileges (root/admin).
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(windows)]
    {
        std::env::var("ADMIN").is_ok()
    }

    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}
