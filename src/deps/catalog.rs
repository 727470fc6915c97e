//! Static prerequisite table.
//!
//! Keyed by (tool, OS family, distribution). Distributions missing from a
//! tool's Linux entry fall back to the Ubuntu entry.

use crate::platform::{DistroFamily, OsFamily};
use crate::tools::ToolIdentity;

/// Prerequisite packages for `tool` on the given platform.
///
/// Linux without a recognized distribution has no entry: the caller cannot
/// know which package names apply.
pub fn lookup(
    tool: ToolIdentity,
    os: OsFamily,
    distro: Option<DistroFamily>,
) -> &'static [&'static str] {
    match os {
        OsFamily::Linux => match distro {
            Some(distro) => linux(tool, distro).unwrap_or_else(|| {
                linux(tool, DistroFamily::Ubuntu).unwrap_or_default()
            }),
            None => &[],
        },
        OsFamily::Darwin => darwin(tool),
        OsFamily::Windows => windows(tool),
        OsFamily::Unknown => &[],
    }
}

fn linux(tool: ToolIdentity, distro: DistroFamily) -> Option<&'static [&'static str]> {
    use DistroFamily::*;
    use ToolIdentity::*;

    let packages: &'static [&'static str] = match (tool, distro) {
        (Docker, Ubuntu | Debian) => &[
            "apt-transport-https",
            "ca-certificates",
            "curl",
            "gnupg",
            "lsb-release",
        ],
        (Docker, Centos | Rhel) => &["yum-utils", "device-mapper-persistent-data", "lvm2"],
        (Docker, Fedora) => &["dnf-plugins-core", "device-mapper-persistent-data", "lvm2"],

        (Jenkins, Ubuntu | Debian) => &["openjdk-21-jre", "fontconfig", "gnupg"],
        (Jenkins, Centos | Rhel | Fedora) => &["java-21-openjdk", "fontconfig"],

        (Helm, Ubuntu | Debian) => &["curl", "gnupg", "apt-transport-https"],
        (Helm, Centos | Rhel | Fedora) => &["curl"],

        (Az, Ubuntu | Debian) => &["curl", "lsb-release", "gnupg"],
        (Az, Centos | Rhel | Fedora) => &["curl"],

        (Terraform, Ubuntu | Debian) => &["curl", "unzip", "gnupg"],
        (Terraform, Centos | Rhel) => &["curl", "unzip", "yum-utils"],
        (Terraform, Fedora) => &["curl", "unzip", "dnf-plugins-core"],

        (Kubectl | Prometheus, Ubuntu) => &["curl"],
        (Awscli, Ubuntu) => &["unzip"],
        (Gcloud, Ubuntu) => &["curl", "python3", "python3-pip"],

        _ => return None,
    };
    Some(packages)
}

fn darwin(tool: ToolIdentity) -> &'static [&'static str] {
    match tool {
        ToolIdentity::Jenkins => &["openjdk@21"],
        _ => &[],
    }
}

fn windows(tool: ToolIdentity) -> &'static [&'static str] {
    match tool {
        ToolIdentity::Jenkins => &["openjdk-21-jre"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docker_on_ubuntu() {
        let deps = lookup(ToolIdentity::Docker, OsFamily::Linux, Some(DistroFamily::Ubuntu));
        assert_eq!(
            deps,
            &["apt-transport-https", "ca-certificates", "curl", "gnupg", "lsb-release"]
        );
    }

    #[test]
    fn docker_on_fedora_uses_dnf_plugins() {
        let deps = lookup(ToolIdentity::Docker, OsFamily::Linux, Some(DistroFamily::Fedora));
        assert!(deps.contains(&"dnf-plugins-core"));
    }

    #[test]
    fn jenkins_needs_java_everywhere() {
        assert!(lookup(ToolIdentity::Jenkins, OsFamily::Linux, Some(DistroFamily::Rhel))
            .contains(&"java-21-openjdk"));
        assert_eq!(lookup(ToolIdentity::Jenkins, OsFamily::Darwin, None), &["openjdk@21"]);
        assert_eq!(lookup(ToolIdentity::Jenkins, OsFamily::Windows, None), &["openjdk-21-jre"]);
    }

    #[test]
    fn darwin_and_windows_empty_for_other_tools() {
        for tool in ToolIdentity::ALL {
            if tool == ToolIdentity::Jenkins {
                continue;
            }
            assert!(lookup(tool, OsFamily::Darwin, None).is_empty(), "{tool}");
            assert!(lookup(tool, OsFamily::Windows, None).is_empty(), "{tool}");
        }
    }

    #[test]
    fn distro_without_entry_falls_back_to_ubuntu() {
        assert_eq!(
            lookup(ToolIdentity::Gcloud, OsFamily::Linux, Some(DistroFamily::Fedora)),
            lookup(ToolIdentity::Gcloud, OsFamily::Linux, Some(DistroFamily::Ubuntu))
        );
        assert_eq!(
            lookup(ToolIdentity::Awscli, OsFamily::Linux, Some(DistroFamily::Centos)),
            &["unzip"]
        );
    }

    #[test]
    fn unrecognized_distribution_has_no_entry() {
        assert!(lookup(ToolIdentity::Terraform, OsFamily::Linux, None).is_empty());
    }

    #[test]
    fn every_tool_has_linux_entry_for_every_distro() {
        let distros = [
            DistroFamily::Ubuntu,
            DistroFamily::Debian,
            DistroFamily::Centos,
            DistroFamily::Rhel,
            DistroFamily::Fedora,
        ];
        for tool in ToolIdentity::ALL {
            for distro in distros {
                assert!(!lookup(tool, OsFamily::Linux, Some(distro)).is_empty());
            }
        }
    }
}
