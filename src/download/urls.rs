//! Vendor download URL templates.

use crate::platform::{Arch, OsFamily};
use crate::tools::ToolIdentity;
use crate::versions::SENTINEL_LATEST;

/// Download URL for a concrete `version` of `tool` on `os`, for the host
/// architecture.
///
/// Returns `None` when no template exists for the pair. `latest` only
/// produces a URL for vendors that publish a stable alias for it; other
/// tools need the version resolved first.
pub fn build_url(tool: ToolIdentity, version: &str, os: OsFamily) -> Option<String> {
    build_url_for_arch(tool, version, os, Arch::host())
}

/// [`build_url`] for an explicit architecture.
pub fn build_url_for_arch(
    tool: ToolIdentity,
    version: &str,
    os: OsFamily,
    arch: Arch,
) -> Option<String> {
    let version = version.trim().trim_start_matches('v');
    if version == SENTINEL_LATEST {
        return latest_alias(tool, os, arch);
    }

    let os_name = match os {
        OsFamily::Linux | OsFamily::Darwin | OsFamily::Windows => os.as_str(),
        OsFamily::Unknown => return None,
    };
    let arch_name = arch.as_str();
    let windows = os == OsFamily::Windows;

    let url = match tool {
        ToolIdentity::Kubectl => format!(
            "https://dl.k8s.io/release/v{version}/bin/{os_name}/{arch_name}/kubectl{}",
            if windows { ".exe" } else { "" }
        ),
        ToolIdentity::Helm => format!(
            "https://get.helm.sh/helm-v{version}-{os_name}-{arch_name}.{}",
            if windows { "zip" } else { "tar.gz" }
        ),
        ToolIdentity::Terraform => format!(
            "https://releases.hashicorp.com/terraform/{version}/terraform_{version}_{os_name}_{arch_name}.zip"
        ),
        ToolIdentity::Jenkins => format!("https://get.jenkins.io/war-stable/{version}/jenkins.war"),
        ToolIdentity::Prometheus => format!(
            "https://github.com/prometheus/prometheus/releases/download/v{version}/prometheus-{version}.{os_name}-{arch_name}.{}",
            if windows { "zip" } else { "tar.gz" }
        ),
        ToolIdentity::Awscli => match os {
            OsFamily::Linux => format!(
                "https://awscli.amazonaws.com/awscli-exe-linux-{}-{version}.zip",
                arch.uname()
            ),
            OsFamily::Darwin => format!("https://awscli.amazonaws.com/AWSCLIV2-{version}.pkg"),
            _ => format!("https://awscli.amazonaws.com/AWSCLIV2-{version}.msi"),
        },
        ToolIdentity::Gcloud => {
            if windows {
                return None;
            }
            format!(
                "https://dl.google.com/dl/cloudsdk/channels/rapid/downloads/google-cloud-cli-{version}-{os_name}-{}.tar.gz",
                gcloud_arch(arch)
            )
        }
        ToolIdentity::Docker | ToolIdentity::Az => return None,
    };
    Some(url)
}

/// Unversioned "current release" URLs.
fn latest_alias(tool: ToolIdentity, os: OsFamily, arch: Arch) -> Option<String> {
    match (tool, os) {
        (ToolIdentity::Awscli, OsFamily::Linux) => Some(format!(
            "https://awscli.amazonaws.com/awscli-exe-linux-{}.zip",
            arch.uname()
        )),
        (ToolIdentity::Awscli, OsFamily::Darwin) => {
            Some("https://awscli.amazonaws.com/AWSCLIV2.pkg".to_string())
        }
        (ToolIdentity::Awscli, OsFamily::Windows) => {
            Some("https://awscli.amazonaws.com/AWSCLIV2.msi".to_string())
        }
        (ToolIdentity::Gcloud, OsFamily::Linux | OsFamily::Darwin) => Some(format!(
            "https://dl.google.com/dl/cloudsdk/channels/rapid/downloads/google-cloud-cli-{}-{}.tar.gz",
            os.as_str(),
            gcloud_arch(arch)
        )),
        _ => None,
    }
}

fn gcloud_arch(arch: Arch) -> &'static str {
    match arch {
        Arch::Amd64 => "x86_64",
        Arch::Arm64 => "arm",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(tool: ToolIdentity, version: &str, os: OsFamily) -> Option<String> {
        build_url_for_arch(tool, version, os, Arch::Amd64)
    }

    #[test]
    fn jenkins_war_is_os_independent() {
        for os in [OsFamily::Linux, OsFamily::Darwin, OsFamily::Windows] {
            assert_eq!(
                url(ToolIdentity::Jenkins, "2.401.3", os).unwrap(),
                "https://get.jenkins.io/war-stable/2.401.3/jenkins.war"
            );
        }
    }

    #[test]
    fn kubectl_urls() {
        assert_eq!(
            url(ToolIdentity::Kubectl, "1.28.0", OsFamily::Linux).unwrap(),
            "https://dl.k8s.io/release/v1.28.0/bin/linux/amd64/kubectl"
        );
        assert_eq!(
            url(ToolIdentity::Kubectl, "1.28.0", OsFamily::Darwin).unwrap(),
            "https://dl.k8s.io/release/v1.28.0/bin/darwin/amd64/kubectl"
        );
        assert_eq!(
            url(ToolIdentity::Kubectl, "1.28.0", OsFamily::Windows).unwrap(),
            "https://dl.k8s.io/release/v1.28.0/bin/windows/amd64/kubectl.exe"
        );
    }

    #[test]
    fn helm_windows_uses_zip() {
        assert_eq!(
            url(ToolIdentity::Helm, "3.12.0", OsFamily::Linux).unwrap(),
            "https://get.helm.sh/helm-v3.12.0-linux-amd64.tar.gz"
        );
        assert_eq!(
            url(ToolIdentity::Helm, "3.12.0", OsFamily::Windows).unwrap(),
            "https://get.helm.sh/helm-v3.12.0-windows-amd64.zip"
        );
    }

    #[test]
    fn terraform_url() {
        assert_eq!(
            url(ToolIdentity::Terraform, "1.6.0", OsFamily::Darwin).unwrap(),
            "https://releases.hashicorp.com/terraform/1.6.0/terraform_1.6.0_darwin_amd64.zip"
        );
    }

    #[test]
    fn arm64_is_templated() {
        assert_eq!(
            build_url_for_arch(ToolIdentity::Helm, "3.12.0", OsFamily::Darwin, Arch::Arm64)
                .unwrap(),
            "https://get.helm.sh/helm-v3.12.0-darwin-arm64.tar.gz"
        );
        assert_eq!(
            build_url_for_arch(ToolIdentity::Awscli, "2.13.0", OsFamily::Linux, Arch::Arm64)
                .unwrap(),
            "https://awscli.amazonaws.com/awscli-exe-linux-aarch64-2.13.0.zip"
        );
    }

    #[test]
    fn prometheus_urls() {
        assert_eq!(
            url(ToolIdentity::Prometheus, "2.45.0", OsFamily::Linux).unwrap(),
            "https://github.com/prometheus/prometheus/releases/download/v2.45.0/prometheus-2.45.0.linux-amd64.tar.gz"
        );
        assert!(url(ToolIdentity::Prometheus, "2.45.0", OsFamily::Windows)
            .unwrap()
            .ends_with("windows-amd64.zip"));
    }

    #[test]
    fn no_template_yields_none() {
        assert_eq!(url(ToolIdentity::Docker, "4.10.0", OsFamily::Linux), None);
        assert_eq!(url(ToolIdentity::Az, "2.50.0", OsFamily::Windows), None);
        assert_eq!(url(ToolIdentity::Gcloud, "463.0.0", OsFamily::Windows), None);
        assert_eq!(url(ToolIdentity::Helm, "3.12.0", OsFamily::Unknown), None);
    }

    #[test]
    fn latest_needs_resolution_except_for_aliases() {
        assert_eq!(url(ToolIdentity::Kubectl, "latest", OsFamily::Linux), None);
        assert_eq!(
            url(ToolIdentity::Awscli, "latest", OsFamily::Linux).unwrap(),
            "https://awscli.amazonaws.com/awscli-exe-linux-x86_64.zip"
        );
        assert_eq!(
            url(ToolIdentity::Gcloud, "latest", OsFamily::Darwin).unwrap(),
            "https://dl.google.com/dl/cloudsdk/channels/rapid/downloads/google-cloud-cli-darwin-x86_64.tar.gz"
        );
    }

    #[test]
    fn leading_v_is_tolerated() {
        assert_eq!(
            url(ToolIdentity::Kubectl, "v1.28.0", OsFamily::Linux),
            url(ToolIdentity::Kubectl, "1.28.0", OsFamily::Linux)
        );
    }
}
