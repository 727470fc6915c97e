//! Per-tool installation tables.
//!
//! Each tool is described once as data: which mechanism to use on each
//! platform branch, the repositories and packages involved, and how to
//! check the result. The generic planner in [`super::plan`] turns a recipe
//! into concrete steps.
//!
//! Templates may contain `{version}`, `{os}`, `{arch}`, `{codename}`,
//! `{distro}` and `{rpm_family}` placeholders.

use crate::platform::{OsFamily, PackageManager, PlatformProfile};
use crate::tools::ToolIdentity;
use crate::versions::VersionRequest;

/// Extra package source a native manager needs before it can find the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repo {
    /// Signed apt source: the key is de-armored into `/etc/apt/keyrings`
    /// and `source` is written to `/etc/apt/sources.list.d/<name>.list`.
    Apt {
        name: &'static str,
        key_url: &'static str,
        source: &'static str,
    },
    /// `.repo` file fetched from the vendor.
    RpmRemote {
        name: &'static str,
        url: &'static str,
    },
    /// `.repo` file written from literal contents.
    RpmInline {
        name: &'static str,
        contents: &'static str,
    },
}

/// What a direct download contains and where it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The artifact is the executable itself.
    Binary { name: &'static str },
    /// Archive holding the executable at `inner`.
    ArchiveBinary {
        name: &'static str,
        inner: &'static str,
    },
    /// Archive unpacked into `<install_root>/<dir>`.
    Extract {
        dir: &'static str,
        executable: &'static str,
    },
    /// Jenkins WAR kept under `<install_root>/jenkins`.
    War,
    /// AWS CLI bundle with its own `install` script.
    AwsBundle,
    /// macOS installer package.
    MacPkg,
    /// Google Cloud SDK tarball with `install.sh`.
    GcloudBundle,
}

/// Installation mechanism for one platform branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Native apt/yum/dnf packages, optionally from an extra repository.
    /// `pin` replaces the first package when an exact version is requested.
    Packages {
        packages: &'static [&'static str],
        repo: Option<Repo>,
        pin: Option<&'static str>,
    },
    Brew {
        formula: &'static str,
        cask: bool,
        tap: Option<&'static str>,
        /// Executable name when it differs from the tool's usual command.
        bin: Option<&'static str>,
    },
    Winget { id: &'static str },
    Download(Layout),
}

impl Method {
    pub fn describe(&self, platform: &PlatformProfile) -> String {
        match self {
            Self::Packages { .. } => platform
                .package_manager()
                .map(|pm| pm.program().to_string())
                .unwrap_or_else(|| "package manager".to_string()),
            Self::Brew { .. } => "homebrew".to_string(),
            Self::Winget { .. } => "winget".to_string(),
            Self::Download(_) => "direct download".to_string(),
        }
    }
}

/// How `update` is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Re-run install.
    Reinstall,
    /// Uninstall, then install.
    UninstallFirst,
    /// Run the tool's own updater with these arguments.
    Native(&'static [&'static str]),
}

/// Everything needed to install, update and remove one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolRecipe {
    pub tool: ToolIdentity,
    /// Prints the installed version; exit status decides verification.
    pub version_command: &'static [&'static str],
    pub apt: Method,
    pub rpm: Method,
    pub darwin: Method,
    /// Used on macOS instead of `darwin` when an exact version is requested.
    pub darwin_pinned: Option<Method>,
    pub windows: Method,
    pub update: UpdatePolicy,
}

impl ToolRecipe {
    /// Platform branch for `platform`; `None` when the host is unsupported.
    pub fn method_for(&self, platform: &PlatformProfile, version: &VersionRequest) -> Option<Method> {
        match (platform.os, platform.package_manager()?) {
            (OsFamily::Linux, PackageManager::Apt) => Some(self.apt),
            (OsFamily::Linux, PackageManager::Yum | PackageManager::Dnf) => Some(self.rpm),
            (OsFamily::Darwin, _) => match (version, self.darwin_pinned) {
                (VersionRequest::Exact(_), Some(pinned)) => Some(pinned),
                _ => Some(self.darwin),
            },
            (OsFamily::Windows, _) => Some(self.windows),
            _ => None,
        }
    }
}

const KUBECTL_BINARY: Method = Method::Download(Layout::Binary { name: "kubectl" });
const HELM_ARCHIVE: Method = Method::Download(Layout::ArchiveBinary {
    name: "helm",
    inner: "{os}-{arch}/helm",
});
const TERRAFORM_ARCHIVE: Method = Method::Download(Layout::ArchiveBinary {
    name: "terraform",
    inner: "terraform",
});
const PROMETHEUS_EXTRACT: Method = Method::Download(Layout::Extract {
    dir: "prometheus",
    executable: "prometheus",
});

const HASHICORP_RPM: Repo = Repo::RpmRemote {
    name: "hashicorp",
    url: "https://rpm.releases.hashicorp.com/{rpm_family}/hashicorp.repo",
};

const AZURE_CLI_REPO: &str = "[azure-cli]
name=Azure CLI
baseurl=https://packages.microsoft.com/yumrepos/azure-cli
enabled=1
gpgcheck=1
gpgkey=https://packages.microsoft.com/keys/microsoft.asc
";

/// The installation table for `tool`.
pub fn recipe(tool: ToolIdentity) -> ToolRecipe {
    match tool {
        ToolIdentity::Docker => ToolRecipe {
            tool,
            version_command: &["docker", "--version"],
            apt: Method::Packages {
                packages: &["docker-ce", "docker-ce-cli", "containerd.io"],
                repo: Some(Repo::Apt {
                    name: "docker",
                    key_url: "https://download.docker.com/linux/{distro}/gpg",
                    source: "deb [arch={arch} signed-by=/etc/apt/keyrings/docker.gpg] https://download.docker.com/linux/{distro} {codename} stable",
                }),
                pin: None,
            },
            rpm: Method::Packages {
                packages: &["docker-ce", "docker-ce-cli", "containerd.io"],
                repo: Some(Repo::RpmRemote {
                    name: "docker-ce",
                    url: "https://download.docker.com/linux/{distro}/docker-ce.repo",
                }),
                pin: None,
            },
            darwin: Method::Brew {
                formula: "docker",
                cask: true,
                tap: None,
                bin: None,
            },
            darwin_pinned: None,
            windows: Method::Winget {
                id: "Docker.DockerDesktop",
            },
            update: UpdatePolicy::Reinstall,
        },
        ToolIdentity::Kubectl => ToolRecipe {
            tool,
            version_command: &["kubectl", "version", "--client"],
            apt: KUBECTL_BINARY,
            rpm: KUBECTL_BINARY,
            darwin: Method::Brew {
                formula: "kubectl",
                cask: false,
                tap: None,
                bin: None,
            },
            darwin_pinned: Some(KUBECTL_BINARY),
            windows: Method::Winget {
                id: "Kubernetes.kubectl",
            },
            update: UpdatePolicy::Reinstall,
        },
        ToolIdentity::Awscli => ToolRecipe {
            tool,
            version_command: &["aws", "--version"],
            apt: Method::Download(Layout::AwsBundle),
            rpm: Method::Download(Layout::AwsBundle),
            darwin: Method::Download(Layout::MacPkg),
            darwin_pinned: None,
            windows: Method::Winget { id: "Amazon.AWSCLI" },
            update: UpdatePolicy::Reinstall,
        },
        ToolIdentity::Gcloud => ToolRecipe {
            tool,
            version_command: &["gcloud", "--version"],
            apt: Method::Download(Layout::GcloudBundle),
            rpm: Method::Download(Layout::GcloudBundle),
            darwin: Method::Download(Layout::GcloudBundle),
            darwin_pinned: None,
            windows: Method::Winget {
                id: "Google.CloudSDK",
            },
            update: UpdatePolicy::Native(&["components", "update", "--quiet"]),
        },
        ToolIdentity::Az => ToolRecipe {
            tool,
            version_command: &["az", "--version"],
            apt: Method::Packages {
                packages: &["azure-cli"],
                repo: Some(Repo::Apt {
                    name: "microsoft",
                    key_url: "https://packages.microsoft.com/keys/microsoft.asc",
                    source: "deb [arch={arch} signed-by=/etc/apt/keyrings/microsoft.gpg] https://packages.microsoft.com/repos/azure-cli/ {codename} main",
                }),
                pin: Some("azure-cli={version}-1~{codename}"),
            },
            rpm: Method::Packages {
                packages: &["azure-cli"],
                repo: Some(Repo::RpmInline {
                    name: "azure-cli",
                    contents: AZURE_CLI_REPO,
                }),
                pin: Some("azure-cli-{version}"),
            },
            darwin: Method::Brew {
                formula: "azure-cli",
                cask: false,
                tap: None,
                bin: None,
            },
            darwin_pinned: None,
            windows: Method::Winget {
                id: "Microsoft.AzureCLI",
            },
            update: UpdatePolicy::Reinstall,
        },
        ToolIdentity::Jenkins => ToolRecipe {
            tool,
            version_command: &["jenkins", "--version"],
            apt: Method::Packages {
                packages: &["jenkins"],
                repo: Some(Repo::Apt {
                    name: "jenkins",
                    key_url: "https://pkg.jenkins.io/debian-stable/jenkins.io-2023.key",
                    source: "deb [signed-by=/etc/apt/keyrings/jenkins.gpg] https://pkg.jenkins.io/debian-stable binary/",
                }),
                pin: Some("jenkins={version}"),
            },
            rpm: Method::Packages {
                packages: &["jenkins"],
                repo: Some(Repo::RpmRemote {
                    name: "jenkins",
                    url: "https://pkg.jenkins.io/redhat-stable/jenkins.repo",
                }),
                pin: Some("jenkins-{version}"),
            },
            darwin: Method::Brew {
                formula: "jenkins-lts",
                cask: false,
                tap: None,
                bin: Some("jenkins-lts"),
            },
            darwin_pinned: None,
            windows: Method::Download(Layout::War),
            update: UpdatePolicy::UninstallFirst,
        },
        ToolIdentity::Helm => ToolRecipe {
            tool,
            version_command: &["helm", "version"],
            apt: Method::Packages {
                packages: &["helm"],
                repo: Some(Repo::Apt {
                    name: "helm",
                    key_url: "https://baltocdn.com/helm/signing.asc",
                    source: "deb [arch={arch} signed-by=/etc/apt/keyrings/helm.gpg] https://baltocdn.com/helm/stable/debian/ all main",
                }),
                pin: Some("helm={version}-1"),
            },
            rpm: HELM_ARCHIVE,
            darwin: Method::Brew {
                formula: "helm",
                cask: false,
                tap: None,
                bin: None,
            },
            darwin_pinned: Some(HELM_ARCHIVE),
            windows: Method::Winget { id: "Helm.Helm" },
            update: UpdatePolicy::Reinstall,
        },
        ToolIdentity::Prometheus => ToolRecipe {
            tool,
            version_command: &["prometheus", "--version"],
            apt: PROMETHEUS_EXTRACT,
            rpm: PROMETHEUS_EXTRACT,
            darwin: Method::Brew {
                formula: "prometheus",
                cask: false,
                tap: None,
                bin: None,
            },
            darwin_pinned: None,
            windows: PROMETHEUS_EXTRACT,
            update: UpdatePolicy::Reinstall,
        },
        ToolIdentity::Terraform => ToolRecipe {
            tool,
            version_command: &["terraform", "version"],
            apt: Method::Packages {
                packages: &["terraform"],
                repo: Some(Repo::Apt {
                    name: "hashicorp",
                    key_url: "https://apt.releases.hashicorp.com/gpg",
                    source: "deb [arch={arch} signed-by=/etc/apt/keyrings/hashicorp.gpg] https://apt.releases.hashicorp.com {codename} main",
                }),
                pin: Some("terraform={version}-1"),
            },
            rpm: Method::Packages {
                packages: &["terraform"],
                repo: Some(HASHICORP_RPM),
                pin: Some("terraform-{version}"),
            },
            darwin: Method::Brew {
                formula: "hashicorp/tap/terraform",
                cask: false,
                tap: Some("hashicorp/tap"),
                bin: None,
            },
            darwin_pinned: Some(TERRAFORM_ARCHIVE),
            windows: Method::Winget {
                id: "Hashicorp.Terraform",
            },
            update: UpdatePolicy::Reinstall,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DistroFamily;

    fn exact(v: &str) -> VersionRequest {
        VersionRequest::Exact(v.to_string())
    }

    #[test]
    fn every_tool_has_a_recipe_for_itself() {
        for tool in ToolIdentity::ALL {
            let recipe = recipe(tool);
            assert_eq!(recipe.tool, tool);
            assert!(!recipe.version_command.is_empty());
        }
    }

    #[test]
    fn linux_branches_follow_package_manager() {
        let recipe = recipe(ToolIdentity::Helm);
        let ubuntu = PlatformProfile::linux(DistroFamily::Ubuntu);
        let fedora = PlatformProfile::linux(DistroFamily::Fedora);

        assert!(matches!(
            recipe.method_for(&ubuntu, &VersionRequest::Latest),
            Some(Method::Packages { .. })
        ));
        assert_eq!(
            recipe.method_for(&fedora, &VersionRequest::Latest),
            Some(HELM_ARCHIVE)
        );
    }

    #[test]
    fn darwin_exact_version_prefers_pinned_method() {
        let recipe = recipe(ToolIdentity::Terraform);
        let mac = PlatformProfile::new(OsFamily::Darwin);

        assert!(matches!(
            recipe.method_for(&mac, &VersionRequest::Latest),
            Some(Method::Brew { .. })
        ));
        assert_eq!(
            recipe.method_for(&mac, &exact("1.6.0")),
            Some(TERRAFORM_ARCHIVE)
        );
    }

    #[test]
    fn darwin_without_pinned_method_keeps_brew() {
        let recipe = recipe(ToolIdentity::Az);
        let mac = PlatformProfile::new(OsFamily::Darwin);
        assert!(matches!(
            recipe.method_for(&mac, &exact("2.50.0")),
            Some(Method::Brew { .. })
        ));
    }

    #[test]
    fn unsupported_hosts_have_no_branch() {
        let recipe = recipe(ToolIdentity::Docker);
        assert_eq!(
            recipe.method_for(&PlatformProfile::new(OsFamily::Linux), &VersionRequest::Latest),
            None
        );
        assert_eq!(
            recipe.method_for(&PlatformProfile::new(OsFamily::Unknown), &VersionRequest::Latest),
            None
        );
    }

    #[test]
    fn update_policies() {
        assert_eq!(recipe(ToolIdentity::Jenkins).update, UpdatePolicy::UninstallFirst);
        assert!(matches!(
            recipe(ToolIdentity::Gcloud).update,
            UpdatePolicy::Native(_)
        ));
        assert_eq!(recipe(ToolIdentity::Kubectl).update, UpdatePolicy::Reinstall);
    }
}
