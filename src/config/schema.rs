//! Settings schema.
//!
//! Maps to `~/.devops-cli/config.yml`. Every key is optional; omitted keys
//! take the defaults below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::tools::ToolIdentity;

/// Root settings structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Upstream HTTP behavior
    pub network: NetworkSettings,

    /// Version cache behavior
    pub cache: CacheSettings,

    /// Time limits for external commands
    pub timeouts: Timeouts,

    /// Directory for user-space installs (Prometheus, Jenkins WAR, Cloud SDK).
    /// Defaults to `~/.devops-cli/opt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_root: Option<PathBuf>,

    /// Replacement fallback version lists, per tool
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fallback_versions: BTreeMap<ToolIdentity, Vec<String>>,
}

impl Settings {
    /// Effective install root.
    pub fn install_root(&self) -> PathBuf {
        self.install_root.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(".devops-cli")
                .join("opt")
        })
    }
}

/// Upstream HTTP settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per upstream request (including the first)
    pub max_attempts: u32,

    /// Delay before the second attempt; doubled for each further attempt
    pub backoff_initial_ms: u64,

    /// GitHub REST API base URL
    pub github_api_url: String,

    /// Environment variable holding an optional GitHub token
    pub github_token_env: String,

    /// Docker Desktop release notes page, scraped when the release API fails
    pub docker_release_notes_url: String,

    pub user_agent: String,
}

impl NetworkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_initial(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_attempts: 3,
            backoff_initial_ms: 1000,
            github_api_url: "https://api.github.com".to_string(),
            github_token_env: "GITHUB_TOKEN".to_string(),
            docker_release_notes_url: "https://docs.docker.com/desktop/release-notes/".to_string(),
            user_agent: format!("devops-cli/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Version cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Seconds a fetched version list stays fresh
    pub freshness_secs: u64,
}

impl CacheSettings {
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            freshness_secs: 300,
        }
    }
}

/// Time limits for external commands, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Package queries (`dpkg -l`, `rpm -q`, `brew list`)
    pub query_secs: u64,

    /// Short commands (key imports, repository files, version checks)
    pub quick_secs: u64,

    /// Package index refresh (`apt-get update`, `yum makecache`)
    pub index_refresh_secs: u64,

    /// Package installs and installer runs
    pub install_secs: u64,

    /// Artifact downloads
    pub download_secs: u64,
}

impl Timeouts {
    pub fn query(&self) -> Duration {
        Duration::from_secs(self.query_secs)
    }

    pub fn quick(&self) -> Duration {
        Duration::from_secs(self.quick_secs)
    }

    pub fn index_refresh(&self) -> Duration {
        Duration::from_secs(self.index_refresh_secs)
    }

    pub fn install(&self) -> Duration {
        Duration::from_secs(self.install_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query_secs: 10,
            quick_secs: 30,
            index_refresh_secs: 60,
            install_secs: 300,
            download_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.network.timeout_secs, 10);
        assert_eq!(settings.network.max_attempts, 3);
        assert_eq!(settings.network.backoff_initial_ms, 1000);
        assert_eq!(settings.cache.freshness_secs, 300);
        assert_eq!(settings.timeouts.query_secs, 10);
        assert_eq!(settings.timeouts.index_refresh_secs, 60);
        assert_eq!(settings.timeouts.install_secs, 300);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = "network:\n  max_attempts: 5\ncache:\n  freshness_secs: 60\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.network.max_attempts, 5);
        assert_eq!(settings.network.timeout_secs, 10);
        assert_eq!(settings.cache.freshness_secs, 60);
        assert_eq!(settings.timeouts, Timeouts::default());
    }

    #[test]
    fn fallback_versions_keyed_by_tool() {
        let yaml = "fallback_versions:\n  helm: ['3.14.0', '3.13.3']\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            settings.fallback_versions.get(&ToolIdentity::Helm).unwrap(),
            &vec!["3.14.0".to_string(), "3.13.3".to_string()]
        );
    }

    #[test]
    fn explicit_install_root_wins() {
        let settings = Settings {
            install_root: Some(PathBuf::from("/opt/devops")),
            ..Default::default()
        };
        assert_eq!(settings.install_root(), PathBuf::from("/opt/devops"));
    }

    #[test]
    fn default_install_root_under_dot_directory() {
        let root = Settings::default().install_root();
        assert!(root.ends_with(".devops-cli/opt"));
    }
}
