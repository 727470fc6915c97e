//! The closed set of tools this installer manages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DevopsError;

/// A managed tool.
///
/// Every operation in the engine is keyed by one of these, and every table
/// (dependencies, release endpoints, download templates, install recipes)
/// matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolIdentity {
    Docker,
    Kubectl,
    Awscli,
    Gcloud,
    Az,
    Jenkins,
    Helm,
    Prometheus,
    Terraform,
}

impl ToolIdentity {
    /// All tools, in menu order.
    pub const ALL: [ToolIdentity; 9] = [
        ToolIdentity::Docker,
        ToolIdentity::Kubectl,
        ToolIdentity::Awscli,
        ToolIdentity::Gcloud,
        ToolIdentity::Az,
        ToolIdentity::Jenkins,
        ToolIdentity::Helm,
        ToolIdentity::Prometheus,
        ToolIdentity::Terraform,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolIdentity::Docker => "docker",
            ToolIdentity::Kubectl => "kubectl",
            ToolIdentity::Awscli => "awscli",
            ToolIdentity::Gcloud => "gcloud",
            ToolIdentity::Az => "az",
            ToolIdentity::Jenkins => "jenkins",
            ToolIdentity::Helm => "helm",
            ToolIdentity::Prometheus => "prometheus",
            ToolIdentity::Terraform => "terraform",
        }
    }

    /// One-line description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            ToolIdentity::Docker => "Docker - Container platform",
            ToolIdentity::Kubectl => "kubectl - Kubernetes CLI",
            ToolIdentity::Awscli => "AWS CLI - Amazon Web Services CLI",
            ToolIdentity::Gcloud => "Google Cloud CLI",
            ToolIdentity::Az => "Azure CLI - Microsoft Azure CLI",
            ToolIdentity::Jenkins => "Jenkins - Automation server",
            ToolIdentity::Helm => "Helm - Kubernetes package manager",
            ToolIdentity::Prometheus => "Prometheus - Monitoring system",
            ToolIdentity::Terraform => "Terraform - Infrastructure as code",
        }
    }
}

impl fmt::Display for ToolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolIdentity {
    type Err = DevopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        ToolIdentity::ALL
            .into_iter()
            .find(|tool| tool.as_str() == name)
            .ok_or(DevopsError::UnknownTool { name })
    }
}
