//! Known-good versions used when upstream cannot be reached.
//!
//! The compiled-in lists are refreshed at release time. Users can replace
//! any of them through `fallback_versions` in the settings file.

use std::collections::BTreeMap;

use crate::tools::ToolIdentity;

use super::VersionList;

/// Compiled-in fallback versions, newest first.
pub fn builtin(tool: ToolIdentity) -> &'static [&'static str] {
    match tool {
        ToolIdentity::Jenkins => &["2.401.3", "2.401.2", "2.401.1", "2.400.3"],
        ToolIdentity::Docker => &["4.10.0", "4.9.1", "4.8.2", "4.7.0"],
        ToolIdentity::Kubectl => &["1.28.0", "1.27.0", "1.26.0", "1.25.0"],
        ToolIdentity::Awscli => &["2.13.0", "2.12.0", "2.11.0", "2.10.0"],
        ToolIdentity::Gcloud => &["463.0.0", "462.0.0", "461.0.0", "460.0.0"],
        ToolIdentity::Az => &["2.50.0", "2.49.0", "2.48.0", "2.47.0"],
        ToolIdentity::Helm => &["3.12.0", "3.11.0", "3.10.0", "3.9.0"],
        ToolIdentity::Prometheus => &["2.45.0", "2.44.0", "2.43.0", "2.42.0"],
        ToolIdentity::Terraform => &["1.6.0", "1.5.0", "1.4.0", "1.3.0"],
    }
}

/// Fallback lists with user overrides applied.
#[derive(Debug, Clone, Default)]
pub struct FallbackVersions {
    overrides: BTreeMap<ToolIdentity, Vec<String>>,
}

impl FallbackVersions {
    pub fn new(overrides: BTreeMap<ToolIdentity, Vec<String>>) -> Self {
        Self { overrides }
    }

    /// Fallback list for `tool`.
    pub fn get(&self, tool: ToolIdentity) -> VersionList {
        match self.overrides.get(&tool) {
            Some(versions) => VersionList::from_candidates(versions.iter().cloned()),
            None => VersionList::from_candidates(builtin(tool).iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_has_four_builtin_versions() {
        for tool in ToolIdentity::ALL {
            let list = FallbackVersions::default().get(tool);
            assert_eq!(list.len(), 5, "{tool}");
            assert_eq!(list.last().map(String::as_str), Some("latest"));
        }
    }

    #[test]
    fn jenkins_builtin_list() {
        let list = FallbackVersions::default().get(ToolIdentity::Jenkins);
        assert_eq!(
            list.into_vec(),
            vec!["2.401.3", "2.401.2", "2.401.1", "2.400.3", "latest"]
        );
    }

    #[test]
    fn docker_builtin_list() {
        let list = FallbackVersions::default().get(ToolIdentity::Docker);
        assert_eq!(list.newest(), Some("4.10.0"));
    }

    #[test]
    fn overrides_replace_builtin() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            ToolIdentity::Terraform,
            vec!["1.9.8".to_string(), "1.10.2".to_string()],
        );
        let fallbacks = FallbackVersions::new(overrides);

        assert_eq!(
            fallbacks.get(ToolIdentity::Terraform).into_vec(),
            vec!["1.10.2", "1.9.8", "latest"]
        );
        assert_eq!(fallbacks.get(ToolIdentity::Helm).newest(), Some("3.12.0"));
    }
}
