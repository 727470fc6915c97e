//! Version resolution: cache, upstream fetch, fallback.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{DevopsError, Result};
use crate::platform::{DistroFamily, OsFamily, PlatformProfile};
use crate::tools::ToolIdentity;

use super::cache::{CacheKey, VersionCache, VersionCacheEntry};
use super::fallback::FallbackVersions;
use super::scrape::versions_from_headings;
use super::source::{HttpReleaseSource, ReleaseSource};
use super::VersionList;

/// Upstream locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    /// GitHub REST API base URL, without trailing slash.
    pub github_api: String,
    /// Docker Desktop release notes page.
    pub docker_release_notes: String,
}

impl Endpoints {
    pub fn new(github_api: impl Into<String>, docker_release_notes: impl Into<String>) -> Self {
        Self {
            github_api: github_api.into().trim_end_matches('/').to_string(),
            docker_release_notes: docker_release_notes.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.network.github_api_url.clone(),
            settings.network.docker_release_notes_url.clone(),
        )
    }

    /// Releases listing for an `owner/repo`.
    pub fn releases_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/releases?per_page=30", self.github_api, repo)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Where a tool's versions come from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ReleaseFeed {
    /// GitHub `owner/repo`.
    repo: &'static str,
    /// Tag prefix removed before the usual leading `v`.
    tag_prefix: Option<&'static str>,
    /// Scrape the Docker release notes when the feed yields nothing.
    scrape_release_notes: bool,
}

fn feed(tool: ToolIdentity) -> ReleaseFeed {
    let github = |repo| ReleaseFeed {
        repo,
        tag_prefix: None,
        scrape_release_notes: false,
    };
    match tool {
        ToolIdentity::Docker => ReleaseFeed {
            scrape_release_notes: true,
            ..github("docker/desktop")
        },
        ToolIdentity::Kubectl => github("kubernetes/kubernetes"),
        ToolIdentity::Awscli => github("aws/aws-cli"),
        ToolIdentity::Gcloud => github("GoogleCloudPlatform/cloud-sdk-docker"),
        ToolIdentity::Az => ReleaseFeed {
            tag_prefix: Some("azure-cli-"),
            ..github("Azure/azure-cli")
        },
        ToolIdentity::Jenkins => ReleaseFeed {
            tag_prefix: Some("jenkins-"),
            ..github("jenkinsci/jenkins")
        },
        ToolIdentity::Helm => github("helm/helm"),
        ToolIdentity::Prometheus => github("prometheus/prometheus"),
        ToolIdentity::Terraform => github("hashicorp/terraform"),
    }
}

/// One element of a GitHub releases listing.
#[derive(Debug, Deserialize)]
struct ReleaseDescriptor {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
}

/// Stable versions from a GitHub releases payload.
fn parse_releases(body: &str, tag_prefix: Option<&str>) -> Result<Vec<String>> {
    let releases: Vec<ReleaseDescriptor> =
        serde_json::from_str(body).map_err(|e| DevopsError::ParseFailure {
            what: "release listing".to_string(),
            message: e.to_string(),
        })?;

    Ok(releases
        .into_iter()
        .filter(|r| !r.prerelease && !r.draft)
        .map(|r| {
            let tag = r.tag_name.trim();
            let tag = tag_prefix
                .and_then(|prefix| tag.strip_prefix(prefix))
                .unwrap_or(tag);
            tag.strip_prefix('v').unwrap_or(tag).to_string()
        })
        .collect())
}

/// Resolves available versions per tool and platform.
pub struct VersionResolver {
    source: Box<dyn ReleaseSource>,
    endpoints: Endpoints,
    cache: VersionCache,
    fallbacks: FallbackVersions,
}

impl VersionResolver {
    pub fn new(
        source: Box<dyn ReleaseSource>,
        endpoints: Endpoints,
        cache: VersionCache,
        fallbacks: FallbackVersions,
    ) -> Self {
        Self {
            source,
            endpoints,
            cache,
            fallbacks,
        }
    }

    /// Build a resolver that talks to the real upstream endpoints.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpReleaseSource::from_settings(&settings.network)?),
            Endpoints::from_settings(settings),
            VersionCache::new(settings.cache.freshness()),
            FallbackVersions::new(settings.fallback_versions.clone()),
        ))
    }

    /// Recent versions of `tool`, newest first, ending with `latest`.
    ///
    /// Never fails: when upstream is unreachable or returns nothing usable
    /// the fallback list is returned.
    pub fn get_versions(
        &mut self,
        tool: ToolIdentity,
        os: OsFamily,
        distro: Option<DistroFamily>,
    ) -> VersionList {
        let key = CacheKey::new(tool, os, distro);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Version cache hit for {}", key.as_str());
            return cached.clone();
        }
        debug!("Version cache miss for {}", key.as_str());

        let versions = match self.fetch_upstream(tool) {
            Ok(versions) => versions,
            Err(e) => {
                warn!("Using fallback versions for {}: {}", tool, e);
                self.fallbacks.get(tool)
            }
        };

        self.cache
            .insert(key, VersionCacheEntry::new(versions.clone()));
        versions
    }

    /// [`get_versions`](Self::get_versions) for a detected platform.
    pub fn get_versions_for(
        &mut self,
        tool: ToolIdentity,
        platform: &PlatformProfile,
    ) -> VersionList {
        self.get_versions(tool, platform.os, platform.distro)
    }

    /// Concrete version standing in for `latest`: the newest upstream
    /// version, or the newest fallback when offline.
    pub fn resolve_latest(
        &mut self,
        tool: ToolIdentity,
        platform: &PlatformProfile,
    ) -> Result<String> {
        let versions = self.get_versions_for(tool, platform);
        versions
            .newest()
            .map(str::to_string)
            .or_else(|| self.fallbacks.get(tool).newest().map(str::to_string))
            .ok_or_else(|| DevopsError::VersionUnresolvable {
                tool: tool.to_string(),
            })
    }

    fn fetch_upstream(&self, tool: ToolIdentity) -> Result<VersionList> {
        let feed = feed(tool);
        let url = self.endpoints.releases_url(feed.repo);

        let from_releases = self
            .source
            .fetch(&url)
            .and_then(|body| parse_releases(&body, feed.tag_prefix));

        let candidates = match from_releases {
            Ok(versions) if !versions.is_empty() => versions,
            Ok(_) if feed.scrape_release_notes => self.scrape_release_notes()?,
            Err(e) if feed.scrape_release_notes => {
                debug!("Release feed for {} failed: {}", tool, e);
                self.scrape_release_notes()?
            }
            Ok(_) => Vec::new(),
            Err(e) => return Err(e),
        };

        if candidates.is_empty() {
            return Err(DevopsError::ParseFailure {
                what: format!("{} releases", tool),
                message: "no stable versions found".to_string(),
            });
        }

        let versions = VersionList::from_candidates(candidates);
        info!("Resolved {} versions: {}", tool, versions.join(", "));
        Ok(versions)
    }

    fn scrape_release_notes(&self) -> Result<Vec<String>> {
        let url = &self.endpoints.docker_release_notes;
        debug!("Scraping release notes at {}", url);
        let html = self.source.fetch(url)?;
        Ok(versions_from_headings(&html))
    }
}
