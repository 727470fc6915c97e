//! Available-version discovery.
//!
//! The [`VersionResolver`] asks upstream release endpoints for recent
//! versions of a tool, caches the answer for a short window and falls back
//! to known-good lists when upstream is unavailable. Callers always receive
//! a usable [`VersionList`].

pub mod cache;
pub mod fallback;
pub mod resolver;
pub mod retry;
pub mod scrape;
pub mod sort;
pub mod source;

use std::ops::Deref;

use serde::Serialize;

pub use cache::{CacheKey, VersionCache, VersionCacheEntry};
pub use fallback::FallbackVersions;
pub use resolver::{Endpoints, VersionResolver};
pub use retry::RetryPolicy;
pub use source::{HttpReleaseSource, MockReleaseSource, ReleaseSource};

/// Sentinel meaning "whatever the vendor currently publishes".
pub const SENTINEL_LATEST: &str = "latest";

/// Number of concrete versions kept in a list.
pub const MAX_CONCRETE_VERSIONS: usize = 4;

/// Ordered version list.
///
/// Concrete versions come first, newest first, without duplicates and at
/// most [`MAX_CONCRETE_VERSIONS`] of them; [`SENTINEL_LATEST`] is always
/// the final element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionList(Vec<String>);

impl VersionList {
    /// Normalize raw candidates: drop blanks and sentinels, dedupe, sort
    /// newest first, keep the newest few and append the sentinel.
    pub fn from_candidates<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut versions: Vec<String> = candidates
            .into_iter()
            .map(Into::into)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && v != SENTINEL_LATEST)
            .collect();
        sort::sort_descending(&mut versions);
        versions.dedup();
        versions.truncate(MAX_CONCRETE_VERSIONS);
        versions.push(SENTINEL_LATEST.to_string());
        Self(versions)
    }

    /// Concrete versions only, newest first.
    pub fn concrete(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }

    /// Newest concrete version, if any.
    pub fn newest(&self) -> Option<&str> {
        self.concrete().first().map(String::as_str)
    }

    /// True when no concrete version is known.
    pub fn has_concrete(&self) -> bool {
        !self.concrete().is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for VersionList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A requested version: the sentinel or a specific release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRequest {
    Latest,
    Exact(String),
}

impl VersionRequest {
    /// Parse user input; blank input and the sentinel mean latest. A leading
    /// `v` is dropped.
    pub fn parse(input: Option<&str>) -> Self {
        match input.map(str::trim) {
            None | Some("") => VersionRequest::Latest,
            Some(v) if v.eq_ignore_ascii_case(SENTINEL_LATEST) => VersionRequest::Latest,
            Some(v) => VersionRequest::Exact(v.trim_start_matches('v').to_string()),
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, VersionRequest::Latest)
    }

    pub fn as_str(&self) -> &str {
        match self {
            VersionRequest::Latest => SENTINEL_LATEST,
            VersionRequest::Exact(v) => v,
        }
    }
}
