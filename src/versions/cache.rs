//! In-memory version cache.
//!
//! Entries are keyed by tool and platform and stay fresh for a fixed
//! window measured from when they were fetched. Stale entries are never
//! returned.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::platform::{DistroFamily, OsFamily};
use crate::tools::ToolIdentity;

use super::VersionList;

/// Cache key: `{tool}_{os}_{distro|default}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(tool: ToolIdentity, os: OsFamily, distro: Option<DistroFamily>) -> Self {
        Self(format!(
            "{}_{}_{}",
            tool,
            os,
            distro.map(|d| d.as_str()).unwrap_or("default")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A cached version list.
#[derive(Debug, Clone)]
pub struct VersionCacheEntry {
    pub versions: VersionList,
    pub fetched_at: DateTime<Utc>,
}

impl VersionCacheEntry {
    pub fn new(versions: VersionList) -> Self {
        Self::fetched_at(versions, Utc::now())
    }

    pub fn fetched_at(versions: VersionList, fetched_at: DateTime<Utc>) -> Self {
        Self {
            versions,
            fetched_at,
        }
    }

    /// Get the age of this entry at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.fetched_at)
    }

    /// Fresh while strictly younger than the window.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match chrono::Duration::from_std(window) {
            Ok(window) => self.age(now) < window,
            Err(_) => true,
        }
    }
}

/// Version lists keyed by tool and platform.
#[derive(Debug, Clone)]
pub struct VersionCache {
    entries: HashMap<CacheKey, VersionCacheEntry>,
    freshness: Duration,
}

impl VersionCache {
    pub fn new(freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            freshness,
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<&VersionList> {
        self.get_at(key, Utc::now())
    }

    /// Fresh entry for `key` as of `now`.
    pub fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<&VersionList> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.freshness))
            .map(|entry| &entry.versions)
    }

    pub fn insert(&mut self, key: CacheKey, entry: VersionCacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Drop stale entries.
    pub fn prune(&mut self) {
        let now = Utc::now();
        let window = self.freshness;
        self.entries.retain(|_, entry| entry.is_fresh(now, window));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> VersionList {
        VersionList::from_candidates(["3.12.0"])
    }

    #[test]
    fn key_format() {
        let key = CacheKey::new(ToolIdentity::Helm, OsFamily::Linux, Some(DistroFamily::Ubuntu));
        assert_eq!(key.as_str(), "helm_linux_ubuntu");
        let key = CacheKey::new(ToolIdentity::Az, OsFamily::Darwin, None);
        assert_eq!(key.as_str(), "az_darwin_default");
    }

    #[test]
    fn fresh_entry_is_returned() {
        let mut cache = VersionCache::new(Duration::from_secs(300));
        let key = CacheKey::new(ToolIdentity::Helm, OsFamily::Darwin, None);
        cache.insert(key.clone(), VersionCacheEntry::new(list()));
        assert_eq!(cache.get(&key), Some(&list()));
    }

    #[test]
    fn entry_at_window_boundary_is_stale() {
        let mut cache = VersionCache::new(Duration::from_secs(300));
        let key = CacheKey::new(ToolIdentity::Helm, OsFamily::Darwin, None);
        let fetched = Utc::now();
        cache.insert(key.clone(), VersionCacheEntry::fetched_at(list(), fetched));

        let almost = fetched + chrono::Duration::seconds(299);
        let boundary = fetched + chrono::Duration::seconds(300);
        assert!(cache.get_at(&key, almost).is_some());
        assert!(cache.get_at(&key, boundary).is_none());
    }

    #[test]
    fn zero_window_never_serves() {
        let mut cache = VersionCache::new(Duration::ZERO);
        let key = CacheKey::new(ToolIdentity::Kubectl, OsFamily::Windows, None);
        cache.insert(key.clone(), VersionCacheEntry::new(list()));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn keys_are_platform_specific() {
        let mut cache = VersionCache::new(Duration::from_secs(300));
        let ubuntu = CacheKey::new(ToolIdentity::Docker, OsFamily::Linux, Some(DistroFamily::Ubuntu));
        let fedora = CacheKey::new(ToolIdentity::Docker, OsFamily::Linux, Some(DistroFamily::Fedora));
        cache.insert(ubuntu.clone(), VersionCacheEntry::new(list()));
        assert!(cache.get(&ubuntu).is_some());
        assert!(cache.get(&fedora).is_none());
    }

    #[test]
    fn prune_removes_stale_entries() {
        let mut cache = VersionCache::new(Duration::from_secs(300));
        let old = Utc::now() - chrono::Duration::seconds(600);
        cache.insert(
            CacheKey::new(ToolIdentity::Helm, OsFamily::Darwin, None),
            VersionCacheEntry::fetched_at(list(), old),
        );
        cache.insert(
            CacheKey::new(ToolIdentity::Az, OsFamily::Darwin, None),
            VersionCacheEntry::new(list()),
        );
        cache.prune();
        assert_eq!(cache.len(), 1);
    }
}
