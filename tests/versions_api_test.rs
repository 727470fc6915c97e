//! Version discovery against a local HTTP server.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use devops_cli::platform::{DistroFamily, OsFamily, PlatformProfile};
use devops_cli::tools::ToolIdentity;
use devops_cli::versions::{
    Endpoints, FallbackVersions, HttpReleaseSource, RetryPolicy, VersionCache, VersionResolver,
};
use httpmock::prelude::*;

fn resolver(server: &MockServer, freshness: Duration, policy: RetryPolicy) -> VersionResolver {
    let source = HttpReleaseSource::new(Duration::from_secs(5), policy, "devops-cli-test")
        .unwrap()
        .with_sleep(|_| {});
    VersionResolver::new(
        Box::new(source),
        Endpoints::new(server.base_url(), server.url("/release-notes/")),
        VersionCache::new(freshness),
        FallbackVersions::default(),
    )
}

fn fresh(server: &MockServer) -> VersionResolver {
    resolver(server, Duration::from_secs(300), RetryPolicy::none())
}

#[test]
fn newest_four_plus_latest_with_prefix_stripped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/hashicorp/terraform/releases")
            .query_param("per_page", "30");
        then.status(200).header("content-type", "application/json").body(
            r#"[{"tag_name":"v2.1.0"},{"tag_name":"v2.0.0"},{"tag_name":"v1.9.0"},
                {"tag_name":"v1.8.0"},{"tag_name":"v1.7.0"}]"#,
        );
    });

    let versions = fresh(&server).get_versions(
        ToolIdentity::Terraform,
        OsFamily::Linux,
        Some(DistroFamily::Ubuntu),
    );

    assert_eq!(
        versions.into_vec(),
        vec!["2.1.0", "2.0.0", "1.9.0", "1.8.0", "latest"]
    );
}

#[test]
fn prereleases_and_drafts_are_dropped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/helm/helm/releases");
        then.status(200).body(
            r#"[
                {"tag_name":"v3.15.0-rc.1","prerelease":true,"draft":false},
                {"tag_name":"v3.14.2","prerelease":false,"draft":false},
                {"tag_name":"v3.14.5","prerelease":false,"draft":true},
                {"tag_name":"v3.14.1","prerelease":false,"draft":false}
            ]"#,
        );
    });

    let versions = fresh(&server).get_versions(ToolIdentity::Helm, OsFamily::Darwin, None);

    assert_eq!(versions.into_vec(), vec!["3.14.2", "3.14.1", "latest"]);
}

#[test]
fn tag_prefixes_are_stripped_per_tool() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/Azure/azure-cli/releases");
        then.status(200)
            .body(r#"[{"tag_name":"azure-cli-2.57.0"},{"tag_name":"azure-cli-2.56.0"}]"#);
    });

    let versions = fresh(&server).get_versions(ToolIdentity::Az, OsFamily::Windows, None);

    assert_eq!(versions.into_vec(), vec!["2.57.0", "2.56.0", "latest"]);
}

#[test]
fn repeated_calls_within_window_hit_cache() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/repos/kubernetes/kubernetes/releases");
        then.status(200).body(r#"[{"tag_name":"v1.29.1"}]"#);
    });
    let mut resolver = fresh(&server);

    let first = resolver.get_versions(ToolIdentity::Kubectl, OsFamily::Linux, None);
    let second = resolver.get_versions(ToolIdentity::Kubectl, OsFamily::Linux, None);

    assert_eq!(first, second);
    mock.assert_calls(1);
}

#[test]
fn expired_entry_is_refetched() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/repos/kubernetes/kubernetes/releases");
        then.status(200).body(r#"[{"tag_name":"v1.29.1"}]"#);
    });
    let mut resolver = resolver(&server, Duration::from_millis(50), RetryPolicy::none());

    resolver.get_versions(ToolIdentity::Kubectl, OsFamily::Linux, None);
    thread::sleep(Duration::from_millis(120));
    resolver.get_versions(ToolIdentity::Kubectl, OsFamily::Linux, None);

    mock.assert_calls(2);
}

#[test]
fn server_error_falls_back_after_retries() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/repos/prometheus/prometheus/releases");
        then.status(500);
    });
    let policy = RetryPolicy::new(3, Duration::from_millis(1));
    let mut resolver = resolver(&server, Duration::from_secs(300), policy);

    let versions = resolver.get_versions(ToolIdentity::Prometheus, OsFamily::Linux, None);

    assert_eq!(
        versions.into_vec(),
        vec!["2.45.0", "2.44.0", "2.43.0", "2.42.0", "latest"]
    );
    mock.assert_calls(3);
}

#[test]
fn docker_scrapes_release_notes_when_feed_is_empty() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/docker/desktop/releases");
        then.status(200).body("[]");
    });
    server.mock(|when, then| {
        when.method(GET).path("/release-notes/");
        then.status(200).body(
            "<h2>4.27.1</h2><p>fixes</p><h2>4.27.0</h2><h2>4.26.1</h2>",
        );
    });

    let versions = fresh(&server).get_versions(ToolIdentity::Docker, OsFamily::Darwin, None);

    assert_eq!(versions.first().map(String::as_str), Some("4.27.1"));
    assert_eq!(versions.last().map(String::as_str), Some("latest"));
}

#[test]
fn every_tool_lists_latest_when_offline() {
    let server = MockServer::start();
    let mut resolver = fresh(&server);

    for tool in ToolIdentity::ALL {
        let versions = resolver.get_versions(tool, OsFamily::Linux, Some(DistroFamily::Fedora));
        assert!(versions.len() > 1, "{tool}");
        assert_eq!(versions.last().map(String::as_str), Some("latest"), "{tool}");
    }
}

#[test]
fn latest_resolves_to_configured_fallback_offline() {
    let server = MockServer::start();
    let source = HttpReleaseSource::new(Duration::from_secs(5), RetryPolicy::none(), "test")
        .unwrap();
    let overrides = BTreeMap::from([(ToolIdentity::Helm, vec!["3.13.0".to_string()])]);
    let mut resolver = VersionResolver::new(
        Box::new(source),
        Endpoints::new(server.base_url(), server.url("/notes")),
        VersionCache::new(Duration::from_secs(300)),
        FallbackVersions::new(overrides),
    );

    let latest = resolver
        .resolve_latest(ToolIdentity::Helm, &PlatformProfile::new(OsFamily::Darwin))
        .unwrap();

    assert_eq!(latest, "3.13.0");
}

#[test]
fn retries_wait_with_growing_backoff() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/helm/helm/releases");
        then.status(503);
    });
    let waited = Rc::new(Cell::new(Duration::ZERO));
    let total = Rc::clone(&waited);
    let source = HttpReleaseSource::new(
        Duration::from_secs(5),
        RetryPolicy::new(3, Duration::from_millis(100)),
        "test",
    )
    .unwrap()
    .with_sleep(move |d| total.set(total.get() + d));
    let mut resolver = VersionResolver::new(
        Box::new(source),
        Endpoints::new(server.base_url(), server.url("/notes")),
        VersionCache::new(Duration::from_secs(300)),
        FallbackVersions::default(),
    );

    resolver.get_versions(ToolIdentity::Helm, OsFamily::Linux, None);

    // 100ms then 200ms between three attempts.
    assert_eq!(waited.get(), Duration::from_millis(300));
}
