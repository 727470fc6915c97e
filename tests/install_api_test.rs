//! Dependency handling and installation runs through the public API, with
//! scripted commands standing in for the host.

use std::time::Duration;

use devops_cli::config::{Settings, Timeouts};
use devops_cli::deps::DependencyManager;
use devops_cli::download::MockDownloader;
use devops_cli::install::{InstallState, Installer};
use devops_cli::platform::{Arch, DistroFamily, OsFamily, PlatformProfile};
use devops_cli::shell::{MockResponse, MockRunner};
use devops_cli::tools::ToolIdentity;
use devops_cli::versions::{
    Endpoints, FallbackVersions, MockReleaseSource, VersionCache, VersionResolver,
};
use tempfile::TempDir;

fn ubuntu() -> PlatformProfile {
    PlatformProfile::linux(DistroFamily::Ubuntu)
        .with_codename("jammy")
        .with_arch(Arch::Amd64)
}

fn installer(platform: PlatformProfile, runner: &MockRunner, root: &TempDir) -> Installer {
    let settings = Settings {
        install_root: Some(root.path().to_path_buf()),
        ..Settings::default()
    };
    let resolver = VersionResolver::new(
        Box::new(MockReleaseSource::new()),
        Endpoints::new("https://api.test", "https://docs.test/notes/"),
        VersionCache::new(Duration::from_secs(300)),
        FallbackVersions::default(),
    );
    Installer::new(
        platform,
        Box::new(runner.clone()),
        Box::new(MockDownloader::new()),
        resolver,
        settings,
    )
}

/// Prerequisites already present.
fn prepared_runner() -> MockRunner {
    let runner = MockRunner::new();
    runner.respond("dpkg", &["-l"], MockResponse::Success("ii  pkg 1.0".into()));
    runner
}

#[test]
fn two_of_three_dependencies_fail_without_early_abort() {
    let platform = ubuntu();
    let timeouts = Timeouts::default();
    let runner = MockRunner::new();
    runner.respond("apt-get", &["install", "-y", "curl"], MockResponse::Exit(100));
    runner.respond("apt-get", &["install", "-y", "python3"], MockResponse::Exit(100));

    let manager = DependencyManager::new(&platform, &runner, &timeouts);
    let report = manager.install_dependencies(ToolIdentity::Gcloud);

    assert!(!report.is_success());
    assert_eq!(report.failed, vec!["curl", "python3"]);
    assert_eq!(report.installed, vec!["python3-pip"]);
    assert!(runner.ran_line("apt-get install -y python3-pip"));
    // The package index is refreshed once for the whole batch.
    let refreshes = runner
        .command_lines()
        .iter()
        .filter(|l| l.as_str() == "apt-get update")
        .count();
    assert_eq!(refreshes, 1);
}

#[test]
fn timed_out_package_query_counts_as_missing() {
    let platform = PlatformProfile::linux(DistroFamily::Centos);
    let timeouts = Timeouts::default();
    let runner = MockRunner::new();
    runner.respond("rpm", &["-q"], MockResponse::TimedOut);

    let manager = DependencyManager::new(&platform, &runner, &timeouts);

    assert!(!manager.check_installed("curl"));
    assert!(!manager.validate_dependencies(ToolIdentity::Docker));
}

#[test]
fn unrecognized_distribution_runs_nothing() {
    let root = TempDir::new().unwrap();
    let runner = MockRunner::new();
    let mut installer = installer(PlatformProfile::new(OsFamily::Linux), &runner, &root);

    for tool in ToolIdentity::ALL {
        let outcome = installer.install(tool, None);
        assert!(!outcome.success, "{tool}");
        assert_eq!(outcome.state, InstallState::Failed);
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn update_after_install_of_same_version_is_a_no_op() {
    let root = TempDir::new().unwrap();
    let runner = prepared_runner();
    let mut installer = installer(ubuntu(), &runner, &root);

    let installed = installer.install(ToolIdentity::Helm, Some("3.14.0"));
    assert!(installed.success, "{}", installed.message);
    assert!(runner.ran_line("apt-get install -y --allow-downgrades helm=3.14.0-1"));

    // The tool now reports the installed version.
    runner.respond(
        "helm",
        &["version"],
        MockResponse::Success(r#"version.BuildInfo{Version:"v3.14.0"}"#.into()),
    );
    runner.clear_calls();

    let updated = installer.update(ToolIdentity::Helm, Some("3.14.0"));

    assert!(updated.success);
    assert!(updated.message.contains("already installed"));
    assert!(!runner.ran_line("apt-get"));
}

#[test]
fn jenkins_update_uninstalls_then_installs() {
    let root = TempDir::new().unwrap();
    let runner = prepared_runner();
    let mut installer = installer(ubuntu(), &runner, &root);

    let installed = installer.install(ToolIdentity::Jenkins, None);
    assert!(installed.success, "{}", installed.message);
    runner.clear_calls();

    let updated = installer.update(ToolIdentity::Jenkins, None);

    assert!(updated.success, "{}", updated.message);
    let lines = runner.command_lines();
    let remove = lines
        .iter()
        .position(|l| l.contains("apt-get remove -y jenkins"))
        .expect("jenkins removed");
    let install = lines
        .iter()
        .position(|l| l.contains("apt-get install -y jenkins"))
        .expect("jenkins installed");
    assert!(remove < install);
}

#[test]
fn winget_already_installed_code_is_success() {
    let root = TempDir::new().unwrap();
    let runner = MockRunner::new();
    runner.respond(
        "winget",
        &["install", "Hashicorp.Terraform"],
        MockResponse::Exit(-1978335189),
    );
    let platform = PlatformProfile::new(OsFamily::Windows).with_arch(Arch::Amd64);
    let mut installer = installer(platform, &runner, &root);

    let outcome = installer.install(ToolIdentity::Terraform, None);

    assert!(outcome.success, "{}", outcome.message);
    assert!(runner.ran_line("winget list --id Hashicorp.Terraform -e"));
    assert!(outcome.notices.iter().any(|n| n.contains("Restart your terminal")));
}

#[test]
fn failed_step_is_named_in_outcome() {
    let root = TempDir::new().unwrap();
    let runner = prepared_runner();
    runner.respond("gpg", &["--dearmor"], MockResponse::Exit(2));
    let mut installer = installer(ubuntu(), &runner, &root);

    let outcome = installer.install(ToolIdentity::Terraform, None);

    assert!(!outcome.success);
    assert_eq!(outcome.reached, InstallState::StepsExecuting);
    assert!(outcome.message.starts_with("Step '"), "{}", outcome.message);
    assert!(outcome.message.contains("gpg"));
    assert!(outcome.hint.is_some());
    assert!(!runner.ran_line("apt-get install -y terraform"));
}
