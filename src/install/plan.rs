//! Turns a [`ToolRecipe`] into concrete steps for one host.

use std::path::Path;

use crate::config::Timeouts;
use crate::error::{DevopsError, Result};
use crate::platform::{DistroFamily, OsFamily, PackageManager, PlatformProfile};
use crate::shell::CommandSpec;
use crate::versions::VersionRequest;

use super::recipe::{Layout, Method, Repo, ToolRecipe};
use super::step::{Action, Procedure, Step, Verification};

const APT_KEYRINGS: &str = "/etc/apt/keyrings";
const APT_SOURCES: &str = "/etc/apt/sources.list.d";
const YUM_REPOS: &str = "/etc/yum.repos.d";
const BIN_DIR: &str = "/usr/local/bin";
const AWS_INSTALL_DIR: &str = "/usr/local/aws-cli";

/// winget: no applicable upgrade / already installed.
const WINGET_BENIGN_CODES: &[i32] = &[-1978335189, -1978335135];

/// Inputs shared by every planner.
pub struct PlanContext<'a> {
    pub platform: &'a PlatformProfile,
    pub version: &'a VersionRequest,
    /// Artifact URL, required by download methods.
    pub download_url: Option<String>,
    pub install_root: &'a Path,
    /// Per-run scratch directory for keys, repo files and archives.
    pub scratch: &'a Path,
    pub timeouts: &'a Timeouts,
}

/// Expand placeholders in a recipe template.
pub fn fill(template: &str, platform: &PlatformProfile, version: &str) -> Result<String> {
    let mut out = template
        .replace("{version}", version)
        .replace("{os}", platform.os.as_str())
        .replace("{arch}", platform.arch.as_str());

    if out.contains("{distro}") {
        let distro = platform.distro.ok_or_else(|| unsupported(platform))?;
        out = out.replace("{distro}", distro.as_str());
    }
    if out.contains("{rpm_family}") {
        let family = match platform.distro.ok_or_else(|| unsupported(platform))? {
            DistroFamily::Fedora => "fedora",
            _ => "RHEL",
        };
        out = out.replace("{rpm_family}", family);
    }
    if out.contains("{codename}") {
        let codename = platform
            .codename
            .as_deref()
            .ok_or_else(|| DevopsError::StepFailed {
                step: "repository setup".to_string(),
                message: format!(
                    "release codename of {} is unknown (VERSION_CODENAME missing from os-release)",
                    platform.describe()
                ),
            })?;
        out = out.replace("{codename}", codename);
    }
    Ok(out)
}

fn unsupported(platform: &PlatformProfile) -> DevopsError {
    DevopsError::UnsupportedPlatform {
        platform: platform.describe(),
    }
}

/// Steps installing the tool with `method`.
pub fn plan_install(recipe: &ToolRecipe, method: Method, ctx: &PlanContext) -> Result<Procedure> {
    let mut procedure = Procedure::new(recipe.tool, Action::Install, method.describe(ctx.platform));
    let t = ctx.timeouts;

    match method {
        Method::Packages {
            packages,
            repo,
            pin,
        } => {
            let manager = native_manager(ctx.platform)?;
            if let Some(repo) = repo {
                repo_steps(&mut procedure, repo, ctx)?;
            }
            if manager == PackageManager::Apt {
                procedure.push(Step::run(
                    "refresh package index",
                    CommandSpec::new("apt-get")
                        .arg("update")
                        .elevated()
                        .timeout(t.index_refresh()),
                ));
            }

            let mut names: Vec<String> = packages.iter().map(|p| p.to_string()).collect();
            if let VersionRequest::Exact(version) = ctx.version {
                match (pin, names.first_mut()) {
                    (Some(pin), Some(first)) => *first = fill(pin, ctx.platform, version)?,
                    _ => procedure.warnings.push(format!(
                        "{} cannot pin {} to {}; installing the current release",
                        manager.program(),
                        recipe.tool,
                        version
                    )),
                }
            }

            let mut install = CommandSpec::new(manager.program()).args(["install", "-y"]);
            if manager == PackageManager::Apt {
                install = install.env("DEBIAN_FRONTEND", "noninteractive");
                if !ctx.version.is_latest() {
                    install = install.arg("--allow-downgrades");
                }
            }
            procedure.push(Step::run(
                format!("install {}", names.join(" ")),
                install.args(names).elevated().timeout(t.install()),
            ));
            procedure.verify = version_check(recipe.version_command, None, t);
        }
        Method::Brew {
            formula,
            cask,
            tap,
            bin,
        } => {
            if let Some(tap) = tap {
                procedure.push(Step::run(
                    format!("tap {tap}"),
                    CommandSpec::new("brew").args(["tap", tap]).timeout(t.install()),
                ));
            }
            if let VersionRequest::Exact(version) = ctx.version {
                procedure.warnings.push(format!(
                    "Homebrew cannot pin {} to {}; installing the current release",
                    recipe.tool, version
                ));
            }
            procedure.push(Step::run(
                format!("install {formula}"),
                brew(&["install"], formula, cask).timeout(t.install()),
            ));
            procedure.verify = version_check(recipe.version_command, bin, t);
        }
        Method::Winget { id } => {
            let mut install = CommandSpec::new("winget").args([
                "install",
                "--id",
                id,
                "-e",
                "--silent",
                "--accept-package-agreements",
                "--accept-source-agreements",
            ]);
            if let VersionRequest::Exact(version) = ctx.version {
                install = install.args(["--version", version.as_str()]);
            }
            procedure.push(Step::run(
                format!("install {id}"),
                install
                    .accept_codes(WINGET_BENIGN_CODES)
                    .timeout(t.install()),
            ));
            // The new PATH only reaches freshly started shells.
            procedure.verify = Verification::Command(
                CommandSpec::new("winget")
                    .args(["list", "--id", id, "-e"])
                    .timeout(t.quick()),
            );
            procedure.push(Step::Notice(format!(
                "Restart your terminal so {} is on PATH.",
                recipe.tool
            )));
        }
        Method::Download(layout) => {
            let url = ctx
                .download_url
                .clone()
                .ok_or_else(|| DevopsError::DownloadUnsupported {
                    tool: recipe.tool.to_string(),
                    os: ctx.platform.os.to_string(),
                })?;
            download_steps(&mut procedure, recipe, layout, &url, ctx)?;
        }
    }
    Ok(procedure)
}

/// Steps removing what [`plan_install`] put in place. Versions are ignored;
/// whatever is installed is removed.
pub fn plan_uninstall(recipe: &ToolRecipe, method: Method, ctx: &PlanContext) -> Result<Procedure> {
    let mut procedure =
        Procedure::new(recipe.tool, Action::Uninstall, method.describe(ctx.platform));
    let t = ctx.timeouts;
    let windows = ctx.platform.os == OsFamily::Windows;

    match method {
        Method::Packages { packages, .. } => {
            let manager = native_manager(ctx.platform)?;
            let mut remove = CommandSpec::new(manager.program()).args(["remove", "-y"]);
            if manager == PackageManager::Apt {
                remove = remove.env("DEBIAN_FRONTEND", "noninteractive");
            }
            procedure.push(Step::run(
                format!("remove {}", packages.join(" ")),
                remove
                    .args(packages.iter().copied())
                    .elevated()
                    .timeout(t.install()),
            ));
        }
        Method::Brew { formula, cask, .. } => {
            procedure.push(Step::run(
                format!("uninstall {formula}"),
                brew(&["uninstall"], formula, cask).timeout(t.install()),
            ));
        }
        Method::Winget { id } => {
            procedure.push(Step::run(
                format!("uninstall {id}"),
                CommandSpec::new("winget")
                    .args(["uninstall", "--id", id, "-e", "--silent"])
                    .timeout(t.install()),
            ));
        }
        Method::Download(Layout::Binary { name } | Layout::ArchiveBinary { name, .. }) => {
            procedure.push(Step::run(
                format!("remove {BIN_DIR}/{name}"),
                CommandSpec::new("rm")
                    .arg("-f")
                    .arg(format!("{BIN_DIR}/{name}"))
                    .elevated()
                    .timeout(t.quick()),
            ));
        }
        Method::Download(Layout::Extract { dir, .. }) => {
            let target = ctx.install_root.join(dir);
            if windows {
                procedure.push(Step::Notice(format!(
                    "Delete {} manually to finish removing {}.",
                    target.display(),
                    recipe.tool
                )));
            } else {
                procedure.push(Step::RemoveDir(target));
            }
        }
        Method::Download(Layout::War) => {
            procedure.push(Step::Notice(format!(
                "Delete {} manually to finish removing {}.",
                ctx.install_root.join("jenkins").display(),
                recipe.tool
            )));
        }
        Method::Download(Layout::AwsBundle | Layout::MacPkg) => {
            procedure.push(Step::run(
                format!("remove {AWS_INSTALL_DIR}"),
                CommandSpec::new("rm")
                    .args(["-rf", AWS_INSTALL_DIR])
                    .elevated()
                    .timeout(t.quick()),
            ));
            procedure.push(Step::run(
                "remove aws launchers",
                CommandSpec::new("rm")
                    .args([
                        "-f".to_string(),
                        format!("{BIN_DIR}/aws"),
                        format!("{BIN_DIR}/aws_completer"),
                    ])
                    .elevated()
                    .timeout(t.quick()),
            ));
        }
        Method::Download(Layout::GcloudBundle) => {
            let target = ctx.install_root.join("google-cloud-sdk");
            procedure.push(Step::RemoveDir(target.clone()));
            procedure.push(Step::Notice(format!(
                "Remove {} from PATH in your shell profile.",
                target.join("bin").display()
            )));
        }
    }
    Ok(procedure)
}

/// The tool's own updater, e.g. `gcloud components update`.
pub fn plan_native_update(recipe: &ToolRecipe, args: &[&str], ctx: &PlanContext) -> Procedure {
    let program = recipe.version_command[0];
    let mut procedure = Procedure::new(recipe.tool, Action::Update, format!("{program} self-update"));

    let mut command = CommandSpec::new(program).args(args.iter().copied());
    if let VersionRequest::Exact(version) = ctx.version {
        command = command.arg(format!("--version={version}"));
    }
    procedure.push(Step::run(
        format!("{program} {}", args.join(" ")),
        command.timeout(ctx.timeouts.install()),
    ));
    procedure.verify = version_check(recipe.version_command, None, ctx.timeouts);
    procedure
}

/// Command that prints the installed version.
pub fn version_command(command: &[&str], bin: Option<&str>) -> CommandSpec {
    let program = bin.unwrap_or(command[0]);
    CommandSpec::new(program).args(command[1..].iter().copied())
}

fn version_check(command: &[&str], bin: Option<&str>, t: &Timeouts) -> Verification {
    Verification::Command(version_command(command, bin).timeout(t.quick()))
}

fn native_manager(platform: &PlatformProfile) -> Result<PackageManager> {
    match platform.package_manager() {
        Some(pm @ (PackageManager::Apt | PackageManager::Yum | PackageManager::Dnf)) => Ok(pm),
        _ => Err(unsupported(platform)),
    }
}

fn brew(verb: &[&str], formula: &str, cask: bool) -> CommandSpec {
    let mut command = CommandSpec::new("brew").args(verb.iter().copied());
    if cask {
        command = command.arg("--cask");
    }
    command.arg(formula)
}

fn repo_steps(procedure: &mut Procedure, repo: Repo, ctx: &PlanContext) -> Result<()> {
    let t = ctx.timeouts;
    let version = ctx.version.as_str();
    match repo {
        Repo::Apt {
            name,
            key_url,
            source,
        } => {
            let key = ctx.scratch.join(format!("{name}.asc"));
            let keyring = format!("{APT_KEYRINGS}/{name}.gpg");
            let line = fill(source, ctx.platform, version)?;

            procedure.push(Step::download(
                format!("download {name} signing key"),
                fill(key_url, ctx.platform, version)?,
                key.clone(),
            ));
            procedure.push(Step::run(
                "create keyring directory",
                CommandSpec::new("install")
                    .args(["-d", "-m", "0755", APT_KEYRINGS])
                    .elevated()
                    .timeout(t.quick()),
            ));
            procedure.push(Step::run(
                format!("import {name} signing key"),
                CommandSpec::new("gpg")
                    .args(["--dearmor", "--yes", "-o", keyring.as_str()])
                    .arg(key.display().to_string())
                    .elevated()
                    .timeout(t.quick()),
            ));
            procedure.push(Step::run(
                format!("add {name} apt repository"),
                CommandSpec::new("tee")
                    .arg(format!("{APT_SOURCES}/{name}.list"))
                    .stdin(format!("{line}\n"))
                    .elevated()
                    .timeout(t.quick()),
            ));
        }
        Repo::RpmRemote { name, url } => {
            let file = ctx.scratch.join(format!("{name}.repo"));
            procedure.push(Step::download(
                format!("download {name} repository definition"),
                fill(url, ctx.platform, version)?,
                file.clone(),
            ));
            procedure.push(Step::run(
                format!("add {name} repository"),
                CommandSpec::new("install")
                    .args(["-m", "0644"])
                    .arg(file.display().to_string())
                    .arg(format!("{YUM_REPOS}/{name}.repo"))
                    .elevated()
                    .timeout(t.quick()),
            ));
        }
        Repo::RpmInline { name, contents } => {
            procedure.push(Step::run(
                format!("add {name} repository"),
                CommandSpec::new("tee")
                    .arg(format!("{YUM_REPOS}/{name}.repo"))
                    .stdin(contents)
                    .elevated()
                    .timeout(t.quick()),
            ));
        }
    }
    Ok(())
}

fn download_steps(
    procedure: &mut Procedure,
    recipe: &ToolRecipe,
    layout: Layout,
    url: &str,
    ctx: &PlanContext,
) -> Result<()> {
    let t = ctx.timeouts;
    let windows = ctx.platform.os == OsFamily::Windows;
    let tool = recipe.tool;
    let artifact = ctx.scratch.join(artifact_name(url));
    let fetch = Step::download(format!("download {tool}"), url, artifact.clone());

    match layout {
        Layout::Binary { name } => {
            if windows {
                return Err(DevopsError::DownloadUnsupported {
                    tool: tool.to_string(),
                    os: ctx.platform.os.to_string(),
                });
            }
            procedure.push(fetch);
            procedure.push(install_binary(name, &artifact, t));
            procedure.verify = version_check(recipe.version_command, None, t);
        }
        Layout::ArchiveBinary { name, inner } => {
            if windows {
                return Err(DevopsError::DownloadUnsupported {
                    tool: tool.to_string(),
                    os: ctx.platform.os.to_string(),
                });
            }
            let unpacked = ctx.scratch.join("unpacked");
            procedure.push(fetch);
            procedure.push(Step::CreateDir(unpacked.clone()));
            procedure.push(Step::run(
                format!("unpack {tool}"),
                unpack(&artifact, &unpacked, windows, false).timeout(t.quick()),
            ));
            let inner = fill(inner, ctx.platform, ctx.version.as_str())?;
            procedure.push(install_binary(name, &unpacked.join(inner), t));
            procedure.verify = version_check(recipe.version_command, None, t);
        }
        Layout::Extract { dir, executable } => {
            let target = ctx.install_root.join(dir);
            procedure.push(fetch);
            procedure.push(Step::RemoveDir(target.clone()));
            procedure.push(Step::CreateDir(target.clone()));
            procedure.push(Step::run(
                format!("unpack {tool} into {}", target.display()),
                unpack(&artifact, &target, windows, true).timeout(t.quick()),
            ));
            procedure.verify = if windows {
                Verification::FileExists(target.join(format!("{executable}.exe")))
            } else {
                Verification::Command(
                    CommandSpec::new(target.join(executable).display().to_string())
                        .arg("--version")
                        .timeout(t.quick()),
                )
            };
            procedure.push(Step::Notice(format!(
                "{tool} is installed in {}; add it to PATH to run {executable} directly.",
                target.display()
            )));
        }
        Layout::War => {
            let target = ctx.install_root.join("jenkins");
            let war = target.join("jenkins.war");
            procedure.push(Step::CreateDir(target));
            procedure.push(Step::download(format!("download {tool}"), url, war.clone()));
            procedure.push(Step::Notice(format!(
                "Start Jenkins with: java -jar {}",
                war.display()
            )));
            procedure.verify = Verification::FileExists(war);
        }
        Layout::AwsBundle => {
            procedure.push(fetch);
            procedure.push(Step::run(
                "unpack AWS CLI bundle",
                unpack(&artifact, ctx.scratch, windows, false).timeout(t.quick()),
            ));
            procedure.push(Step::run(
                "run AWS CLI installer",
                CommandSpec::new(ctx.scratch.join("aws").join("install").display().to_string())
                    .args(["--bin-dir", BIN_DIR, "--install-dir", AWS_INSTALL_DIR, "--update"])
                    .elevated()
                    .timeout(t.install()),
            ));
            procedure.verify = version_check(recipe.version_command, None, t);
        }
        Layout::MacPkg => {
            procedure.push(fetch);
            procedure.push(Step::run(
                format!("run {tool} package installer"),
                CommandSpec::new("installer")
                    .arg("-pkg")
                    .arg(artifact.display().to_string())
                    .args(["-target", "/"])
                    .elevated()
                    .timeout(t.install()),
            ));
            procedure.verify = version_check(recipe.version_command, None, t);
        }
        Layout::GcloudBundle => {
            let target = ctx.install_root.join("google-cloud-sdk");
            procedure.push(fetch);
            procedure.push(Step::RemoveDir(target.clone()));
            procedure.push(Step::CreateDir(ctx.install_root.to_path_buf()));
            procedure.push(Step::run(
                "unpack Google Cloud SDK",
                unpack(&artifact, ctx.install_root, windows, false).timeout(t.install()),
            ));
            procedure.push(Step::run(
                "run Google Cloud SDK installer",
                CommandSpec::new(target.join("install.sh").display().to_string())
                    .args([
                        "--quiet",
                        "--usage-reporting=false",
                        "--path-update=false",
                        "--command-completion=false",
                    ])
                    .timeout(t.install()),
            ));
            procedure.push(Step::Notice(format!(
                "Add {} to PATH in your shell profile.",
                target.join("bin").display()
            )));
            procedure.verify = Verification::Command(
                CommandSpec::new(target.join("bin").join("gcloud").display().to_string())
                    .arg("--version")
                    .timeout(t.quick()),
            );
        }
    }
    Ok(())
}

fn artifact_name(url: &str) -> String {
    url.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("artifact")
        .to_string()
}

fn install_binary(name: &str, source: &Path, t: &Timeouts) -> Step {
    Step::run(
        format!("install {name} into {BIN_DIR}"),
        CommandSpec::new("install")
            .args(["-m", "0755"])
            .arg(source.display().to_string())
            .arg(format!("{BIN_DIR}/{name}"))
            .elevated()
            .timeout(t.quick()),
    )
}

/// Extraction command for `.zip` and `.tar.gz` archives. Windows ships a
/// bsdtar that reads both.
fn unpack(archive: &Path, dest: &Path, windows: bool, strip_top: bool) -> CommandSpec {
    let archive_arg = archive.display().to_string();
    let dest_arg = dest.display().to_string();
    let is_zip = archive_arg.ends_with(".zip");

    let command = if is_zip && !windows {
        CommandSpec::new("unzip").args(["-o", "-q", archive_arg.as_str(), "-d", dest_arg.as_str()])
    } else {
        let flags = if windows { "-xf" } else { "-xzf" };
        CommandSpec::new("tar").args([flags, archive_arg.as_str(), "-C", dest_arg.as_str()])
    };
    if strip_top && !(is_zip && !windows) {
        command.arg("--strip-components=1")
    } else {
        command
    }
}
