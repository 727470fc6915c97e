//! Settings file discovery, loading and validation.

use crate::config::schema::Settings;
use crate::error::{DevopsError, Result};
use crate::versions::SENTINEL_LATEST;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "DEVOPS_CLI_CONFIG";

/// Default settings location: `~/.devops-cli/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".devops-cli").join("config.yml"))
}

/// Load settings.
///
/// An explicit path (argument first, then `DEVOPS_CLI_CONFIG`) must exist.
/// Without one, the default location is used when present and built-in
/// defaults otherwise.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
        return load_settings_file(&path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_settings_file(&path),
        _ => {
            debug!("No settings file found; using defaults");
            Ok(Settings::default())
        }
    }
}

/// Load and validate a single settings file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
/// Returns `ConfigValidationError` if values are unusable.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DevopsError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DevopsError::Io(e)
        }
    })?;

    debug!("Loading settings from {}", path.display());
    let settings = parse_settings(&content, path)?;
    validate(&settings)?;
    Ok(settings)
}

/// Parse YAML content into Settings. An empty document yields defaults.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(content).map_err(|e| DevopsError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Reject values the engine cannot work with.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.network.max_attempts == 0 {
        return Err(DevopsError::ConfigValidationError {
            message: "network.max_attempts must be at least 1".to_string(),
        });
    }

    for (tool, versions) in &settings.fallback_versions {
        if !versions.iter().any(|v| v != SENTINEL_LATEST) {
            return Err(DevopsError::ConfigValidationError {
                message: format!(
                    "fallback_versions.{} must list at least one concrete version",
                    tool
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolIdentity;
    use tempfile::TempDir;

    #[test]
    fn loads_file_and_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "timeouts:\n  install_secs: 600\n").unwrap();

        let settings = load_settings_file(&path).unwrap();
        assert_eq!(settings.timeouts.install_secs, 600);
        assert_eq!(settings.timeouts.query_secs, 10);
    }

    #[test]
    fn missing_explicit_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");

        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, DevopsError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "network: [unclosed").unwrap();

        let err = load_settings_file(&path).unwrap_err();
        assert!(matches!(err, DevopsError::ConfigParseError { .. }));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let settings = parse_settings("\n", Path::new("config.yml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut settings = Settings::default();
        settings.network.max_attempts = 0;
        assert!(matches!(
            validate(&settings),
            Err(DevopsError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn fallback_list_without_concrete_version_rejected() {
        let mut settings = Settings::default();
        settings
            .fallback_versions
            .insert(ToolIdentity::Jenkins, vec!["latest".to_string()]);
        let err = validate(&settings).unwrap_err();
        assert!(err.to_string().contains("fallback_versions.jenkins"));
    }

    #[test]
    fn default_path_is_under_home() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(".devops-cli/config.yml"));
        }
    }
}
