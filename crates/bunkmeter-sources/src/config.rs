//! Configuration loading and source factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bunkmeter_core::statistics::Target;
use bunkmeter_core::traits::AttendanceSource;

use crate::remote::{Credentials, RemoteSource};
use crate::sheet::SheetSource;

/// Connection settings for the scraping backend.
///
/// Note: Custom Debug impl masks the password to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub register_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("register_number", &self.register_number)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            register_number: None,
            password: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Top-level bunkmeter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BunkmeterConfig {
    /// Minimum attendance percentage to maintain.
    #[serde(default = "default_target_percent")]
    pub target_percent: f64,
    /// Attendance sheet used when no `--sheet` is given.
    #[serde(default = "default_sheet")]
    pub sheet: PathBuf,
    /// Default output format: table, json, markdown or csv.
    #[serde(default = "default_output_format")]
    pub output_format: String,
    /// Scraping backend settings.
    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_target_percent() -> f64 {
    75.0
}
fn default_sheet() -> PathBuf {
    PathBuf::from("attendance.toml")
}
fn default_output_format() -> String {
    "table".to_string()
}

impl Default for BunkmeterConfig {
    fn default() -> Self {
        Self {
            target_percent: default_target_percent(),
            sheet: default_sheet(),
            output_format: default_output_format(),
            remote: RemoteConfig::default(),
        }
    }
}

impl BunkmeterConfig {
    /// The configured attendance target, validated.
    pub fn target(&self) -> Result<Target> {
        Target::from_percent(self.target_percent).context("invalid target_percent in configuration")
    }
}

/// Resolve a field that is exactly `${VAR_NAME}` from the environment.
///
/// An unset variable resolves to an empty string. Anything else, including
/// a `${` in the middle of a password, is taken literally.
fn resolve_env_vars(s: &str) -> String {
    resolve_with(s, |name| std::env::var(name).ok())
}

fn resolve_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    match s
        .trim()
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        Some(name) if !name.is_empty() && !name.contains(|c| c == '{' || c == '}') => {
            lookup(name).unwrap_or_default()
        }
        _ => s.to_string(),
    }
}

fn resolve_remote_config(remote: &RemoteConfig) -> RemoteConfig {
    RemoteConfig {
        base_url: resolve_env_vars(&remote.base_url),
        register_number: remote.register_number.as_deref().map(resolve_env_vars),
        password: remote.password.as_deref().map(resolve_env_vars),
        timeout_secs: remote.timeout_secs,
    }
}

/// Apply `BUNKMETER_REGISTER_NUMBER` / `BUNKMETER_PASSWORD` style overrides.
fn apply_env_overrides(config: &mut BunkmeterConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(register_number) = lookup("BUNKMETER_REGISTER_NUMBER") {
        config.remote.register_number = Some(register_number);
    }
    if let Some(password) = lookup("BUNKMETER_PASSWORD") {
        config.remote.password = Some(password);
    }
    if let Some(base_url) = lookup("BUNKMETER_BASE_URL") {
        config.remote.base_url = base_url;
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `bunkmeter.toml` in the current directory
/// 2. `~/.config/bunkmeter/config.toml`
///
/// Environment variable overrides: `BUNKMETER_REGISTER_NUMBER`,
/// `BUNKMETER_PASSWORD`, `BUNKMETER_BASE_URL`.
pub fn load_config_from(path: Option<&Path>) -> Result<BunkmeterConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("bunkmeter.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<BunkmeterConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => BunkmeterConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.remote = resolve_remote_config(&config.remote);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bunkmeter"))
}

/// Build credentials for the scraping backend from the configuration.
pub fn remote_credentials(config: &RemoteConfig) -> Result<Credentials> {
    let register_number = config
        .register_number
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .context("no register number configured (set remote.register_number or BUNKMETER_REGISTER_NUMBER)")?;
    let password = config
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .context("no password configured (set remote.password or BUNKMETER_PASSWORD)")?;
    Credentials::new(register_number, password)
}

/// Create a source by name: `sheet` reads the configured sheet file,
/// `remote` goes through the scraping backend.
pub fn create_source(kind: &str, config: &BunkmeterConfig) -> Result<Box<dyn AttendanceSource>> {
    match kind {
        "sheet" => Ok(Box::new(SheetSource::new(&config.sheet))),
        "remote" => {
            let credentials = remote_credentials(&config.remote)?;
            Ok(Box::new(
                RemoteSource::new(&config.remote.base_url, credentials)
                    .with_timeout(config.remote.timeout_secs),
            ))
        }
        other => anyhow::bail!("unknown source: {other} (expected 'sheet' or 'remote')"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_BUNKMETER_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_BUNKMETER_TEST_VAR}"), "hello");
        std::env::remove_var("_BUNKMETER_TEST_VAR");
    }

    #[test]
    fn only_whole_field_references_resolve() {
        let lookup = |name: &str| match name {
            "PASS" => Some("from-env".to_string()),
            "LOOP" => Some("${LOOP}".to_string()),
            _ => None,
        };
        assert_eq!(resolve_with("${PASS}", lookup), "from-env");
        assert_eq!(resolve_with("${UNSET}", lookup), "");
        // Passwords may contain `${...}` literally.
        assert_eq!(resolve_with("pa${PASS}ss", lookup), "pa${PASS}ss");
        assert_eq!(resolve_with("${PASS", lookup), "${PASS");
        assert_eq!(resolve_with("${}", lookup), "${}");
        // A value that itself looks like a reference is not expanded again.
        assert_eq!(resolve_with("${LOOP}", lookup), "${LOOP}");
    }

    #[test]
    fn default_config() {
        let config = BunkmeterConfig::default();
        assert_eq!(config.target_percent, 75.0);
        assert_eq!(config.sheet, PathBuf::from("attendance.toml"));
        assert_eq!(config.remote.base_url, "http://localhost:5000");
        assert_eq!(config.target().unwrap().ratio(), 0.75);
    }

    #[test]
    fn parse_config() {
        let toml_str = r#"
target_percent = 80.0
sheet = "sem5.toml"
output_format = "json"

[remote]
base_url = "https://attendance.example.edu"
register_number = "21691A0501"
password = "secret"
"#;
        let config: BunkmeterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.target_percent, 80.0);
        assert_eq!(config.sheet, PathBuf::from("sem5.toml"));
        assert_eq!(config.remote.timeout_secs, 60);
        assert_eq!(config.remote.password.as_deref(), Some("secret"));
    }

    #[test]
    fn invalid_target_is_rejected() {
        let config = BunkmeterConfig {
            target_percent: 100.0,
            ..Default::default()
        };
        assert!(config.target().is_err());
    }

    #[test]
    fn debug_masks_password() {
        let config = RemoteConfig {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn env_overrides() {
        let mut config = BunkmeterConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            "BUNKMETER_PASSWORD" => Some("from-env".to_string()),
            "BUNKMETER_REGISTER_NUMBER" => Some("21691A0599".to_string()),
            _ => None,
        });
        assert_eq!(config.remote.password.as_deref(), Some("from-env"));
        assert_eq!(config.remote.register_number.as_deref(), Some("21691A0599"));
        assert_eq!(config.remote.base_url, "http://localhost:5000");
    }

    #[test]
    fn load_missing_explicit_config() {
        let err = load_config_from(Some(Path::new("/nonexistent/bunkmeter.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bunkmeter.toml");
        std::fs::write(&path, "target_percent = 70.0\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.target_percent, 70.0);
    }

    #[test]
    fn remote_source_needs_credentials() {
        let config = BunkmeterConfig::default();
        let err = create_source("remote", &config).err().unwrap();
        assert!(err.to_string().contains("register number"));
        assert!(create_source("sheet", &config).is_ok());
        assert!(create_source("carrier-pigeon", &config).is_err());
    }
}
