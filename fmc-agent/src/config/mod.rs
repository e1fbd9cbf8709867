//! Application configuration
//!
//! Defaults, then the first config file found, then environment variables (`.env` included).
//!
//! File locations, first existing wins:
//! - `./fmc.toml`
//! - `./.fmc.toml`
//! - `<config dir>/fmc-agent/fmc.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::change_log::DEFAULT_MAX_OUTPUT_LEN;
use crate::operations::executor::DEFAULT_TIMEOUT;

const CONFIG_FILE_NAMES: &[&str] = &["fmc.toml", ".fmc.toml"];

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// RV&S server passed to commands as `RVS_SERVER`
    #[serde(alias = "rv_s_server")]
    pub rvs_server: Option<String>,
    /// Simulate commands even when `run --execute` is given
    pub dry_run: bool,
    /// One JSON object per log line
    pub json_logging: bool,
    pub log_level: String,
    pub command_timeout_secs: u64,
    /// Cap on CLI output stored in the change log, in characters
    pub max_output_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rvs_server: None,
            dry_run: false,
            json_logging: false,
            log_level: "info".to_string(),
            command_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }
}

/// Loaded configuration plus what happened while loading it
///
/// Warnings are kept rather than logged because loading runs before the logger exists.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: AppConfig,
    /// File the settings came from, if any
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Load from the default locations and the process environment
    pub fn load() -> LoadedConfig {
        dotenvy::dotenv().ok();
        load_from(&default_candidates(), |key| std::env::var(key).ok())
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.command_timeout_secs)
    }
}

/// Config file candidates, in lookup order
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = CONFIG_FILE_NAMES.iter().map(PathBuf::from).collect();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("fmc-agent").join("fmc.toml"));
    }
    candidates
}

/// Load from explicit candidates with an injectable environment lookup
pub fn load_from<F>(candidates: &[PathBuf], env: F) -> LoadedConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut loaded = LoadedConfig::default();

    if let Some(path) = candidates.iter().find(|p| p.is_file()) {
        match read_file(path) {
            Ok(config) => {
                loaded.config = config;
                loaded.source = Some(path.clone());
            }
            Err(warning) => loaded.warnings.push(warning),
        }
    }

    apply_env(&mut loaded, env);
    loaded
}

fn read_file(path: &Path) -> Result<AppConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Ignoring config file {}: {}", path.display(), e))?;
    AppConfig::from_toml(&content)
        .map_err(|e| format!("Ignoring invalid config file {}: {}", path.display(), e.message()))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

fn apply_env<F>(loaded: &mut LoadedConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    let config = &mut loaded.config;

    if let Some(server) = var("FMC_RVS_SERVER") {
        config.rvs_server = Some(server.trim().to_string());
    }
    if let Some(value) = var("FMC_DRY_RUN") {
        config.dry_run = parse_bool(&value);
    }
    if let Some(value) = var("FMC_JSON_LOGGING") {
        config.json_logging = parse_bool(&value);
    }
    if let Some(level) = var("FMC_LOG_LEVEL") {
        config.log_level = level.trim().to_lowercase();
    }
    if let Some(value) = var("FMC_COMMAND_TIMEOUT_SECS") {
        match value.trim().parse() {
            Ok(secs) => config.command_timeout_secs = secs,
            Err(_) => loaded
                .warnings
                .push(format!("Ignoring FMC_COMMAND_TIMEOUT_SECS={}: not a number", value)),
        }
    }
    if let Some(value) = var("FMC_MAX_OUTPUT_LEN") {
        match value.trim().parse() {
            Ok(len) => config.max_output_len = len,
            Err(_) => loaded
                .warnings
                .push(format!("Ignoring FMC_MAX_OUTPUT_LEN={}: not a number", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        |_| None
    }

    #[test]
    fn test_defaults() {
        let loaded = load_from(&[], no_env());

        assert_eq!(loaded.config, AppConfig::default());
        assert_eq!(loaded.config.command_timeout_secs, 300);
        assert_eq!(loaded.config.max_output_len, 2000);
        assert!(loaded.source.is_none());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fmc.toml");
        std::fs::write(
            &path,
            "rv_s_server = \"rvs.example:7001\"\ndry_run = true\ncommand_timeout_secs = 60\n",
        )
        .unwrap();

        let loaded = load_from(&[path.clone()], no_env());

        assert_eq!(loaded.config.rvs_server.as_deref(), Some("rvs.example:7001"));
        assert!(loaded.config.dry_run);
        assert!(!loaded.config.json_logging);
        assert_eq!(loaded.config.command_timeout_secs, 60);
        assert_eq!(loaded.source, Some(path));
    }

    #[test]
    fn test_first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("fmc.toml");
        let second = dir.path().join(".fmc.toml");
        std::fs::write(&second, "dry_run = true\n").unwrap();

        let loaded = load_from(&[first, second.clone()], no_env());
        assert_eq!(loaded.source, Some(second));
        assert!(loaded.config.dry_run);
    }

    #[test]
    fn test_invalid_file_is_ignored_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fmc.toml");
        std::fs::write(&path, "dry_run = maybe\n").unwrap();

        let loaded = load_from(&[path], no_env());

        assert_eq!(loaded.config, AppConfig::default());
        assert!(loaded.source.is_none());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("Ignoring invalid config file"));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fmc.toml");
        std::fs::write(&path, "rvs_server = \"from-file\"\ndry_run = true\n").unwrap();

        let loaded = load_from(
            &[path],
            env_of(&[
                ("FMC_RVS_SERVER", "from-env"),
                ("FMC_DRY_RUN", "no"),
                ("FMC_JSON_LOGGING", "YES"),
                ("FMC_LOG_LEVEL", "DEBUG"),
                ("FMC_MAX_OUTPUT_LEN", "500"),
            ]),
        );

        assert_eq!(loaded.config.rvs_server.as_deref(), Some("from-env"));
        assert!(!loaded.config.dry_run);
        assert!(loaded.config.json_logging);
        assert_eq!(loaded.config.log_level, "debug");
        assert_eq!(loaded.config.max_output_len, 500);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let loaded = load_from(&[], env_of(&[("FMC_DRY_RUN", ""), ("FMC_RVS_SERVER", "  ")]));
        assert!(!loaded.config.dry_run);
        assert!(loaded.config.rvs_server.is_none());
    }

    #[test]
    fn test_bad_number_in_env_warns() {
        let loaded = load_from(&[], env_of(&[("FMC_COMMAND_TIMEOUT_SECS", "soon")]));
        assert_eq!(loaded.config.command_timeout_secs, 300);
        assert_eq!(loaded.warnings.len(), 1);
    }

    #[test]
    fn test_parse_bool() {
        for value in ["true", "TRUE", "1", "yes", " Yes "] {
            assert!(parse_bool(value), "{}", value);
        }
        for value in ["false", "0", "no", "on", ""] {
            assert!(!parse_bool(value), "{}", value);
        }
    }
}
