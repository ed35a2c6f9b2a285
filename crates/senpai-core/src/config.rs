use crate::{DEFAULT_API_HOST, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the whole config directory.
pub const CONFIG_DIR_ENV: &str = "SENPAI_CONFIG_DIR";
/// Environment variable that overrides `api.host` for one process.
pub const API_HOST_ENV: &str = "SENPAI_API_HOST";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub main: MainConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MainConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub persona: String,
    pub prog: String,
    pub version: String,
    pub command_color: String,
    pub comment_color: String,
    /// Offer the execution menu after an answer with commands.
    pub execute: bool,
    /// Send OS metadata along with questions.
    pub metadata: bool,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            token: None,
            persona: "default".to_string(),
            prog: "senpai".to_string(),
            version: "0".to_string(),
            command_color: "bold bright blue".to_string(),
            comment_color: "bright gray".to_string(),
            execute: true,
            metadata: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Resolves the per-user config directory (`.../senpai`).
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    Ok(platform_config_base()?.join("senpai"))
}

#[cfg(target_os = "windows")]
fn platform_config_base() -> Result<PathBuf> {
    std::env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("LOCALAPPDATA is not set; cannot locate config directory"))
}

#[cfg(target_os = "macos")]
fn platform_config_base() -> Result<PathBuf> {
    Ok(home_dir()?.join("Library").join("Application Support"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_config_base() -> Result<PathBuf> {
    Ok(home_dir()?.join(".config"))
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("HOME is not set; cannot locate config directory"))
}

impl AppConfig {
    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::config_path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&raw)
            .map_err(|err| anyhow::anyhow!("invalid config file {}: {err}", path.display()))?;
        Ok(cfg)
    }

    /// Loads the config, writing defaults first if the file is missing.
    pub fn ensure(dir: &Path) -> Result<Self> {
        if Self::config_path(dir).exists() {
            return Self::load(dir);
        }
        let cfg = Self::default();
        cfg.save(dir)?;
        Ok(cfg)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = Self::config_path(dir);
        fs::create_dir_all(
            path.parent()
                .ok_or_else(|| anyhow::anyhow!("invalid config path"))?,
        )?;
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Returns the API host, honoring `SENPAI_API_HOST`.
    pub fn api_host(&self) -> String {
        std::env::var(API_HOST_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.api.host.clone())
    }

    pub fn token(&self) -> Option<&str> {
        self.main
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_writes_defaults_once() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = AppConfig::ensure(dir.path()).expect("ensure");
        assert_eq!(cfg, AppConfig::default());
        assert!(AppConfig::config_path(dir.path()).exists());

        let raw = fs::read_to_string(AppConfig::config_path(dir.path())).expect("read");
        assert!(raw.contains("[main]"));
        assert!(raw.contains("command_color = \"bold bright blue\""));
        assert!(!raw.contains("token"));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            AppConfig::config_path(dir.path()),
            "[main]\npersona = \"angry pirate\"\nexecute = false\n",
        )
        .expect("write");
        let cfg = AppConfig::load(dir.path()).expect("load");
        assert_eq!(cfg.main.persona, "angry pirate");
        assert!(!cfg.main.execute);
        assert!(cfg.main.metadata);
        assert_eq!(cfg.api.host, DEFAULT_API_HOST);
    }

    #[test]
    fn save_round_trips_token() {
        let dir = TempDir::new().expect("tempdir");
        let mut cfg = AppConfig::default();
        cfg.main.token = Some("abc123".to_string());
        cfg.save(dir.path()).expect("save");
        let loaded = AppConfig::load(dir.path()).expect("load");
        assert_eq!(loaded.token(), Some("abc123"));
    }

    #[test]
    fn blank_token_is_treated_as_missing() {
        let mut cfg = AppConfig::default();
        cfg.main.token = Some("   ".to_string());
        assert_eq!(cfg.token(), None);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(AppConfig::config_path(dir.path()), "[main\n").expect("write");
        let err = AppConfig::load(dir.path()).expect_err("should fail");
        assert!(err.to_string().contains("config.toml"));
    }
}
