//! Layered configuration loading with `figment`.
//!
//! # Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile file (`tether.{profile}.toml` / `tether.{profile}.yaml`)
//! 3. Main file (`tether.toml`, `config.toml`, `tether.yaml`, ...)
//! 4. Environment variables (`TETHER_*`)
//! 5. Programmatic merges
//!
//! File formats are gated by the `toml-config` *(default)* and `yaml-config`
//! features.
//!
//! # Environment Variable Mapping
//!
//! `TETHER_` prefix, `__` between path segments:
//!
//! - `TETHER_API__TOKEN=xoxb-...` → `api.token`
//! - `TETHER_LOGGING__LEVEL=debug` → `logging.level`
//! - `TETHER_SOCKET_MODE__ENABLED=true` → `socket_mode.enabled`
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/tether.toml")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::TetherConfig;

const ENV_PREFIX: &str = "TETHER_";
const PROFILE_VAR: &str = "TETHER_PROFILE";

/// Selects the profile-specific file merged under the main one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads `TETHER_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder over the configuration sources.
pub struct ConfigLoader {
    overrides: Vec<TetherConfig>,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Vec::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory searched for configuration files.
    ///
    /// Without any search path the current directory and the user config
    /// directory (`~/.config/tether` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges `config` over every other source.
    pub fn merge(mut self, config: TetherConfig) -> Self {
        self.overrides.push(config);
        self
    }

    pub fn load(self) -> ConfigResult<TetherConfig> {
        let profile = self.profile.clone();
        let config: TetherConfig = self.figment()?.extract()?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            socket_mode = config.socket_mode.enabled,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(TetherConfig::default()));

        match &self.config_file {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                figment = merge_file(figment, path)?;
            }
            Some(path) => return Err(ConfigError::FileNotFound(path.clone())),
            None => figment = self.search_files(figment),
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        for config in self.overrides {
            figment = figment.merge(Serialized::defaults(config));
        }
        Ok(figment)
    }

    fn search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("tether"));
        }
        paths
    }

    /// Merges the first main file found, preceded by its profile file.
    fn search_files(&self, mut figment: Figment) -> Figment {
        let mut candidates: Vec<&str> = Vec::new();
        #[cfg(feature = "toml-config")]
        candidates.extend(["tether.toml", "config.toml"]);
        #[cfg(feature = "yaml-config")]
        candidates.extend(["tether.yaml", "tether.yml", "config.yaml", "config.yml"]);

        for dir in self.search_paths() {
            for name in &candidates {
                let main = dir.join(name);
                if !main.exists() {
                    continue;
                }
                if let Some((stem, ext)) = name.rsplit_once('.') {
                    let profiled = dir.join(format!("{stem}.{}.{ext}", self.profile));
                    if profiled.exists() {
                        debug!(path = %profiled.display(), "Loading profile configuration");
                        figment = merge_file(figment.clone(), &profiled).unwrap_or(figment);
                    }
                }
                info!(path = %main.display(), "Loading configuration file");
                return merge_file(figment.clone(), &main).unwrap_or(figment);
            }
        }

        debug!("No configuration file found, using defaults");
        figment
    }
}

/// Merges one file, chosen by extension among the enabled formats.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => {
            let _ = figment;
            Err(ConfigError::ParseError(format!(
                "unsupported or disabled configuration format: .{ext}"
            )))
        }
    }
}

/// Loads from the default locations.
pub fn load_config() -> ConfigResult<TetherConfig> {
    ConfigLoader::new().load()
}

/// Loads `path` plus environment overrides.
pub fn load_config_from_file(path: impl AsRef<Path>) -> ConfigResult<TetherConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogLevel, LoggingConfig};
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config, TetherConfig::default());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_nested_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("TETHER_API__TOKEN", "xoxb-env");
            jail.set_env("TETHER_SOCKET_MODE__ENABLED", "true");
            jail.set_env("TETHER_LOGGING__LEVEL", "trace");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.api.token.as_deref(), Some("xoxb-env"));
            assert!(config.socket_mode.enabled);
            assert_eq!(config.logging.level, LogLevel::Trace);
            Ok(())
        });
    }

    #[test]
    fn profile_is_read_from_environment() {
        Jail::expect_with(|jail| {
            jail.set_env(PROFILE_VAR, "prod");
            assert_eq!(Profile::from_env(), Profile::Production);
            jail.set_env(PROFILE_VAR, "staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".into()));
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("absent.toml");
            let err = ConfigLoader::new().file(&path).load().unwrap_err();
            assert!(matches!(err, ConfigError::FileNotFound(p) if p == path));
            Ok(())
        });
    }

    #[test]
    fn programmatic_merge_wins() {
        Jail::expect_with(|jail| {
            jail.set_env("TETHER_LOGGING__LEVEL", "trace");
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .merge(TetherConfig {
                    logging: LoggingConfig {
                        level: LogLevel::Error,
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, LogLevel::Error);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn profile_file_sits_under_main_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tether.production.toml",
                r#"
                [api]
                base_url = "https://profile.example/api/"
                timeout_ms = 5000
                "#,
            )?;
            jail.create_file(
                "tether.toml",
                r#"
                [api]
                base_url = "https://main.example/api/"
                "#,
            )?;

            let config = ConfigLoader::new()
                .profile("production")
                .search_path(jail.directory())
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.api.base_url, "https://main.example/api/");
            assert_eq!(config.api.timeout_ms, 5000);
            Ok(())
        });
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn environment_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[api]\ntoken = \"xoxb-file\"\n")?;
            jail.set_env("TETHER_API__TOKEN", "xoxb-env");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .map_err(|e| e.to_string())?;
            assert_eq!(config.api.token.as_deref(), Some("xoxb-env"));
            Ok(())
        });
    }
}
