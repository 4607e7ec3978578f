//! Configuration for the kinship engine and CLI.
//!
//! Loaded from `kinship.toml` in the working directory when present,
//! otherwise defaults. `KINSHIP_DB_PATH` (from the environment or a `.env`
//! file) overrides the database path.

use kinship_core::errors::{ExError, ExErrorKind};
use kinship_core::logging_facility::Profile;
use kinship_core::matching::MatchPolicy;
use kinship_core::RenderLimits;
use kinship_store::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "kinship.toml";

/// Environment variable overriding `storage.db_path`
pub const DB_PATH_ENV: &str = "KINSHIP_DB_PATH";

/// Widest accepted `matching.birth_year_window`, in years
pub const MAX_BIRTH_YEAR_WINDOW: i32 = 200;

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinshipConfig {
    pub storage: StorageConfig,
    pub render: RenderConfig,
    pub matching: MatchingConfig,
    pub logging: LoggingConfig,
}

impl KinshipConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: KinshipConfig =
            toml::from_str(content).map_err(|e| config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        // A missing .env is the common case
        dotenvy::dotenv().ok();

        let path = PathBuf::from(CONFIG_FILE);
        let mut config = if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(&path)?
        } else {
            tracing::debug!("no config file found, using defaults");
            Self::default()
        };

        if let Ok(db_path) = std::env::var(DB_PATH_ENV) {
            config.apply_db_path_override(&db_path);
        }

        Ok(config)
    }

    /// Replace the database path unless the override is blank
    pub fn apply_db_path_override(&mut self, db_path: &str) {
        if !db_path.trim().is_empty() {
            self.storage.db_path = PathBuf::from(db_path.trim());
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(config_error("storage.db_path must not be empty"));
        }

        if self.render.max_depth == 0 || self.render.max_nodes == 0 {
            return Err(config_error("render bounds must be > 0"));
        }

        if self.matching.birth_year_window < 0 || self.matching.close_birth_year_window < 0 {
            return Err(config_error("matching windows must be >= 0"));
        }

        if self.matching.birth_year_window > MAX_BIRTH_YEAR_WINDOW {
            return Err(config_error(format!(
                "matching.birth_year_window must be <= {}",
                MAX_BIRTH_YEAR_WINDOW
            )));
        }

        if self.matching.close_birth_year_window > self.matching.birth_year_window {
            return Err(config_error(
                "matching.close_birth_year_window must not exceed matching.birth_year_window",
            ));
        }

        if Profile::parse(&self.logging.profile).is_none() {
            return Err(config_error(format!(
                "unknown logging.profile '{}'",
                self.logging.profile
            )));
        }

        Ok(())
    }

    pub fn render_limits(&self) -> RenderLimits {
        RenderLimits {
            max_depth: self.render.max_depth,
            max_nodes: self.render.max_nodes,
        }
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            birth_year_window: self.matching.birth_year_window,
            close_birth_year_window: self.matching.close_birth_year_window,
        }
    }

    /// Logging profile; an unparseable value falls back to Development
    pub fn logging_profile(&self) -> Profile {
        Profile::parse(&self.logging.profile).unwrap_or(Profile::Development)
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".kinship/kinship.db"),
        }
    }
}

/// Tree rendering bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let limits = RenderLimits::default();
        Self {
            max_depth: limits.max_depth,
            max_nodes: limits.max_nodes,
        }
    }
}

/// Ancestor matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Run the background indexer at all
    pub enabled: bool,
    pub birth_year_window: i32,
    pub close_birth_year_window: i32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        let policy = MatchPolicy::default();
        Self {
            enabled: true,
            birth_year_window: policy.birth_year_window,
            close_birth_year_window: policy.close_birth_year_window,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "development" or "production"
    pub profile: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: "development".to_string(),
        }
    }
}

fn config_error(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("config_load")
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KinshipConfig::default();
        assert_eq!(config.storage.db_path, PathBuf::from(".kinship/kinship.db"));
        assert_eq!(config.render_limits(), RenderLimits::default());
        assert_eq!(config.match_policy(), MatchPolicy::default());
        assert!(config.matching.enabled);
        assert_eq!(config.logging_profile(), Profile::Development);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = KinshipConfig::from_toml(
            r#"
            [render]
            max_depth = 32

            [matching]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.render.max_depth, 32);
        assert_eq!(config.render.max_nodes, 100_000);
        assert!(!config.matching.enabled);
        assert_eq!(config.matching.birth_year_window, 5);
    }

    #[test]
    fn test_rejects_zero_bounds() {
        let err = KinshipConfig::from_toml("[render]\nmax_nodes = 0\n").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_rejects_close_window_wider_than_search() {
        let result = KinshipConfig::from_toml(
            "[matching]\nbirth_year_window = 1\nclose_birth_year_window = 3\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_birth_year_window_is_capped() {
        let err = KinshipConfig::from_toml("[matching]\nbirth_year_window = 2147483647\n")
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);

        let config = KinshipConfig::from_toml("[matching]\nbirth_year_window = 200\n").unwrap();
        assert_eq!(config.match_policy().birth_year_window, MAX_BIRTH_YEAR_WINDOW);
    }

    #[test]
    fn test_rejects_unknown_profile() {
        let result = KinshipConfig::from_toml("[logging]\nprofile = \"loud\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_db_path_override_ignores_blank() {
        let mut config = KinshipConfig::default();
        config.apply_db_path_override("   ");
        assert_eq!(config.storage.db_path, PathBuf::from(".kinship/kinship.db"));
        config.apply_db_path_override("/tmp/k.db");
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/k.db"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kinship.toml");
        std::fs::write(&path, "[storage]\ndb_path = \"data/k.db\"\n").unwrap();

        let config = KinshipConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("data/k.db"));
    }
}
