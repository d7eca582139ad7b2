//! Configuration management for the EventDesk backend
//!
//! This module handles loading, validation, and saving of the operator CLI
//! settings. Configuration is a YAML file; command-line arguments override
//! individual fields after loading.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{BackendResult, ConfigError};
use eventdesk_shared::logging::LoggingConfig;
use eventdesk_shared::{SharedError, TwoFactorConfig};

/// Main configuration structure for the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// TOTP parameters and issuer name
    pub totp: TwoFactorConfig,

    /// Record storage settings
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Two-factor record storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding per-account two-factor records
    pub records_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let records_file = dirs::data_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("eventdesk")
            .join("two_factor.json");

        Self { records_file }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("eventdesk").join("backend.yml"))
            .unwrap_or_else(|| PathBuf::from("/etc/eventdesk/backend.yml"))
    }

    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from: {:?}", path);

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        // Check file permissions for security
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(path).context("Failed to read config file metadata")?;
            let permissions = metadata.permissions().mode() & 0o777;

            if permissions & 0o044 != 0 {
                warn!(
                    "Configuration file {:?} has overly permissive permissions: {:o}",
                    path, permissions
                );
            }
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content).map_err(ConfigError::Parse)?;

        info!("Configuration loaded successfully from: {:?}", path);
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BackendResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_yaml::to_string(self).map_err(ConfigError::Parse)?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600); // Owner read/write only
            fs::set_permissions(path, perms)?;
        }

        info!("Configuration saved to: {:?}", path);
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> BackendResult<()> {
        self.totp.validate().map_err(|e| match e {
            SharedError::InvalidConfig { field, reason } => ConfigError::Invalid {
                field: format!("totp.{field}"),
                reason,
            },
            other => ConfigError::Invalid {
                field: "totp".to_string(),
                reason: other.to_string(),
            },
        })?;

        if self.storage.records_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage.records_file".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.storage.records_file.is_dir() {
            return Err(ConfigError::Invalid {
                field: "storage.records_file".to_string(),
                reason: "must be a file, not a directory".to_string(),
            }
            .into());
        }

        if self.totp.window > 2 {
            warn!(
                "Large verification window ({} steps), codes stay valid for {} seconds",
                self.totp.window,
                (2 * u64::from(self.totp.window) + 1) * self.totp.period
            );
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use assert_matches::assert_matches;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.totp.issuer, "EventDesk");
        assert!(config.storage.records_file.ends_with("two_factor.json"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml_str = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_file() {
        let yaml = "totp:\n  issuer: Box Office\n  digits: 8\nlogging:\n  level: debug\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.totp.issuer, "Box Office");
        assert_eq!(config.totp.digits, 8);
        assert_eq!(config.totp.period, 30);
        assert_eq!(
            config.logging.level,
            eventdesk_shared::logging::LogLevel::Debug
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.totp.digits = 4;
        assert_matches!(
            config.validate(),
            Err(BackendError::Config(ConfigError::Invalid { ref field, .. })) if field == "totp.digits"
        );
        config.totp.digits = 6;

        config.storage.records_file = PathBuf::new();
        assert!(config.validate().is_err());

        let temp_dir = tempdir().unwrap();
        config.storage.records_file = temp_dir.path().to_path_buf();
        assert!(config.validate().is_err());

        config.storage.records_file = temp_dir.path().join("records.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.totp.issuer = "Summer Gala".to_string();

        config.save(temp_file.path()).unwrap();
        let loaded_config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempdir().unwrap();
        let result = Config::load(temp_dir.path().join("missing.yml"));
        assert_matches!(result, Err(BackendError::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("backend.yml");
        fs::write(&path, "totp: [not, a, map]").unwrap();

        assert_matches!(
            Config::load(&path),
            Err(BackendError::Config(ConfigError::Parse(_)))
        );
    }
}
