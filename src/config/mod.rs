//! Configuration loading.
//!
//! Everything works with zero configuration: the built-in registry and
//! database defaults match the stock development environment. A
//! `basecamp.yml` in the working directory (or a `--config` path) can
//! override database settings and add or replace dependency entries.

use crate::error::{Result, SetupError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "basecamp.yml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// Database connection and provisioning settings.
    pub database: DatabaseConfig,

    /// HTTP timeout for installer downloads, in seconds.
    pub download_timeout_secs: Option<u64>,

    /// Custom dependency entries; a built-in name here replaces the built-in.
    pub custom: HashMap<String, CustomDependency>,
}

/// Database connection and provisioning settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Schema/database name the application expects.
    pub database: String,

    /// Account used for provisioning.
    pub user: String,

    /// Password for the provisioning account (also set as the server root
    /// password during a silent server install).
    pub password: String,

    /// Authentication plugin the application's client library supports.
    pub auth_plugin: String,

    /// SQL script that creates the schema, relative to the working directory.
    pub schema_script: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database: "onlyoffice".to_string(),
            user: "root".to_string(),
            password: "onlyoffice".to_string(),
            auth_plugin: "mysql_native_password".to_string(),
            schema_script: PathBuf::from("schema/mysql/createdb.sql"),
        }
    }
}

/// A custom dependency entry from config.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomDependency {
    /// Remote package to download before installing.
    #[serde(default)]
    pub download: Option<CustomDownload>,

    /// Install command; args may use the `{installer}` placeholder.
    pub install: CustomCommand,

    /// Presence probe; omit to install unconditionally.
    #[serde(default)]
    pub probe: Option<CustomProbe>,

    /// Silent uninstall command.
    #[serde(default)]
    pub uninstall: Option<CustomCommand>,

    /// Shown when no uninstall command exists.
    #[serde(default)]
    pub uninstall_hint: Option<String>,
}

/// Remote package location for a custom dependency.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomDownload {
    pub url: String,
    pub file_name: String,
}

/// A program plus arguments, as written in YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// A marker-match probe, as written in YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomProbe {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub marker: String,
    #[serde(default)]
    pub version_pattern: Option<String>,
}

impl SetupConfig {
    /// Load configuration.
    ///
    /// With an explicit path, the file must exist and parse. Without one,
    /// `basecamp.yml` in `root` is used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE_NAME);
                if !candidate.exists() {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = std::fs::read_to_string(&path)?;
        let config: SetupConfig =
            serde_yaml::from_str(&content).map_err(|e| SetupError::ConfigParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_environment() {
        let config = SetupConfig::default();
        assert_eq!(config.database.database, "onlyoffice");
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.auth_plugin, "mysql_native_password");
        assert_eq!(
            config.database.schema_script,
            PathBuf::from("schema/mysql/createdb.sql")
        );
        assert!(config.custom.is_empty());
    }

    #[test]
    fn load_missing_default_file_yields_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = SetupConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.database.database, "onlyoffice");
    }

    #[test]
    fn load_parses_database_overrides() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "database:\n  database: myapp\n  password: s3cret\n",
        )
        .unwrap();

        let config = SetupConfig::load(None, temp.path()).unwrap();
        assert_eq!(config.database.database, "myapp");
        assert_eq!(config.database.password, "s3cret");
        // Unspecified fields keep their defaults.
        assert_eq!(config.database.user, "root");
    }

    #[test]
    fn load_parses_custom_dependency() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            concat!(
                "custom:\n",
                "  Redis:\n",
                "    install:\n",
                "      program: choco\n",
                "      args: [install, redis]\n",
                "    probe:\n",
                "      program: redis-cli\n",
                "      args: [--version]\n",
                "      marker: redis-cli\n",
            ),
        )
        .unwrap();

        let config = SetupConfig::load(None, temp.path()).unwrap();
        let redis = config.custom.get("Redis").unwrap();
        assert_eq!(redis.install.program, "choco");
        assert_eq!(redis.probe.as_ref().unwrap().marker, "redis-cli");
        assert!(redis.download.is_none());
    }

    #[test]
    fn load_invalid_yaml_is_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "database: [not, a, mapping]\n").unwrap();

        let err = SetupConfig::load(None, temp.path()).unwrap_err();
        assert!(matches!(err, SetupError::ConfigParseError { .. }));
    }

    #[test]
    fn load_explicit_missing_path_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.yml");
        assert!(SetupConfig::load(Some(&missing), temp.path()).is_err());
    }
}
