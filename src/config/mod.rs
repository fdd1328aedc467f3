//! Configuration for pgtop

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::integrations::postgres::ConnectionSettings;

/// Global application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub connection: ConnectionConfig,
    pub sources: SourcesConfig,
    pub display: DisplayConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pgtop").join("config.toml"))
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.general.interval_ms.max(100))
    }

    pub fn message_lifetime(&self) -> Duration {
        Duration::from_millis(self.general.message_ms)
    }

    pub fn connection_settings(&self, password: Option<String>) -> ConnectionSettings {
        ConnectionSettings {
            host: self.connection.host.clone(),
            port: self.connection.port,
            user: self.connection.user.clone(),
            dbname: self.connection.dbname.clone(),
            password,
            application_name: self.connection.application_name.clone(),
            system_schema: self.sources.system_schema.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Collection period.
    pub interval_ms: u64,
    /// How long command line messages stay up.
    pub message_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            message_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub dbname: String,
    pub application_name: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "postgres".to_string());
        Self {
            host: "/var/run/postgresql".to_string(),
            port: 5432,
            dbname: user.clone(),
            user,
            application_name: "pgtop".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub diskstats: PathBuf,
    pub uptime: PathBuf,
    /// Schema with the `sys_proc_*` views on remote servers.
    pub system_schema: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            diskstats: PathBuf::from("/proc/diskstats"),
            uptime: PathBuf::from("/proc/uptime"),
            system_schema: "pgcenter".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub theme: String,
    pub show_disks: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "tokyo-night".to_string(),
            show_disks: true,
        }
    }
}

/// Write the default configuration to `path`.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("Configuration already exists. Use --force to overwrite.");
    }
    Config::default().save(path)?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            interval_ms = 500

            [connection]
            host = "db.internal"
            "#,
        )
        .unwrap();

        assert_eq!(config.interval(), Duration::from_millis(500));
        assert_eq!(config.general.message_ms, 2000);
        assert_eq!(config.connection.host, "db.internal");
        assert_eq!(config.connection.port, 5432);
        assert_eq!(config.sources.system_schema, "pgcenter");
        assert!(config.display.show_disks);
    }

    #[test]
    fn interval_has_a_floor() {
        let mut config = Config::default();
        config.general.interval_ms = 0;
        assert_eq!(config.interval(), Duration::from_millis(100));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pgtop").join("config.toml");

        let mut config = Config::default();
        config.connection.port = 6432;
        config.display.show_disks = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
    }
}
