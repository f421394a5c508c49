// Copyright 2025 AgentReplay (https://github.com/agentreplay)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Stringlens Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the string snapshot
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Persist records to `data_dir`; when false everything lives in memory
    #[serde(default = "default_persist")]
    pub persist: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Output format for log lines
    #[serde(default)]
    pub format: LogFormat,

    /// Default filter directives, used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./stringlens-data")
}

fn default_persist() -> bool {
    true
}

fn default_log_filter() -> String {
    "stringlens_server=info,stringlens_query=info,tower_http=info".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![],
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            persist: default_persist(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - STRINGLENS_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:8000)
    /// - STRINGLENS_ENABLE_CORS: Enable CORS (default: true)
    /// - STRINGLENS_DATA_DIR: Data directory path (default: ./stringlens-data)
    /// - STRINGLENS_PERSIST: Persist records to disk (default: true)
    /// - STRINGLENS_LOG_FORMAT: `pretty` or `json` (default: pretty)
    pub fn from_env() -> Self {
        Self::default().merge_with(|key| std::env::var(key).ok())
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        Ok(config.merge_with(|key| std::env::var(key).ok()))
    }

    /// Override fields whose variable `lookup` returns (env takes priority)
    fn merge_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("STRINGLENS_HTTP_ADDR") {
            self.server.listen_addr = addr;
        }

        if let Some(cors) = lookup("STRINGLENS_ENABLE_CORS") {
            self.server.enable_cors = cors.parse().unwrap_or(true);
        }

        if let Some(data_dir) = lookup("STRINGLENS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Some(persist) = lookup("STRINGLENS_PERSIST") {
            self.storage.persist = persist.parse().unwrap_or(true);
        }

        if let Some(format) = lookup("STRINGLENS_LOG_FORMAT") {
            self.logging.format = if format.eq_ignore_ascii_case("json") {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            };
        }

        self
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.storage.persist {
            if self.storage.data_dir.exists() && !self.storage.data_dir.is_dir() {
                anyhow::bail!(
                    "Data directory {:?} exists but is not a directory",
                    self.storage.data_dir
                );
            }
            if !self.storage.data_dir.exists() {
                std::fs::create_dir_all(&self.storage.data_dir)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:8000");
        assert!(config.storage.persist);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stringlens.toml");
        std::fs::write(
            &path,
            r#"
[server]
listen_addr = "0.0.0.0:9000"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert!(config.server.enable_cors);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.storage.data_dir, PathBuf::from("./stringlens-data"));
    }

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::default().merge_with(lookup_from(&[
            ("STRINGLENS_PERSIST", "false"),
            ("STRINGLENS_LOG_FORMAT", "JSON"),
            ("STRINGLENS_DATA_DIR", "/var/lib/stringlens"),
        ]));

        assert!(!config.storage.persist);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/stringlens"));
        assert_eq!(config.server.listen_addr, "127.0.0.1:8000");
    }

    #[test]
    fn test_env_takes_priority_over_file() {
        let mut from_file = ServerConfig::default();
        from_file.server.listen_addr = "0.0.0.0:9000".to_string();
        from_file.logging.format = LogFormat::Json;

        let config = from_file.merge_with(lookup_from(&[
            ("STRINGLENS_HTTP_ADDR", "127.0.0.1:7000"),
            ("STRINGLENS_LOG_FORMAT", "pretty"),
        ]));
        assert_eq!(config.server.listen_addr, "127.0.0.1:7000");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.server.enable_cors);
    }

    #[test]
    fn test_validate_rejects_bad_addr() {
        let mut config = ServerConfig::default();
        config.storage.persist = false;
        config.server.listen_addr = "not an address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.data_dir = dir.path().join("nested").join("data");

        config.validate().unwrap();
        assert!(config.storage.data_dir.is_dir());
    }
}
