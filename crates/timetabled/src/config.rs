/// Configuration for the timetable service
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "timetables.db".to_string()
}

impl ServerConfig {
    /// Loads configuration from a JSON file. Missing fields fall back to
    /// their defaults.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            address: default_address(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, "timetables.db");
    }

    #[test]
    fn test_explicit_fields_win() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"port": 9100, "db_path": ":memory:"}"#).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.db_path, ":memory:");
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("timetabled_config_test.json");
        fs::write(&path, r#"{"address": "0.0.0.0"}"#).unwrap();
        let config = ServerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.address, "0.0.0.0");
        let _ = fs::remove_file(&path);
    }
}
