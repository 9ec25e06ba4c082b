use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// How to reach the running mpv instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpvConfig {
    /// Path of mpv's `--input-ipc-server` socket.
    #[serde(default = "platform::default_mpv_socket_path")]
    pub socket_path: PathBuf,
    /// Upper bound for connecting and for each reply read, in milliseconds.
    #[serde(default = "default_ipc_timeout_ms")]
    pub ipc_timeout_ms: u64,
}

impl MpvConfig {
    pub fn ipc_timeout(&self) -> Duration {
        Duration::from_millis(self.ipc_timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            socket_path: platform::default_mpv_socket_path(),
            ipc_timeout_ms: default_ipc_timeout_ms(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7076
}

fn default_ipc_timeout_ms() -> u64 {
    5000
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads `config_path`, writing out the defaults first if it does not exist.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.port, 7076);
        assert_eq!(config.http.bind_address, "0.0.0.0");
        assert!(config.mpv.socket_path.ends_with("mpv/mpv.sock"));
        assert_eq!(config.mpv.ipc_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [mpv]
            socket_path = "/run/user/1000/mpv.sock"
            "#,
        )
        .unwrap();
        assert_eq!(config.mpv.socket_path, PathBuf::from("/run/user/1000/mpv.sock"));
        assert_eq!(config.mpv.ipc_timeout_ms, 5000);
        assert_eq!(config.http.port, 7076);
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.http.port, 7076);

        std::fs::write(&path, "[http]\nport = 8080\n").unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.http.port, 8080);
        assert_eq!(reloaded.http.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[http\nport = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
