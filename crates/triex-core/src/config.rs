use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the two snapshot blobs.
    pub data_dir: PathBuf,
    pub autosave_interval_secs: u64,
    /// How long an idle connection may wait for its next request.
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub max_frame_len: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 61135,
            data_dir: PathBuf::from("./data"),
            autosave_interval_secs: 60,
            read_timeout_secs: 300,
            write_timeout_secs: 30,
            max_frame_len: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}
