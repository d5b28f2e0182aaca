use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use tide_core::DEFAULT_LOAD_TIMEOUT;
use tide_engine::{AttachmentSettings, RendererSettings};

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "tide.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Page shown by the shell; the device token is merged into its query.
    pub base_url: String,
    /// Directory holding the cached device token.
    pub cache_dir: PathBuf,
    /// Directory receiving downloaded notification images.
    pub attachment_dir: PathBuf,
    /// `host:port` probed to decide whether the network is reachable.
    pub probe_addr: String,
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
    pub load_timeout_secs: u64,
    pub max_page_bytes: u64,
    pub notification_deadline_secs: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example.com/".to_string(),
            cache_dir: PathBuf::from(".tide"),
            attachment_dir: PathBuf::from(".tide/attachments"),
            probe_addr: "example.com:443".to_string(),
            probe_interval_ms: 2_000,
            probe_timeout_ms: 1_500,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT.as_secs(),
            max_page_bytes: RendererSettings::default().max_bytes,
            notification_deadline_secs: 25,
            log_destination: LogDestination::Terminal,
            log_level: "info".to_string(),
            log_file: PathBuf::from("tide.log"),
        }
    }
}

impl ShellConfig {
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn notification_deadline(&self) -> Duration {
        Duration::from_secs(self.notification_deadline_secs)
    }

    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            max_bytes: self.max_page_bytes,
            ..RendererSettings::default()
        }
    }

    pub fn attachment_settings(&self) -> AttachmentSettings {
        AttachmentSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ShellConfig::load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.load_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tide.ron");
        fs::write(
            &path,
            r#"(base_url: "https://x.test/app", log_destination: Both, log_level: "debug")"#,
        )
        .unwrap();

        let config = ShellConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "https://x.test/app");
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(config.level(), LevelFilter::Debug);
        assert_eq!(config.probe_interval_ms, ShellConfig::default().probe_interval_ms);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tide.ron");
        fs::write(&path, "(base_url: ").unwrap();

        let err = ShellConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = ShellConfig {
            log_level: "chatty".to_string(),
            ..ShellConfig::default()
        };
        assert_eq!(config.level(), LevelFilter::Info);
    }
}
