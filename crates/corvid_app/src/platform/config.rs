use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use corvid_engine::ClientSettings;
use corvid_logging::corvid_info;
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILENAME: &str = "corvid.ron";
pub const SERVER_URL_ENV: &str = "CORVID_SERVER_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid server url '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Contents of `corvid.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server_url: String,
    /// Derived from `server_url` when absent.
    pub ws_url: Option<String>,
    pub poll_interval_secs: u64,
    pub log_to_file: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000/api".to_string(),
            ws_url: None,
            poll_interval_secs: 5,
            log_to_file: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        corvid_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn with_server_override(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url.filter(|url| !url.trim().is_empty()) {
            self.server_url = url.trim().to_string();
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn client_settings(&self) -> Result<ClientSettings, ConfigError> {
        let ws_url = match &self.ws_url {
            Some(url) => url.clone(),
            None => derive_ws_url(&self.server_url)?,
        };
        Ok(ClientSettings {
            base_url: self.server_url.clone(),
            ws_url,
            ..ClientSettings::default()
        })
    }
}

/// `http://host:8000/api` becomes `ws://host:8000/ws`.
fn derive_ws_url(server_url: &str) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidUrl {
        url: server_url.to_string(),
        message,
    };
    let mut url = Url::parse(server_url).map_err(|err| invalid(err.to_string()))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid("cannot switch to a websocket scheme".into()))?;
    url.set_path("/ws");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
