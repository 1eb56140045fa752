//! Layered daemon settings
//!
//! Built-in defaults, then an optional TOML file (`CCTV_CONFIG`, default
//! `cctv.toml`), then `CCTV__SECTION__KEY` environment variables.

use cctv_core::application::AttachmentLimits;
use cctv_core::domain::TransitionPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "cctv.toml";
const DEFAULT_DB_PATH: &str = "~/.cctv/requests.db";
const ENV_PREFIX: &str = "CCTV";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub rpc: RpcSettings,
    pub upload: UploadSettings,
    pub notify: NotifySettings,
    pub lifecycle: LifecycleSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub staff_token: Option<String>,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
    pub max_response_body_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Unset: any submission carrying files fails
    #[serde(default)]
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    /// Decoded size cap per file
    pub max_bytes: usize,
    pub max_files: usize,
}

impl UploadSettings {
    pub fn limits(&self) -> AttachmentLimits {
        AttachmentLimits {
            max_bytes: self.max_bytes,
            max_files: self.max_files,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifySettings {
    pub endpoint: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    pub timeout_secs: u64,
}

impl NotifySettings {
    /// Both secrets, when present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.access_token.as_deref().filter(|s| !s.is_empty())?;
        let recipient = self.recipient.as_deref().filter(|s| !s.is_empty())?;
        Some((token, recipient))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleSettings {
    pub transition_policy: TransitionPolicy,
    pub utc_offset_hours: i32,
}

impl Settings {
    /// Load from the file named by `CCTV_CONFIG` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CCTV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(Some(&path), Environment::with_prefix(ENV_PREFIX))
    }

    pub fn from_sources(file: Option<&str>, env: Environment) -> Result<Self, ConfigError> {
        let db_url = format!("sqlite://{}", shellexpand::tilde(DEFAULT_DB_PATH));

        let mut builder = Config::builder()
            .set_default("database.url", db_url)?
            .set_default("rpc.host", "127.0.0.1")?
            .set_default("rpc.port", 9530)?
            .set_default("rpc.rate_limit_burst", 60)?
            .set_default("rpc.rate_limit_per_sec", 10)?
            .set_default("rpc.max_response_body_size", 32 * 1024 * 1024)?
            .set_default("upload.timeout_secs", 30)?
            .set_default("upload.max_bytes", AttachmentLimits::DEFAULT_MAX_BYTES as i64)?
            .set_default("upload.max_files", AttachmentLimits::DEFAULT_MAX_FILES as i64)?
            .set_default("notify.endpoint", cctv_infra_http::DEFAULT_PUSH_ENDPOINT)?
            .set_default("notify.timeout_secs", 10)?
            .set_default("lifecycle.transition_policy", "permissive")?
            .set_default("lifecycle.utc_offset_hours", 7)?;

        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path).required(false));
        }

        builder
            .add_source(env.prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Filesystem path behind a `sqlite://` URL, if any
    pub fn database_path(&self) -> Option<&str> {
        if cctv_infra_sqlite::is_in_memory(&self.database.url) {
            return None;
        }
        let path = self.database.url.strip_prefix("sqlite://")?;
        let path = path.split('?').next().unwrap_or(path);
        (!path.is_empty()).then_some(path)
    }
}
