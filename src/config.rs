//! Configuration types for media-relay
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. Sections mirror the collaborating services:
//! `[server]`, `[fetcher]`, `[storage]`, `[cors]` and `[janitor]`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};
use utoipa::ToSchema;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "MEDIA_RELAY_";

/// Main configuration for MediaRelay
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Media-fetch service and local download directory
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Storage backend the resources are relayed to
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cross-origin policy for browser clients
    #[serde(default)]
    pub cors: CorsConfig,

    /// Daily registry reset
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Periodic usage log
    #[serde(default)]
    pub stats: StatsConfig,
}

/// HTTP listener configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0)
    #[serde(default = "default_host")]
    #[schema(value_type = String)]
    pub host: IpAddr,

    /// Port to listen on (default: 9092)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// How long shutdown waits for in-flight jobs (default: 30 seconds)
    #[serde(default = "default_shutdown_grace", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            swagger_ui: true,
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

impl ServerConfig {
    /// Socket address the API server binds to
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Media-fetch service configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FetcherConfig {
    /// Endpoint the fetch request is POSTed to
    #[serde(default = "default_fetcher_url")]
    pub url: String,

    /// Directory the fetch service writes media into
    #[serde(default = "default_download_dir")]
    #[schema(value_type = String)]
    pub download_dir: PathBuf,

    /// Ask the service to skip posts it has already downloaded (default: true)
    #[serde(default = "default_true")]
    pub skip: bool,

    /// Timeout for one fetch call (default: 600 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,

    /// Extension of image-set files, without the dot (default: "jpeg")
    #[serde(default = "default_image_extension")]
    pub image_extension: String,

    /// Fixed extension of video files; unset means discover it on disk
    #[serde(default)]
    pub video_extension: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            url: default_fetcher_url(),
            download_dir: default_download_dir(),
            skip: true,
            timeout: default_fetch_timeout(),
            image_extension: default_image_extension(),
            video_extension: None,
        }
    }
}

/// Storage backend configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Endpoint files are PUT to
    #[serde(default = "default_storage_url")]
    pub url: String,

    /// Value of the Authorization header
    #[serde(default)]
    pub token: String,

    /// Destination directory on the backend (default: "/")
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Ask the backend to store the file as a background task (default: true)
    #[serde(default = "default_true")]
    pub as_task: bool,

    /// Timeout for one upload call (default: 300 seconds)
    #[serde(default = "default_upload_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: default_storage_url(),
            token: String::new(),
            upload_path: default_upload_path(),
            as_task: true,
            timeout: default_upload_timeout(),
        }
    }
}

/// Cross-origin policy, as comma-separated header values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CorsConfig {
    /// Allowed origins ("*" for any)
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,

    /// Allowed methods
    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,

    /// Allowed request headers
    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
        }
    }
}

/// Janitor configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JanitorConfig {
    /// Clear the job registry at every local midnight (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Periodic log of registry size and in-flight jobs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatsConfig {
    /// Log usage on a fixed interval (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds between reports (default: 3600)
    #[serde(default = "default_stats_interval", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub interval: Duration,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_stats_interval(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            message: e.to_string(),
            key: None,
        })
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load a TOML config file, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply `MEDIA_RELAY_*` environment variables on top of the loaded values
    ///
    /// Recognized: `PORT`, `FETCHER_URL`, `DOWNLOAD_DIR`, `STORAGE_URL`,
    /// `STORAGE_TOKEN`, `UPLOAD_PATH`, `AS_TASK`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(port) = env_var("PORT") {
            self.server.port = port.parse().map_err(|_| Error::Config {
                message: format!("invalid port: {port}"),
                key: Some("server.port".into()),
            })?;
        }
        if let Some(url) = env_var("FETCHER_URL") {
            self.fetcher.url = url;
        }
        if let Some(dir) = env_var("DOWNLOAD_DIR") {
            self.fetcher.download_dir = PathBuf::from(dir);
        }
        if let Some(url) = env_var("STORAGE_URL") {
            self.storage.url = url;
        }
        if let Some(token) = env_var("STORAGE_TOKEN") {
            self.storage.token = token;
        }
        if let Some(path) = env_var("UPLOAD_PATH") {
            self.storage.upload_path = path;
        }
        if let Some(as_task) = env_var("AS_TASK") {
            self.storage.as_task = as_task.parse().map_err(|_| Error::Config {
                message: format!("invalid boolean: {as_task}"),
                key: Some("storage.as_task".into()),
            })?;
        }
        Ok(())
    }

    /// Check the values that would only fail later, at job time
    pub fn validate(&self) -> Result<()> {
        validate_http_url(&self.fetcher.url, "fetcher.url")?;
        validate_http_url(&self.storage.url, "storage.url")?;

        if self.fetcher.image_extension.trim_start_matches('.').is_empty() {
            return Err(Error::Config {
                message: "image extension must not be empty".into(),
                key: Some("fetcher.image_extension".into()),
            });
        }
        if self.stats.enabled && self.stats.interval.is_zero() {
            return Err(Error::Config {
                message: "stats interval must be at least one second".into(),
                key: Some("stats.interval".into()),
            });
        }
        Ok(())
    }

    /// Anchor a relative download directory at the current working directory
    pub fn resolve_download_dir(&mut self) -> Result<()> {
        if self.fetcher.download_dir.is_relative() {
            self.fetcher.download_dir = std::env::current_dir()?.join(&self.fetcher.download_dir);
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}

fn validate_http_url(value: &str, key: &str) -> Result<()> {
    let parsed = url::Url::parse(value).map_err(|e| Error::Config {
        message: format!("invalid URL {value:?}: {e}"),
        key: Some(key.into()),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::Config {
            message: format!("unsupported URL scheme {scheme:?}"),
            key: Some(key.into()),
        }),
    }
}

// Default value functions
fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    9092
}

fn default_true() -> bool {
    true
}

fn default_shutdown_grace() -> Duration {
    Duration::from_secs(30)
}

fn default_stats_interval() -> Duration {
    Duration::from_secs(3600)
}

fn default_fetcher_url() -> String {
    "http://127.0.0.1:5556/xhs/detail".into()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("Download")
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_image_extension() -> String {
    "jpeg".into()
}

fn default_storage_url() -> String {
    "http://127.0.0.1:5244/api/fs/put".into()
}

fn default_upload_path() -> String {
    "/".into()
}

fn default_upload_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_allow_origin() -> String {
    "*".into()
}

fn default_allow_methods() -> String {
    "POST, OPTIONS".into()
}

fn default_allow_headers() -> String {
    "Origin, Content-Type, Accept".into()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
