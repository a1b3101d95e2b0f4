//! Configuration for crosscloud.
//!
//! Values are layered with `figment`, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. a TOML, YAML or JSON file (chosen by extension), either given
//!    explicitly or found at the platform config directory
//!    (`~/.config/crosscloud/config.toml` on Linux),
//! 3. `CROSSCLOUD_` environment variables, with `__` separating nested keys
//!    (`CROSSCLOUD_SALESFORCE__CONSUMER_KEY`).
//!
//! [`Config::load`] validates the merged result before returning it.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "CROSSCLOUD_";
const DEFAULT_API_VERSION: &str = "58.0";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub salesforce: SalesforceConfig,
    pub drive: DriveConfig,
    pub migration: MigrationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesforceConfig {
    /// Login domain, e.g. `https://example.my.salesforce.com`.
    pub domain: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub api_version: String,
}

impl Default for SalesforceConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

// Keep the secret out of logs.
impl fmt::Debug for SalesforceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SalesforceConfig")
            .field("domain", &self.domain)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Service-account credentials for Google Drive; set exactly one field.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub credentials_file: Option<PathBuf>,
    pub credentials_json: Option<String>,
}

impl fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveConfig")
            .field("credentials_file", &self.credentials_file)
            .field("credentials_json", &self.credentials_json.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where the Drive service-account key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCredentials<'a> {
    File(&'a Path),
    Json(&'a str),
}

impl DriveConfig {
    /// The configured credential source, or `None` unless exactly one is set.
    pub fn credentials(&self) -> Option<DriveCredentials<'_>> {
        match (&self.credentials_file, &self.credentials_json) {
            (Some(path), None) => Some(DriveCredentials::File(path)),
            (None, Some(json)) => Some(DriveCredentials::Json(json)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Folder that receives every file when no entity type is given.
    pub root_folder: String,
    /// Timeout applied to each outgoing HTTP request.
    pub request_timeout_secs: u64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            root_folder: "root".to_string(),
            request_timeout_secs: 300,
        }
    }
}

impl MigrationConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Default location of the configuration file, if the platform has one.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "crosscloud").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn file_layer(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    Ok(match extension.to_ascii_lowercase().as_str() {
        "toml" => figment.merge(Toml::file_exact(path)),
        "yaml" | "yml" => figment.merge(Yaml::file_exact(path)),
        "json" => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.display().to_string())),
    })
}

impl Config {
    /// Build the layered provider stack without extracting it.
    ///
    /// An explicit `path` must exist; the default path is used only when it
    /// does.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.display().to_string()));
                }
                figment = file_layer(figment, path)?;
            },
            None => {
                if let Some(path) = default_path().filter(|path| path.is_file()) {
                    tracing::debug!(path = %path.display(), "Using default configuration file");
                    figment = file_layer(figment, &path)?;
                }
            },
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate configuration from `figment`.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// Load, merge and validate configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_figment(&Self::figment(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| exn::Exn::from(ErrorKind::Invalid(reason.to_string()));
        let salesforce = &self.salesforce;
        if salesforce.domain.trim().is_empty() {
            return Err(invalid("salesforce.domain is required"));
        }
        match url::Url::parse(&salesforce.domain) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {},
            _ => return Err(invalid("salesforce.domain must be an http(s) URL")),
        }
        if salesforce.consumer_key.is_empty() {
            return Err(invalid("salesforce.consumer_key is required"));
        }
        if salesforce.consumer_secret.is_empty() {
            return Err(invalid("salesforce.consumer_secret is required"));
        }
        if self.drive.credentials().is_none() {
            return Err(invalid("set exactly one of drive.credentials_file or drive.credentials_json"));
        }
        if self.migration.root_folder.is_empty() {
            return Err(invalid("migration.root_folder must not be empty"));
        }
        if self.migration.request_timeout_secs == 0 {
            return Err(invalid("migration.request_timeout_secs must be positive"));
        }
        Ok(())
    }
}
