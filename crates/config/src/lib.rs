//! Layered configuration for folio.
//!
//! Values are resolved, later layers winning, from:
//!
//! 1. built-in defaults,
//! 2. a config file (`folio.toml`, `folio.yaml` or `folio.json` in the
//!    platform config directory, or one explicit path),
//! 3. `FOLIO_`-prefixed environment variables, with `__` between nested keys
//!    (`FOLIO_SERVICE__BASE_URL`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use folio_transport::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "FOLIO_";
const FILE_STEM: &str = "folio";
const FILE_EXTENSIONS: [&str; 3] = ["toml", "yaml", "json"];
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub preview: PreviewConfig,
}

/// Where the document service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Upper bound on one whole request, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServiceConfig {
    /// The base URL, parsed. Only `http` and `https` are accepted.
    pub fn url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).or_raise(|| ErrorKind::InvalidUrl(self.base_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            exn::bail!(ErrorKind::InvalidUrl(self.base_url.clone()));
        }
        Ok(url)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Where image previews are written. Defaults to the system temp directory.
    pub scratch_dir: Option<PathBuf>,
    /// Largest preview body accepted, in bytes. Unlimited if unset.
    pub max_bytes: Option<u64>,
}

impl Config {
    /// Resolve and validate the configuration.
    ///
    /// With `explicit`, only that file is read and it must exist. Otherwise
    /// every `folio.*` file found in the platform config directory is merged.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(explicit)?.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        tracing::debug!(base_url = %config.service.base_url, "Loaded configuration");
        Ok(config)
    }

    /// The layered sources, unextracted.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match explicit {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::Missing(path.to_path_buf())),
            Some(path) => merge_file(figment, path),
            None => default_files().into_iter().fold(figment, |figment, path| merge_file(figment, &path)),
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        self.service.url()?;
        if self.service.timeout_secs == 0 {
            exn::bail!(ErrorKind::OutOfRange("service.timeout_secs"));
        }
        if self.preview.max_bytes == Some(0) {
            exn::bail!(ErrorKind::OutOfRange("preview.max_bytes"));
        }
        Ok(())
    }
}

/// Platform config directory for folio, if one can be determined.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", FILE_STEM).map(|dirs| dirs.config_dir().to_path_buf())
}

fn default_files() -> Vec<PathBuf> {
    let Some(dir) = config_dir() else {
        tracing::warn!("Could not determine config directory, skipping config files");
        return Vec::new();
    };
    FILE_EXTENSIONS
        .iter()
        .map(|extension| dir.join(FILE_STEM).with_extension(extension))
        .filter(|path| path.is_file())
        .collect()
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    tracing::trace!(path = %path.display(), "Merging config file");
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => figment.merge(Toml::file_exact(path)),
    }
}
