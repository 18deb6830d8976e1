//! Deployment configuration for aquaview.
//!
//! TOML file + `AQUAVIEW_`-prefixed environment overrides, merged via
//! figment and translated into `aquaview_core::ViewerConfig`. The
//! embedding shell decides where the file lives (this is a statically
//! deployed viewer, so there is no per-user config directory).

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use aquaview_core::{OverlaySpec, ViewerConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level deployment configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// URL of the dataset manifest. The only required setting.
    pub manifest_url: Option<String>,

    /// Viewer behavior knobs.
    #[serde(default)]
    pub viewer: ViewerSettings,

    /// Optional auxiliary overlays.
    #[serde(default)]
    pub overlays: Vec<OverlayEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ViewerSettings {
    /// Concurrent in-flight requests per fetch wave.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Initial global fill opacity.
    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Padding factor for fit-to-bounds camera moves.
    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,

    /// Whether explicit deselection recenters on the full collection.
    #[serde(default = "default_recenter")]
    pub recenter_on_deselect: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            opacity: default_opacity(),
            fit_padding: default_fit_padding(),
            recenter_on_deselect: default_recenter(),
            timeout: default_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    aquaview_fetch::batch::DEFAULT_CONCURRENCY
}
fn default_opacity() -> f64 {
    0.8
}
fn default_fit_padding() -> f64 {
    0.1
}
fn default_recenter() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}

/// One overlay entry in the deployment config.
#[derive(Debug, Deserialize, Serialize)]
pub struct OverlayEntry {
    pub name: String,
    pub url: String,

    /// Whether the overlay starts visible.
    #[serde(default)]
    pub visible: bool,
}

// ── Config loading ──────────────────────────────────────────────────

/// Load configuration from an optional TOML file plus `AQUAVIEW_`
/// environment variables (nested keys split on `__`, e.g.
/// `AQUAVIEW_VIEWER__OPACITY`).
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("AQUAVIEW_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Translation to the core config ──────────────────────────────────

/// Build a validated [`ViewerConfig`] from the deployment config.
pub fn to_viewer_config(config: &Config) -> Result<ViewerConfig, ConfigError> {
    let raw_url = config
        .manifest_url
        .as_deref()
        .ok_or_else(|| ConfigError::Validation {
            field: "manifest_url".into(),
            reason: "missing".into(),
        })?;
    let manifest_url: Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "manifest_url".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let overlays = config
        .overlays
        .iter()
        .map(|entry| {
            let url: Url = entry.url.parse().map_err(|_| ConfigError::Validation {
                field: format!("overlays.{}.url", entry.name),
                reason: format!("invalid URL: {}", entry.url),
            })?;
            Ok(OverlaySpec {
                name: entry.name.clone(),
                url,
                visible: entry.visible,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let mut viewer = ViewerConfig::new(manifest_url);
    viewer.concurrency = config.viewer.concurrency;
    viewer.default_opacity = config.viewer.opacity;
    viewer.fit_padding = config.viewer.fit_padding;
    viewer.recenter_on_deselect = config.viewer.recenter_on_deselect;
    viewer.overlays = overlays;
    viewer.transport.timeout = Duration::from_secs(config.viewer.timeout);

    viewer.validate().map_err(|e| ConfigError::Validation {
        field: "viewer".into(),
        reason: e.to_string(),
    })?;
    Ok(viewer)
}
