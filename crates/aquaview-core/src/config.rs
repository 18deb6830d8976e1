// ── Runtime viewer configuration ──
//
// These types describe *what* to load and *how* the viewer behaves.
// They never touch disk — `aquaview-config` assembles a `ViewerConfig`
// from the deployment TOML/environment and hands it in.

use url::Url;

use aquaview_fetch::TransportConfig;
use aquaview_fetch::batch::DEFAULT_CONCURRENCY;

use crate::error::ViewerError;
use crate::state::DEFAULT_OPACITY;

/// One optional auxiliary overlay (e.g. a boundary layer).
#[derive(Debug, Clone)]
pub struct OverlaySpec {
    /// Logical layer name, also the visibility-flag key in view state.
    pub name: String,
    pub url: Url,
    /// Whether the overlay starts visible.
    pub visible: bool,
}

/// Everything the viewer needs to load and run one dataset.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// URL of the dataset manifest.
    pub manifest_url: Url,

    /// Concurrent in-flight requests per fetch wave.
    pub concurrency: usize,

    /// Initial global fill opacity.
    pub default_opacity: f64,

    /// Padding factor for fit-to-bounds camera moves, as a fraction of
    /// the bounds size.
    pub fit_padding: f64,

    /// Whether explicitly deselecting a group recenters the camera on
    /// the full collection. Source deployments disagree on this, so it
    /// is a knob rather than a contract.
    pub recenter_on_deselect: bool,

    /// Optional auxiliary overlays.
    pub overlays: Vec<OverlaySpec>,

    pub transport: TransportConfig,
}

impl ViewerConfig {
    pub fn new(manifest_url: Url) -> Self {
        Self {
            manifest_url,
            concurrency: DEFAULT_CONCURRENCY,
            default_opacity: DEFAULT_OPACITY,
            fit_padding: 0.1,
            recenter_on_deselect: true,
            overlays: Vec::new(),
            transport: TransportConfig::default(),
        }
    }

    /// Reject configurations the viewer cannot meaningfully run with.
    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.concurrency == 0 {
            return Err(ViewerError::Config {
                message: "concurrency must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.default_opacity) {
            return Err(ViewerError::Config {
                message: format!(
                    "default_opacity must be within [0, 1], got {}",
                    self.default_opacity
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.fit_padding) {
            return Err(ViewerError::Config {
                message: format!("fit_padding must be within [0, 1], got {}", self.fit_padding),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ViewerConfig {
        ViewerConfig::new(Url::parse("https://example.test/manifest.json").unwrap())
    }

    #[test]
    fn defaults_are_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut cfg = config();
        cfg.concurrency = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_opacity_rejected() {
        let mut cfg = config();
        cfg.default_opacity = 1.5;
        assert!(cfg.validate().is_err());
    }
}
