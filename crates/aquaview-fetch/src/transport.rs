// Shared transport configuration for building reqwest::Client instances.
//
// Manifest, data-file, and overlay fetches share timeout and
// identification settings through this module.

use std::time::Duration;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. A resource that never resolves stalls its
    /// own wave until this expires.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::FetchError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("aquaview/0.1.0")
            .build()
            .map_err(crate::error::FetchError::Transport)
    }
}
