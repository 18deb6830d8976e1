// ── Core error types ──
//
// Failures that escape the viewer's graceful-degradation paths. Most
// fetch problems become user-facing notices instead; only setup-level
// defects (bad configuration, unusable HTTP client) surface here.

use thiserror::Error;

use aquaview_fetch::FetchError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
