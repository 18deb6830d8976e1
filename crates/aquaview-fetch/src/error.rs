use thiserror::Error;

/// Top-level error type for the `aquaview-fetch` crate.
///
/// Distinguishes manifest-level failures (fatal for the dependent layer)
/// from per-resource failures (recorded and recovered by the batch
/// fetcher). `aquaview-core` maps these into user-facing notices.
#[derive(Debug, Error)]
pub enum FetchError {
    // ── Manifest ────────────────────────────────────────────────────
    /// Manifest missing, unreadable, or structurally invalid.
    ///
    /// Raised before any data-file fetch is attempted, so callers can
    /// tell "no manifest" apart from "manifest present but files failed".
    #[error("Invalid manifest at {url}: {reason}")]
    Manifest { url: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or resolution error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success response status for a data file.
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// Response body was not a parseable GeoJSON FeatureCollection.
    #[error("Invalid GeoJSON at {url}: {message}")]
    GeoJson { url: String, message: String },
}

impl FetchError {
    /// Returns `true` if this error came from the manifest stage rather
    /// than an individual data file.
    pub fn is_manifest(&self) -> bool {
        matches!(self, Self::Manifest { .. })
    }
}
