// Dataset manifest: the single JSON file listing every data file of the
// main collection.
//
// Shape: `{ "basePath": "tiles/", "files": ["a.geojson", ...] }`.
// Any defect here — unreachable, unparseable, missing fields, zero
// files — is fatal for the dependent layer and is surfaced before any
// data-file fetch is attempted.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Parsed dataset manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Path prefix for data files, resolved against the manifest URL.
    pub base_path: String,

    /// Data file names, fetched as `basePath + files[i]`.
    pub files: Vec<String>,
}

impl Manifest {
    /// Parse and validate a manifest body.
    ///
    /// A manifest that deserializes but lists zero files is rejected
    /// here too — the main collection cannot be shown without data.
    pub fn parse(url: &Url, body: &str) -> Result<Self, FetchError> {
        let manifest: Self = serde_json::from_str(body).map_err(|e| FetchError::Manifest {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if manifest.files.is_empty() {
            return Err(FetchError::Manifest {
                url: url.to_string(),
                reason: "files array is empty".into(),
            });
        }

        Ok(manifest)
    }

    /// Resolve every data file to an absolute URL.
    ///
    /// `basePath` is joined against the manifest's own URL, so it may be
    /// relative (`"tiles/"`), root-relative (`"/data/"`), or absolute.
    pub fn resolve_urls(&self, manifest_url: &Url) -> Result<Vec<Url>, FetchError> {
        // Url::join drops the last path segment unless the base ends
        // with '/', which would silently misresolve every file.
        let mut base_path = self.base_path.clone();
        if !base_path.is_empty() && !base_path.ends_with('/') {
            base_path.push('/');
        }

        let base = manifest_url.join(&base_path)?;
        self.files.iter().map(|f| Ok(base.join(f)?)).collect()
    }
}

/// Fetch and parse the manifest from `url`.
///
/// Every failure mode at this stage — transport error, non-success
/// status, invalid JSON, empty file list — maps to
/// [`FetchError::Manifest`], keeping it distinguishable from per-file
/// data failures.
pub async fn fetch_manifest(client: &reqwest::Client, url: &Url) -> Result<Manifest, FetchError> {
    debug!("GET {url} (manifest)");

    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::Manifest {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(FetchError::Manifest {
            url: url.to_string(),
            reason: format!("HTTP {}", resp.status().as_u16()),
        });
    }

    let body = resp.text().await.map_err(|e| FetchError::Manifest {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Manifest::parse(url, &body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn manifest_url() -> Url {
        Url::parse("https://example.test/data/manifest.json").unwrap()
    }

    #[test]
    fn parses_valid_manifest() {
        let m = Manifest::parse(
            &manifest_url(),
            r#"{"basePath": "tiles/", "files": ["a.geojson", "b.geojson"]}"#,
        )
        .unwrap();
        assert_eq!(m.base_path, "tiles/");
        assert_eq!(m.files.len(), 2);
    }

    #[test]
    fn missing_base_path_is_fatal() {
        let err = Manifest::parse(&manifest_url(), r#"{"files": []}"#).unwrap_err();
        assert!(err.is_manifest(), "expected manifest error, got {err}");
    }

    #[test]
    fn non_array_files_is_fatal() {
        let err =
            Manifest::parse(&manifest_url(), r#"{"basePath": "x/", "files": "a.geojson"}"#)
                .unwrap_err();
        assert!(err.is_manifest());
    }

    #[test]
    fn empty_files_is_fatal() {
        let err =
            Manifest::parse(&manifest_url(), r#"{"basePath": "x/", "files": []}"#).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Manifest { ref reason, .. } if reason.contains("empty")
        ));
    }

    #[test]
    fn resolves_relative_base_path() {
        let m = Manifest::parse(
            &manifest_url(),
            r#"{"basePath": "tiles", "files": ["a.geojson"]}"#,
        )
        .unwrap();
        let urls = m.resolve_urls(&manifest_url()).unwrap();
        assert_eq!(urls[0].as_str(), "https://example.test/data/tiles/a.geojson");
    }

    #[test]
    fn resolves_root_relative_base_path() {
        let m = Manifest::parse(
            &manifest_url(),
            r#"{"basePath": "/static/", "files": ["a.geojson"]}"#,
        )
        .unwrap();
        let urls = m.resolve_urls(&manifest_url()).unwrap();
        assert_eq!(urls[0].as_str(), "https://example.test/static/a.geojson");
    }
}
