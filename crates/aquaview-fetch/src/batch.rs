// ── Batched GeoJSON fetcher ──
//
// Fetches many data files in waves of bounded concurrency. Each wave
// fully settles before the next is dispatched, so wave order is
// preserved in the merged output. Individual failures are recorded and
// never abort the batch.

use futures_util::future::join_all;
use geojson::{FeatureCollection, GeoJson};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::FetchError;

/// Default number of concurrently in-flight requests per wave.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// One successfully fetched and parsed data file.
#[derive(Debug)]
pub struct FetchedCollection {
    pub url: Url,
    pub collection: FeatureCollection,
}

/// One data file that could not be fetched or parsed.
#[derive(Debug)]
pub struct FetchFailure {
    pub url: Url,
    pub error: FetchError,
}

/// Aggregate classification of a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every requested file succeeded.
    Complete,
    /// Some files failed; the collection is usable but incomplete.
    Partial,
    /// Every requested file failed — the dependent layer cannot be shown.
    AllFailed,
    /// Zero files were requested.
    Empty,
}

/// Result of a batched fetch: successes in request order (wave order
/// preserved, request order within each wave), plus recorded failures.
#[derive(Debug)]
pub struct BatchResult {
    pub collections: Vec<FetchedCollection>,
    pub failures: Vec<FetchFailure>,
}

impl BatchResult {
    pub fn outcome(&self) -> BatchOutcome {
        match (self.collections.is_empty(), self.failures.is_empty()) {
            (true, true) => BatchOutcome::Empty,
            (true, false) => BatchOutcome::AllFailed,
            (false, true) => BatchOutcome::Complete,
            (false, false) => BatchOutcome::Partial,
        }
    }

    /// Total number of features across all fetched collections.
    pub fn feature_count(&self) -> usize {
        self.collections
            .iter()
            .map(|c| c.collection.features.len())
            .sum()
    }
}

/// Fetch `urls` in waves of at most `concurrency` in-flight requests.
///
/// Fail-soft per resource: a network error, non-success status, or
/// GeoJSON parse failure is logged and recorded in `failures`; the rest
/// of the batch proceeds. There is no cancellation — a slow resource
/// stalls only its own wave until the transport timeout expires.
pub async fn fetch_collections(
    client: &reqwest::Client,
    urls: &[Url],
    concurrency: usize,
) -> BatchResult {
    let mut result = BatchResult {
        collections: Vec::with_capacity(urls.len()),
        failures: Vec::new(),
    };

    let limit = concurrency.max(1);
    for (wave, chunk) in urls.chunks(limit).enumerate() {
        debug!(wave, size = chunk.len(), "dispatching fetch wave");

        let settled = join_all(
            chunk
                .iter()
                .map(|url| async move { (url.clone(), fetch_one(client, url).await) }),
        )
        .await;

        for (url, outcome) in settled {
            match outcome {
                Ok(collection) => {
                    debug!(%url, features = collection.features.len(), "fetched collection");
                    result.collections.push(FetchedCollection { url, collection });
                }
                Err(error) => {
                    warn!(%url, %error, "data file failed; continuing without it");
                    result.failures.push(FetchFailure { url, error });
                }
            }
        }
    }

    info!(
        requested = urls.len(),
        fetched = result.collections.len(),
        failed = result.failures.len(),
        "batched fetch finished"
    );
    result
}

/// Fetch a single optional overlay file.
///
/// Overlays are best-effort: any failure is logged and reported as
/// `None`, so a missing boundary file never blocks the main collection.
pub async fn fetch_optional(client: &reqwest::Client, url: &Url) -> Option<FeatureCollection> {
    match fetch_one(client, url).await {
        Ok(collection) => Some(collection),
        Err(error) => {
            warn!(%url, %error, "overlay unavailable");
            None
        }
    }
}

async fn fetch_one(client: &reqwest::Client, url: &Url) -> Result<FeatureCollection, FetchError> {
    debug!("GET {url}");

    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.text().await?;
    let geojson: GeoJson = body.parse().map_err(|e: geojson::Error| FetchError::GeoJson {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    FeatureCollection::try_from(geojson).map_err(|e| FetchError::GeoJson {
        url: url.to_string(),
        message: e.to_string(),
    })
}
