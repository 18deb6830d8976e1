// Integration tests for the batched fetcher and manifest loader, using
// wiremock as the static file server.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aquaview_fetch::batch::{fetch_collections, fetch_optional};
use aquaview_fetch::manifest::fetch_manifest;
use aquaview_fetch::{BatchOutcome, FetchError};

// ── Helpers ─────────────────────────────────────────────────────────

fn feature_collection(names: &[&str]) -> serde_json::Value {
    let features: Vec<_> = names
        .iter()
        .map(|name| {
            json!({
                "type": "Feature",
                "properties": { "name": name },
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}

async fn mount_file(server: &MockServer, file: &str, body: &serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/data/{file}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn file_urls(server: &MockServer, count: usize) -> Vec<Url> {
    (0..count)
        .map(|i| Url::parse(&format!("{}/data/f{i}.geojson", server.uri())).expect("file url"))
        .collect()
}

// ── Batch fetch ─────────────────────────────────────────────────────

#[tokio::test]
async fn partial_batch_records_failures_and_keeps_successes() {
    let server = MockServer::start().await;

    // 12 resources, concurrency 5; resources 3, 7, 11 (1-based) fail.
    for i in 0..12usize {
        if matches!(i + 1, 3 | 7 | 11) {
            Mock::given(method("GET"))
                .and(path(format!("/data/f{i}.geojson")))
                .respond_with(ResponseTemplate::new(500))
                .mount(&server)
                .await;
        } else {
            mount_file(&server, &format!("f{i}.geojson"), &feature_collection(&["a"])).await;
        }
    }

    let client = reqwest::Client::new();
    let urls = file_urls(&server, 12);
    let result = fetch_collections(&client, &urls, 5).await;

    assert_eq!(result.collections.len(), 9);
    assert_eq!(result.failures.len(), 3);
    assert_eq!(result.outcome(), BatchOutcome::Partial);
    assert_eq!(result.feature_count(), 9);
}

#[tokio::test]
async fn all_failures_distinguishable_from_partial() {
    let server = MockServer::start().await;
    for i in 0..3usize {
        Mock::given(method("GET"))
            .and(path(format!("/data/f{i}.geojson")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
    }

    let client = reqwest::Client::new();
    let result = fetch_collections(&client, &file_urls(&server, 3), 5).await;

    assert!(result.collections.is_empty());
    assert_eq!(result.failures.len(), 3);
    assert_eq!(result.outcome(), BatchOutcome::AllFailed);
}

#[tokio::test]
async fn empty_request_list_is_not_an_error() {
    let client = reqwest::Client::new();
    let result = fetch_collections(&client, &[], 5).await;
    assert_eq!(result.outcome(), BatchOutcome::Empty);
}

#[tokio::test]
async fn successful_results_preserve_request_order() {
    let server = MockServer::start().await;
    for i in 0..7usize {
        mount_file(
            &server,
            &format!("f{i}.geojson"),
            &feature_collection(&[&format!("feature-{i}")]),
        )
        .await;
    }

    let client = reqwest::Client::new();
    let urls = file_urls(&server, 7);
    // Concurrency 3 forces three waves: [0,1,2], [3,4,5], [6].
    let result = fetch_collections(&client, &urls, 3).await;

    assert_eq!(result.outcome(), BatchOutcome::Complete);
    let fetched: Vec<_> = result.collections.iter().map(|c| c.url.clone()).collect();
    assert_eq!(fetched, urls);
}

#[tokio::test]
async fn unparseable_body_is_a_recorded_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/f0.geojson"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let result = fetch_collections(&client, &file_urls(&server, 1), 5).await;

    assert_eq!(result.outcome(), BatchOutcome::AllFailed);
    assert!(matches!(
        result.failures[0].error,
        FetchError::GeoJson { .. }
    ));
}

// ── Manifest ────────────────────────────────────────────────────────

#[tokio::test]
async fn manifest_missing_base_path_is_fatal_before_any_data_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "files": [] })))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let url = Url::parse(&format!("{}/data/manifest.json", server.uri())).expect("url");
    let err = fetch_manifest(&client, &url).await.unwrap_err();

    assert!(err.is_manifest());
    // Only the manifest itself was requested.
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn missing_manifest_is_fatal() {
    let server = MockServer::start().await;

    let client = reqwest::Client::new();
    let url = Url::parse(&format!("{}/data/manifest.json", server.uri())).expect("url");
    let err = fetch_manifest(&client, &url).await.unwrap_err();

    assert!(err.is_manifest());
}

#[tokio::test]
async fn manifest_drives_data_fetch_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "basePath": "tiles/",
            "files": ["a.geojson", "b.geojson"]
        })))
        .mount(&server)
        .await;
    mount_file(&server, "tiles/a.geojson", &feature_collection(&["a1", "a2"])).await;
    mount_file(&server, "tiles/b.geojson", &feature_collection(&["b1"])).await;

    let client = reqwest::Client::new();
    let url = Url::parse(&format!("{}/data/manifest.json", server.uri())).expect("url");
    let manifest = fetch_manifest(&client, &url).await.expect("manifest");
    let urls = manifest.resolve_urls(&url).expect("urls");
    let result = fetch_collections(&client, &urls, 5).await;

    assert_eq!(result.outcome(), BatchOutcome::Complete);
    assert_eq!(result.feature_count(), 3);
}

// ── Overlays ────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_overlay_is_none_not_error() {
    let server = MockServer::start().await;

    let client = reqwest::Client::new();
    let url = Url::parse(&format!("{}/data/rivers.geojson", server.uri())).expect("url");
    assert!(fetch_optional(&client, &url).await.is_none());
}

#[tokio::test]
async fn present_overlay_is_fetched() {
    let server = MockServer::start().await;
    mount_file(&server, "rivers.geojson", &feature_collection(&["r1"])).await;

    let client = reqwest::Client::new();
    let url = Url::parse(&format!("{}/data/rivers.geojson", server.uri())).expect("url");
    let overlay = fetch_optional(&client, &url).await.expect("overlay");
    assert_eq!(overlay.features.len(), 1);
}
