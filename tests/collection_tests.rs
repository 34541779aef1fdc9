/// Tests for the feature-collection fetcher: NDJSON normalization,
/// validation, status handling, and persistence.
use async_trait::async_trait;
use geoprobe::collection::{fetch_collection, parse_feature_lines, save_collection};
use geoprobe::errors::ProbeError;
use geoprobe::transport::{FetchResponse, HttpFetch};
use serde_json::{json, Value};
use std::sync::Mutex;

/// Canned single-response transport that records requested URLs.
struct CannedFetch {
    status: u16,
    body: String,
    calls: Mutex<Vec<String>>,
}

impl CannedFetch {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpFetch for CannedFetch {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(FetchResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

#[test]
fn test_ndjson_round_trip_with_blank_lines() {
    let body = "\n{\"id\": 1}\n\n   \n{\"id\": 2}\n{\"id\": 3}\n\n";
    let records = parse_feature_lines(body).expect("valid NDJSON should parse");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], 1);
    assert_eq!(records[1]["id"], 2);
    assert_eq!(records[2]["id"], 3);
}

#[test]
fn test_empty_body_yields_no_records() {
    assert_eq!(parse_feature_lines("").unwrap().len(), 0);
    assert_eq!(parse_feature_lines("\n\n  \n").unwrap().len(), 0);
}

#[test]
fn test_malformed_line_fails_whole_fetch() {
    let body = "{\"id\": 1}\nnot json at all\n{\"id\": 2}\n";
    let result = parse_feature_lines(body);

    // One bad line means zero partial output.
    assert!(matches!(result, Err(ProbeError::MalformedRecord(_))));
}

#[test]
fn test_valid_json_non_object_line_is_rejected() {
    let body = "{\"id\": 1}\n42\n";
    let result = parse_feature_lines(body);

    assert!(matches!(result, Err(ProbeError::MalformedRecord(_))));
}

#[tokio::test]
async fn test_fetch_collection_requests_expected_url() {
    let fetch = CannedFetch::new(200, "{\"type\": \"Feature\"}\n");
    let records = fetch_collection(&fetch, "http://target:8080", "topp:states", 25)
        .await
        .expect("fetch should succeed");

    assert_eq!(records.len(), 1);
    let calls = fetch.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("request=GetFeature"));
    assert!(calls[0].contains("typeName=topp:states"));
    assert!(calls[0].contains("maxFeatures=25"));
    assert!(calls[0].contains("outputFormat=application/json"));
}

#[tokio::test]
async fn test_fetch_collection_rejects_empty_type_name() {
    let fetch = CannedFetch::new(200, "");
    let result = fetch_collection(&fetch, "http://target:8080", "", 10).await;

    assert!(matches!(result, Err(ProbeError::InvalidInput(_))));
    assert_eq!(fetch.call_count(), 0);
}

#[tokio::test]
async fn test_fetch_collection_rejects_zero_max_features() {
    let fetch = CannedFetch::new(200, "");
    let result = fetch_collection(&fetch, "http://target:8080", "topp:states", 0).await;

    assert!(matches!(result, Err(ProbeError::InvalidInput(_))));
    assert_eq!(fetch.call_count(), 0);
}

#[tokio::test]
async fn test_fetch_collection_non_success_status_is_fatal() {
    let fetch = CannedFetch::new(404, "{\"id\": 1}\n");
    let result = fetch_collection(&fetch, "http://target:8080", "topp:states", 10).await;

    assert!(matches!(result, Err(ProbeError::UnexpectedStatus(404))));
}

#[test]
fn test_save_collection_writes_indented_json() {
    let records: Vec<Value> = vec![json!({"id": 1, "name": "alpha"}), json!({"id": 2})];
    let output_dir = std::env::temp_dir().join(format!(
        "geoprobe_test_{}_{}",
        std::process::id(),
        "save_collection"
    ));

    let path = save_collection(&output_dir, "target-host", "topp:states", &records)
        .expect("save should succeed");

    assert!(path.ends_with("target-host/topp:states.json"));
    let written = std::fs::read_to_string(&path).expect("file should exist");
    // Human-readable indented JSON
    assert!(written.contains("\n  "));
    let reloaded: Vec<Value> = serde_json::from_str(&written).expect("round trip");
    assert_eq!(reloaded, records);

    std::fs::remove_dir_all(&output_dir).ok();
}
