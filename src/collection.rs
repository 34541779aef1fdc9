// Feature-collection fetcher for geoprobe
// GeoServer streams GetFeature JSON output as one object per line; this
// module normalizes that into a single array and persists it per layer.

use crate::errors::ProbeError;
use crate::transport::{feature_collection_url, HttpFetch};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Normalize a newline-delimited JSON body into its records.
///
/// Blank lines are skipped. Every non-blank line must decode as a JSON
/// object; one bad line fails the whole body with `MalformedRecord` and no
/// partial output. Record order follows line order.
pub fn parse_feature_lines(body: &str) -> Result<Vec<Value>, ProbeError> {
    let mut records = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Value = serde_json::from_str(line)
            .map_err(|e| ProbeError::MalformedRecord(format!("{}: {}", e, line)))?;
        if !record.is_object() {
            return Err(ProbeError::MalformedRecord(format!(
                "line is valid JSON but not an object: {}",
                line
            )));
        }
        records.push(record);
    }
    Ok(records)
}

/// Fetch up to `max_features` records of one feature type.
///
/// Non-2xx status and transport failures are hard failures for this fetch;
/// the caller decides whether to keep going with other feature types.
pub async fn fetch_collection(
    fetch: &dyn HttpFetch,
    endpoint: &str,
    type_name: &str,
    max_features: usize,
) -> Result<Vec<Value>, ProbeError> {
    if type_name.is_empty() {
        return Err(ProbeError::InvalidInput(
            "feature type name must not be empty".to_string(),
        ));
    }
    if max_features == 0 {
        return Err(ProbeError::InvalidInput(
            "maxFeatures must be a positive integer".to_string(),
        ));
    }

    let url = feature_collection_url(endpoint, type_name, max_features);
    let response = fetch.fetch(&url).await?;
    if !response.is_success() {
        return Err(ProbeError::UnexpectedStatus(response.status));
    }
    parse_feature_lines(&response.body)
}

/// Persist a normalized collection as indented JSON under
/// `{output_dir}/{host}/{type_name}.json`. Returns the written path.
pub fn save_collection(
    output_dir: &Path,
    host: &str,
    type_name: &str,
    records: &[Value],
) -> Result<PathBuf, ProbeError> {
    let folder = output_dir.join(host);
    fs::create_dir_all(&folder)?;
    let path = folder.join(format!("{}.json", type_name));
    let pretty = serde_json::to_string_pretty(records)?;
    fs::write(&path, pretty)?;
    Ok(path)
}
