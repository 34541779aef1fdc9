// Per-feature-type orchestration for geoprobe
// Runs the collection fetch and the injection oracle for one feature type.
// The two are independent side effects of the same iteration: a fetch
// failure never suppresses the oracle, and nothing here propagates far
// enough to abort the remaining feature types.

use crate::collection::{fetch_collection, save_collection};
use crate::oracle::{Extraction, OracleConfig, VersionOracle};
use crate::transport::HttpFetch;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub max_features: usize,
    pub output_dir: PathBuf,
    pub oracle: OracleConfig,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_features: 1000,
            output_dir: PathBuf::from("output/databases"),
            oracle: OracleConfig::default(),
        }
    }
}

/// How one feature type's collection fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Saved { path: PathBuf, records: usize },
    Failed(String),
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchOutcome::Saved { path, records } => {
                write!(f, "{} records saved to {}", records, path.display())
            }
            FetchOutcome::Failed(reason) => write!(f, "fetch failed: {}", reason),
        }
    }
}

/// Result row for one feature type.
#[derive(Debug, Clone)]
pub struct FeatureTypeReport {
    pub type_name: String,
    pub fetch: FetchOutcome,
    pub extraction: Extraction,
}

/// Fetch a sample of one feature type, persist it, then run the injection
/// oracle against the same type. Always returns a report; per-type errors
/// are captured in it, never raised.
pub async fn probe_feature_type(
    fetch: &dyn HttpFetch,
    endpoint: &str,
    host: &str,
    type_name: &str,
    options: &ScanOptions,
) -> FeatureTypeReport {
    let fetch_outcome = match fetch_collection(fetch, endpoint, type_name, options.max_features)
        .await
    {
        Ok(records) => match save_collection(&options.output_dir, host, type_name, &records) {
            Ok(path) => FetchOutcome::Saved {
                path,
                records: records.len(),
            },
            Err(e) => FetchOutcome::Failed(e.to_string()),
        },
        Err(e) => FetchOutcome::Failed(e.to_string()),
    };

    let oracle = VersionOracle::new(options.oracle.clone());
    let extraction = oracle.probe(fetch, endpoint, type_name).await;

    FeatureTypeReport {
        type_name: type_name.to_string(),
        fetch: fetch_outcome,
        extraction,
    }
}
