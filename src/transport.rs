// HTTP transport for geoprobe
// One reqwest client built up-front from explicit configuration; the rest of
// the crate talks to it through the HttpFetch trait so probes are mockable.

use crate::errors::ProbeError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Explicit transport configuration. Nothing here is ambient or mutated
/// after the client is built.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Skip TLS certificate verification. Useful against self-signed test
    /// targets; opt-in only.
    pub insecure: bool,
    /// Optional HTTP(S) proxy URL.
    pub proxy: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            insecure: false,
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Status and body of one GET exchange.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal GET seam the fetcher and the oracle are written against.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ProbeError>;
}

pub struct ProbeClient {
    client: Client,
}

impl ProbeClient {
    pub fn new(config: &TransportConfig) -> Result<Self, ProbeError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure);
        if let Some(proxy_url) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl HttpFetch for ProbeClient {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, ProbeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchResponse { status, body })
    }
}

/// `GetCapabilities` request URL for a service endpoint base.
pub fn capabilities_url(endpoint: &str) -> String {
    format!(
        "{}/geoserver/ows?service=WFS&version=1.0.0&request=GetCapabilities",
        endpoint.trim_end_matches('/')
    )
}

/// `GetFeature` request URL for a bounded JSON sample of one feature type.
pub fn feature_collection_url(endpoint: &str, type_name: &str, max_features: usize) -> String {
    format!(
        "{}/geoserver/ows?service=WFS&version=1.0.0&request=GetFeature&typeName={}&sortOrder=ASC&outputFormat=application/json&maxFeatures={}",
        endpoint.trim_end_matches('/'),
        type_name,
        max_features
    )
}

/// `GetFeature` request URL carrying an already-encoded CQL_FILTER value.
pub fn injection_url(endpoint: &str, type_name: &str, encoded_filter: &str) -> String {
    format!(
        "{}/geoserver/ows?service=wfs&version=1.0.0&request=GetFeature&typeName={}&CQL_FILTER={}",
        endpoint.trim_end_matches('/'),
        type_name,
        encoded_filter
    )
}
