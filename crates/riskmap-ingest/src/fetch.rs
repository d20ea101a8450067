//! Feature-collection fetching.
//!
//! [`FeatureSource`] is the port the pipeline depends on;
//! [`HttpFeatureSource`] is the production adapter over reqwest. Tests
//! substitute their own sources.

use async_trait::async_trait;
use geojson::FeatureCollection;
use riskmap_core::error::{Result, RiskmapError};

/// Port for retrieving a raw feature collection.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FeatureCollection>;
}

/// HTTP adapter for [`FeatureSource`].
///
/// No caching and no retries: any transport, parse, or schema failure is
/// terminal for the run that requested it.
#[derive(Debug, Clone, Default)]
pub struct HttpFeatureSource {
    client: reqwest::Client,
}

impl HttpFeatureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies) instead of the default.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeatureSource for HttpFeatureSource {
    async fn fetch(&self, url: &str) -> Result<FeatureCollection> {
        let response = self.client.get(url).send().await.map_err(|e| {
            RiskmapError::Transport { url: url.to_string(), reason: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RiskmapError::Transport {
                url: url.to_string(),
                reason: format!("HTTP status {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| RiskmapError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!(url, bytes = body.len(), "fetched feature collection");

        parse_collection(&body)
    }
}

/// Parse a response body as a GeoJSON feature collection.
///
/// A body that is not JSON, or that is JSON but not a feature collection,
/// is a `Parse` error. A JSON document with no `features` array at all
/// (absent or null) is a `Schema` error even when syntactically valid.
pub fn parse_collection(body: &str) -> Result<FeatureCollection> {
    let document: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RiskmapError::Parse { reason: e.to_string() })?;

    match document.get("features") {
        None | Some(serde_json::Value::Null) => return Err(RiskmapError::Schema),
        Some(_) => {}
    }

    serde_json::from_value(document).map_err(|e| RiskmapError::Parse { reason: e.to_string() })
}
