//! Static map images for board payloads.
//!
//! DESIGN
//! ======
//! Boards hand a list of markers to a [`MapRenderer`] and get back an image
//! URL (or nothing). `TileserverMaps` talks to a tileserver-cache instance:
//! it pregenerates the image via `POST /staticmap/{template}?pregenerate=true`
//! and links `/staticmap/pregenerated/{id}`. Body construction is a pure
//! function for testability.

use std::time::Duration;

use serde::Serialize;

const REQUEST_TIMEOUT_SECS: u64 = 20;
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("map request failed: {0}")]
    Request(String),
    #[error("map response error: status {status}: {body}")]
    Response { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub url: String,
}

/// Produces a map image for a board's markers. Enables mocking in tests.
#[async_trait::async_trait]
pub trait MapRenderer: Send + Sync {
    /// Render `markers` with the named template. `Ok(None)` means no image.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] if the backend request fails.
    async fn render(&self, template: &str, markers: &[MapMarker]) -> Result<Option<String>, MapError>;
}

/// Used when no tileserver is configured.
pub struct NoMaps;

#[async_trait::async_trait]
impl MapRenderer for NoMaps {
    async fn render(&self, _template: &str, _markers: &[MapMarker]) -> Result<Option<String>, MapError> {
        Ok(None)
    }
}

// =============================================================================
// TILESERVER
// =============================================================================

pub struct TileserverMaps {
    http: reqwest::Client,
    base_url: String,
}

impl TileserverMaps {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: String) -> Result<Self, MapError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MapError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }
}

#[async_trait::async_trait]
impl MapRenderer for TileserverMaps {
    async fn render(&self, template: &str, markers: &[MapMarker]) -> Result<Option<String>, MapError> {
        let Some(body) = build_request_body(markers) else {
            return Ok(None);
        };

        let response = self
            .http
            .post(format!("{}/staticmap/{template}", self.base_url))
            .query(&[("pregenerate", "true")])
            .json(&body)
            .send()
            .await
            .map_err(|e| MapError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| MapError::Request(e.to_string()))?;
        if status != 200 {
            return Err(MapError::Response { status, body: text });
        }

        Ok(Some(pregenerated_url(&self.base_url, &text)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StaticMapBody<'a> {
    pub(crate) markers: &'a [MapMarker],
    pub(crate) min_lat: f64,
    pub(crate) max_lat: f64,
    pub(crate) min_lon: f64,
    pub(crate) max_lon: f64,
}

/// Marker list plus bounding box for the template. `None` without markers.
pub(crate) fn build_request_body(markers: &[MapMarker]) -> Option<StaticMapBody<'_>> {
    let first = markers.first()?;
    let mut body = StaticMapBody {
        markers,
        min_lat: first.lat,
        max_lat: first.lat,
        min_lon: first.lon,
        max_lon: first.lon,
    };
    for marker in &markers[1..] {
        body.min_lat = body.min_lat.min(marker.lat);
        body.max_lat = body.max_lat.max(marker.lat);
        body.min_lon = body.min_lon.min(marker.lon);
        body.max_lon = body.max_lon.max(marker.lon);
    }
    Some(body)
}

pub(crate) fn pregenerated_url(base_url: &str, id: &str) -> String {
    format!("{base_url}/staticmap/pregenerated/{}", id.trim())
}

#[cfg(test)]
#[path = "maps_test.rs"]
mod tests;
