//! Payload delivery to the presentation surface.
//!
//! DESIGN
//! ======
//! A board owns one message. The first delivery creates it, and every later
//! cycle edits it in place, so the audience sees one panel that updates.
//! `WebhookSink` does this over a Discord-style webhook:
//! `POST {webhook}?wait=true` to create (the response carries the message
//! id) and `PATCH {webhook}/messages/{id}` to edit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Delivery;
use crate::payload::BoardPayload;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("delivery request failed: {0}")]
    Request(String),
    #[error("delivery rejected: status {status}: {body}")]
    Response { status: u16, body: String },
    #[error("unexpected delivery response: {0}")]
    Parse(String),
}

/// Where board payloads end up. Enables mocking in tests.
#[async_trait::async_trait]
pub trait PayloadSink: Send + Sync {
    /// Create or edit the board's message and return its id.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the surface rejects or never answers the request.
    async fn deliver(
        &self,
        delivery: &Delivery,
        message_id: Option<&str>,
        payload: &BoardPayload,
    ) -> Result<String, SinkError>;
}

#[derive(Debug, Serialize)]
pub(crate) struct WebhookBody<'a> {
    pub(crate) embeds: [&'a BoardPayload; 1],
}

#[derive(Debug, Deserialize)]
struct WebhookMessage {
    id: String,
}

pub(crate) fn webhook_body(payload: &BoardPayload) -> WebhookBody<'_> {
    WebhookBody { embeds: [payload] }
}

pub(crate) fn message_url(webhook_url: &str, message_id: &str) -> String {
    format!("{}/messages/{message_id}", webhook_url.trim_end_matches('/'))
}

pub struct WebhookSink {
    http: reqwest::Client,
}

impl WebhookSink {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, SinkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SinkError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl PayloadSink for WebhookSink {
    async fn deliver(
        &self,
        delivery: &Delivery,
        message_id: Option<&str>,
        payload: &BoardPayload,
    ) -> Result<String, SinkError> {
        let body = webhook_body(payload);
        let request = match message_id {
            Some(id) => self.http.patch(message_url(&delivery.webhook_url, id)),
            None => self.http.post(&delivery.webhook_url).query(&[("wait", "true")]),
        };

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| SinkError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| SinkError::Request(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(SinkError::Response { status, body: text });
        }

        let message: WebhookMessage = serde_json::from_str(&text).map_err(|e| SinkError::Parse(e.to_string()))?;
        Ok(message.id)
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;
