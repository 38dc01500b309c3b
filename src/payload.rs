//! Board output payload, serialized as a Discord-style embed object.

use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardPayload {
    pub title: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<OffsetDateTime>,
    pub footer: EmbedFooter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
}

impl BoardPayload {
    /// Placeholder shown until a board's first cycle completes.
    #[must_use]
    pub fn loading(title: String, footer: String, thumbnail: Option<String>) -> Self {
        Self {
            title,
            description: String::new(),
            timestamp: None,
            footer: EmbedFooter { text: footer },
            image: None,
            thumbnail: thumbnail.map(|url| EmbedMedia { url }),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().map(|media| media.url.as_str())
    }
}

#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;
