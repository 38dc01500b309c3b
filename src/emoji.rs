//! Guild emoji uploads for icons that have no pre-configured emote.
//!
//! DESIGN
//! ======
//! The image is fetched from the icon repository and sent to the bot API
//! as a base64 data URI: `POST {api}/guilds/{guild}/emojis` creates the
//! emoji, `DELETE {api}/guilds/{guild}/emojis/{id}` removes it. The emoji
//! name is the icon key, so markup reads `<:mon_150:{id}>`.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::icons::{IconError, IconUploader, UploadedIcon};

const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Serialize)]
struct CreateEmoji<'a> {
    name: &'a str,
    image: String,
}

#[derive(Debug, Deserialize)]
struct Emoji {
    id: String,
}

pub(crate) fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

pub(crate) fn emoji_markup(name: &str, id: &str) -> String {
    format!("<:{name}:{id}>")
}

pub(crate) fn emojis_url(api_base: &str, guild_id: &str) -> String {
    format!("{}/guilds/{guild_id}/emojis", api_base.trim_end_matches('/'))
}

pub struct DiscordEmojiUploader {
    http: reqwest::Client,
    api_base: String,
    guild_id: String,
    bot_token: String,
}

impl DiscordEmojiUploader {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_base: String, guild_id: String, bot_token: String) -> Result<Self, IconError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| IconError::Backend(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, api_base, guild_id, bot_token })
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    async fn fetch_image(&self, image_url: &str) -> Result<String, IconError> {
        let response = self
            .http
            .get(image_url)
            .send()
            .await
            .map_err(|e| IconError::Backend(format!("image fetch failed: {e}")))?;
        if !response.status().is_success() {
            return Err(IconError::Backend(format!("image fetch returned {} for {image_url}", response.status())));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| IconError::Backend(format!("image read failed: {e}")))?;
        Ok(data_uri(&content_type, &bytes))
    }
}

#[async_trait::async_trait]
impl IconUploader for DiscordEmojiUploader {
    async fn upload(&self, name: &str, image_url: &str) -> Result<UploadedIcon, IconError> {
        let image = self.fetch_image(image_url).await?;
        let response = self
            .http
            .post(emojis_url(&self.api_base, &self.guild_id))
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&CreateEmoji { name, image })
            .send()
            .await
            .map_err(|e| IconError::Backend(format!("emoji create failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IconError::Backend(format!("emoji create failed: {e}")))?;
        if !status.is_success() {
            return Err(IconError::Backend(format!("emoji create rejected ({status}): {text}")));
        }
        let emoji: Emoji =
            serde_json::from_str(&text).map_err(|e| IconError::Backend(format!("unexpected emoji response: {e}")))?;

        Ok(UploadedIcon { markup: emoji_markup(name, &emoji.id), remote_id: emoji.id })
    }

    async fn remove(&self, remote_id: &str) -> Result<(), IconError> {
        let url = format!("{}/{remote_id}", emojis_url(&self.api_base, &self.guild_id));
        let response = self
            .http
            .delete(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|e| IconError::Backend(format!("emoji delete failed: {e}")))?;

        let status = response.status();
        // Already gone is as good as deleted.
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            debug!(remote_id, "emoji removed");
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(IconError::Backend(format!("emoji delete rejected ({status}): {text}")))
    }
}

#[cfg(test)]
#[path = "emoji_test.rs"]
mod tests;
