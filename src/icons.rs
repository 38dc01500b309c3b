//! Icon materialization: the boundary to whatever hosts inline icons.
//!
//! DESIGN
//! ======
//! Boards ask an [`IconStore`] to materialize an icon for a creature, item,
//! or egg and embed the returned markup in their text. Stores must be
//! idempotent: two boards creating the same key concurrently get the same
//! reference. Within one cycle a board goes through an [`IconTracker`] so a
//! key shared by several records is created once and later deleted once.
//!
//! `CachedIconStore` answers from the pre-configured emote table first. Any
//! other key is uploaded from its image URL through an [`IconUploader`] and
//! reference-counted: every materialize holds one reference, every delete
//! releases one, and the remote icon is removed when the last holder lets go.
//!
//! ERROR HANDLING
//! ==============
//! Materialization failure never fails a cycle. The tracker logs it and the
//! record renders without an icon.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

// =============================================================================
// ICON REPOSITORY URLS
// =============================================================================

/// Builds image URLs against a UICONS-layout repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRepo {
    base: String,
}

impl IconRepo {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into().trim_end_matches('/').to_string() }
    }

    #[must_use]
    pub fn creature(&self, id: u32, form: u32) -> String {
        if form == 0 {
            format!("{}/pokemon/{id}.png", self.base)
        } else {
            format!("{}/pokemon/{id}_f{form}.png", self.base)
        }
    }

    #[must_use]
    pub fn item(&self, id: u32) -> String {
        format!("{}/reward/item/{id}.png", self.base)
    }

    #[must_use]
    pub fn egg(&self, level: u8) -> String {
        format!("{}/raid/egg/{level}.png", self.base)
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("no icon available for {0}")]
    Unavailable(String),
    #[error("icon backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRequest {
    /// Identity of the icon, e.g. `mon_150` or `item_1301`.
    pub key: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconRef {
    pub key: String,
    /// Inline markup rendered into board text.
    pub markup: String,
}

/// Idempotent create/delete of inline icons. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IconStore: Send + Sync {
    /// Create (or return the existing) icon for `request.key`.
    ///
    /// # Errors
    ///
    /// Returns an [`IconError`] if no icon can be produced for the key.
    async fn materialize(&self, request: &IconRequest) -> Result<IconRef, IconError>;

    /// Release a previously materialized icon.
    ///
    /// # Errors
    ///
    /// Returns an [`IconError`] if the backend rejects the delete.
    async fn delete(&self, icon: &IconRef) -> Result<(), IconError>;
}

/// An icon created on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedIcon {
    /// Host-side id used to delete the icon again.
    pub remote_id: String,
    pub markup: String,
}

/// Creates and removes icons on the remote host.
#[async_trait::async_trait]
pub trait IconUploader: Send + Sync {
    /// Upload the image at `image_url` as an icon called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::Backend`] if the image cannot be fetched or the host rejects it.
    async fn upload(&self, name: &str, image_url: &str) -> Result<UploadedIcon, IconError>;

    /// Remove a previously uploaded icon.
    ///
    /// # Errors
    ///
    /// Returns [`IconError::Backend`] if the host rejects the delete.
    async fn remove(&self, remote_id: &str) -> Result<(), IconError>;
}

struct HeldIcon {
    icon: IconRef,
    remote_id: String,
    holders: usize,
}

/// Pre-configured emotes first, uploaded icons otherwise.
///
/// Shared by every board. Uploads happen under the mutex so concurrent
/// creates of one key produce a single remote icon.
pub struct CachedIconStore {
    emotes: HashMap<String, String>,
    uploader: Option<Arc<dyn IconUploader>>,
    held: Mutex<HashMap<String, HeldIcon>>,
}

impl CachedIconStore {
    #[must_use]
    pub fn new(emotes: HashMap<String, String>, uploader: Option<Arc<dyn IconUploader>>) -> Self {
        Self { emotes, uploader, held: Mutex::new(HashMap::new()) }
    }

    /// Outstanding references to an uploaded icon.
    #[cfg(test)]
    pub async fn holders(&self, key: &str) -> usize {
        self.held.lock().await.get(key).map_or(0, |held| held.holders)
    }
}

#[async_trait::async_trait]
impl IconStore for CachedIconStore {
    async fn materialize(&self, request: &IconRequest) -> Result<IconRef, IconError> {
        if let Some(markup) = self.emotes.get(&request.key) {
            return Ok(IconRef { key: request.key.clone(), markup: markup.clone() });
        }

        let mut held = self.held.lock().await;
        if let Some(existing) = held.get_mut(&request.key) {
            existing.holders += 1;
            return Ok(existing.icon.clone());
        }
        let Some(uploader) = &self.uploader else {
            return Err(IconError::Unavailable(request.key.clone()));
        };

        let uploaded = uploader.upload(&request.key, &request.image_url).await?;
        let icon = IconRef { key: request.key.clone(), markup: uploaded.markup };
        debug!(key = %request.key, remote_id = %uploaded.remote_id, "icon uploaded");
        held.insert(
            request.key.clone(),
            HeldIcon { icon: icon.clone(), remote_id: uploaded.remote_id, holders: 1 },
        );
        Ok(icon)
    }

    async fn delete(&self, icon: &IconRef) -> Result<(), IconError> {
        if self.emotes.contains_key(&icon.key) {
            return Ok(());
        }

        let mut held = self.held.lock().await;
        let Some(entry) = held.get_mut(&icon.key) else {
            return Ok(());
        };
        entry.holders = entry.holders.saturating_sub(1);
        if entry.holders > 0 {
            return Ok(());
        }
        let Some(entry) = held.remove(&icon.key) else {
            return Ok(());
        };
        match &self.uploader {
            Some(uploader) => uploader.remove(&entry.remote_id).await,
            None => Ok(()),
        }
    }
}

// =============================================================================
// PER-CYCLE TRACKING
// =============================================================================

/// Remembers which keys a board already materialized during this cycle.
#[derive(Debug, Default)]
pub struct IconTracker {
    resolved: HashMap<String, Option<IconRef>>,
    order: Vec<String>,
}

impl IconTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize `request` unless its key was already attempted this cycle.
    /// A failed attempt is remembered too, so it is not retried per record.
    pub async fn materialize(&mut self, store: &dyn IconStore, request: IconRequest) -> Option<IconRef> {
        if let Some(previous) = self.resolved.get(&request.key) {
            return previous.clone();
        }
        let icon = match store.materialize(&request).await {
            Ok(icon) => Some(icon),
            Err(IconError::Unavailable(_)) => {
                debug!(key = %request.key, "no pre-configured emote; rendering without icon");
                None
            }
            Err(e) => {
                warn!(error = %e, key = %request.key, "icon materialization failed; rendering without icon");
                None
            }
        };
        self.order.push(request.key.clone());
        self.resolved.insert(request.key, icon.clone());
        icon
    }

    /// Successfully materialized icons, in first-use order.
    #[must_use]
    pub fn into_icons(mut self) -> Vec<IconRef> {
        self.order
            .iter()
            .filter_map(|key| self.resolved.remove(key).flatten())
            .collect()
    }
}

/// Delete a finished cycle's icons, at most once per key.
/// Returns how many deletes were issued.
pub async fn teardown(store: &dyn IconStore, icons: &[IconRef]) -> usize {
    let mut deleted: HashSet<&str> = HashSet::new();
    for icon in icons {
        if !deleted.insert(icon.key.as_str()) {
            continue;
        }
        if let Err(e) = store.delete(icon).await {
            warn!(error = %e, key = %icon.key, "icon delete failed");
        }
    }
    deleted.len()
}

#[cfg(test)]
#[path = "icons_test.rs"]
mod tests;
