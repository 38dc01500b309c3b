//! Shared collaborators handed to every board.
//!
//! DESIGN
//! ======
//! `BoardContext` is built once in `main` and cloned into each scheduler
//! task. It holds only immutable data and `Arc`-wrapped services that are
//! safe to call concurrently, so boards never share mutable state.

use std::collections::HashMap;
use std::sync::Arc;

use time::UtcOffset;

use crate::config::ScanSchema;
use crate::icons::{IconRepo, IconStore};
use crate::locale::Locale;
use crate::maps::MapRenderer;
use crate::query::BoardQueries;

#[derive(Clone)]
pub struct BoardContext {
    pub queries: Arc<dyn BoardQueries>,
    pub icons: Arc<dyn IconStore>,
    pub maps: Arc<dyn MapRenderer>,
    pub locale: Arc<Locale>,
    /// Pre-uploaded emote markup keyed by name.
    pub emotes: Arc<HashMap<String, String>>,
    pub icon_repo: IconRepo,
    pub scan_schema: ScanSchema,
    /// Offset used when printing event times.
    pub display_offset: UtcOffset,
}

impl BoardContext {
    #[must_use]
    pub fn emote(&self, key: &str) -> Option<String> {
        self.emotes.get(key).cloned()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
