//! Reward resolution: decode a task's reward payload and match it against
//! a board's watch-lists.
//!
//! DESIGN
//! ======
//! The payload shape depends on the scanner. Each supported shape has its
//! own serde model and decodes into the same `(item, creature)` id pair.
//! The schema is a closed enum checked at config load, so there is no
//! fallthrough for an unknown shape.
//!
//! Matching checks the item list first, then the creature list, taking the
//! first entry with an equal id. A record matching neither list resolves to
//! `None`; the caller drops it.

use serde::Deserialize;

use crate::config::ScanSchema;
use crate::model::{TaskLocation, WatchEntry, Watchlist};

#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error("reward payload is not valid for this scan schema: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reward payload has no rewards")]
    Empty,
}

/// Identifiers carried by a reward. A zero id means "not populated".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardIds {
    pub item_id: Option<u32>,
    pub creature_id: Option<u32>,
}

/// A task whose reward is on the board's watch-list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReward {
    pub entry: WatchEntry,
    pub location: TaskLocation,
    pub task_text: String,
    /// Materialized icon markup, if any.
    pub icon: Option<String>,
}

// =============================================================================
// PAYLOAD SHAPES
// =============================================================================

/// Shape A: `[{"info": {"pokemon_id": .., "item_id": ..}}]`.
#[derive(Debug, Deserialize)]
struct RdmReward {
    info: RdmInfo,
}

#[derive(Debug, Deserialize)]
struct RdmInfo {
    #[serde(default)]
    pokemon_id: Option<u32>,
    #[serde(default)]
    item_id: Option<u32>,
}

/// Shape B: `[{"item": {"item": ..}, "pokemon_encounter": {"pokemon_id": ..}}]`.
#[derive(Debug, Deserialize)]
struct MadReward {
    item: MadItem,
    pokemon_encounter: MadEncounter,
}

#[derive(Debug, Deserialize)]
struct MadItem {
    item: u32,
}

#[derive(Debug, Deserialize)]
struct MadEncounter {
    pokemon_id: u32,
}

#[derive(Debug)]
enum RewardPayload {
    Rdm(Vec<RdmReward>),
    Mad(Vec<MadReward>),
}

impl RewardPayload {
    fn parse(schema: ScanSchema, raw: &str) -> Result<Self, RewardError> {
        Ok(match schema {
            ScanSchema::Rdm => Self::Rdm(serde_json::from_str(raw)?),
            ScanSchema::Mad => Self::Mad(serde_json::from_str(raw)?),
        })
    }

    /// Ids from the first reward in the payload.
    fn ids(&self) -> Result<RewardIds, RewardError> {
        match self {
            Self::Rdm(rewards) => {
                let first = rewards.first().ok_or(RewardError::Empty)?;
                Ok(RewardIds {
                    item_id: nonzero(first.info.item_id),
                    creature_id: nonzero(first.info.pokemon_id),
                })
            }
            Self::Mad(rewards) => {
                let first = rewards.first().ok_or(RewardError::Empty)?;
                Ok(RewardIds {
                    item_id: nonzero(Some(first.item.item)),
                    creature_id: nonzero(Some(first.pokemon_encounter.pokemon_id)),
                })
            }
        }
    }
}

fn nonzero(id: Option<u32>) -> Option<u32> {
    id.filter(|id| *id != 0)
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Decode a raw reward payload with the configured scan schema.
///
/// # Errors
///
/// Returns a [`RewardError`] if the payload is not JSON, does not match the
/// schema's shape, or holds no rewards.
pub fn decode_reward(schema: ScanSchema, raw: &str) -> Result<RewardIds, RewardError> {
    RewardPayload::parse(schema, raw)?.ids()
}

/// First watch-list entry matching the reward, items before creatures.
#[must_use]
pub fn resolve(ids: RewardIds, watchlist: &Watchlist) -> Option<&WatchEntry> {
    let by_item = ids
        .item_id
        .and_then(|item_id| watchlist.items.iter().find(|entry| entry.id == item_id));
    by_item.or_else(|| {
        ids.creature_id
            .and_then(|creature_id| watchlist.creatures.iter().find(|entry| entry.id == creature_id))
    })
}

#[cfg(test)]
#[path = "reward_test.rs"]
mod tests;
