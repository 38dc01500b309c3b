//! Query layer: everything a board reads from the scanner database.
//!
//! DESIGN
//! ======
//! Boards depend on the [`BoardQueries`] trait, never on SQL. `SqlQueries`
//! is the production implementation; tests substitute an in-memory mock.
//! Rows are plain structs so the mapping step stays independent of the
//! database driver.

pub mod sql;

use serde::{Deserialize, Serialize};

use crate::model::Area;

pub use sql::SqlQueries;

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// ROWS
// =============================================================================

/// An active, top-quality creature sighting.
#[derive(Debug, Clone, PartialEq)]
pub struct RareSpawnRow {
    pub creature_id: u32,
    pub move_1: Option<u32>,
    pub move_2: Option<u32>,
    pub form: u32,
    pub lat: f64,
    pub lon: f64,
}

/// A venue with an unexpired timed event. Creature fields are empty while
/// the event is still pending.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEventRow {
    pub venue_id: String,
    pub start: i64,
    pub end: i64,
    pub lat: f64,
    pub lon: f64,
    pub creature_id: Option<u32>,
    pub move_1: Option<u32>,
    pub move_2: Option<u32>,
    pub venue_name: String,
    pub ex_eligible: bool,
    pub level: u8,
    pub form: Option<u32>,
}

/// A field task with its raw, schema-dependent reward payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub reward_json: String,
    pub task_text: String,
    pub lat: f64,
    pub lon: f64,
    pub location_name: String,
    pub location_id: String,
}

// =============================================================================
// STATS
// =============================================================================

/// A single count a stat board can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    GymAmount,
    RaidActive,
    EggActive,
    TotalStops,
    ActiveQuests,
    ActiveMons,
    ActiveHundos,
}

impl StatKind {
    /// Counts every stat board shows, in display order.
    pub const FIXED: [StatKind; 3] = [StatKind::GymAmount, StatKind::RaidActive, StatKind::EggActive];
}

// =============================================================================
// TRAIT
// =============================================================================

/// Area-scoped reads used by the board variants. Enables mocking in tests.
#[async_trait::async_trait]
pub trait BoardQueries: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the datastore is unavailable.
    async fn fetch_rare_spawns(&self, area: &Area) -> Result<Vec<RareSpawnRow>, QueryError>;

    /// Unexpired timed events whose level is in `levels`.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the datastore is unavailable.
    async fn fetch_timed_events(&self, area: &Area, levels: &[u8]) -> Result<Vec<TimedEventRow>, QueryError>;

    /// # Errors
    ///
    /// Returns a [`QueryError`] if the datastore is unavailable.
    async fn fetch_tasks(&self, area: &Area) -> Result<Vec<TaskRow>, QueryError>;

    /// # Errors
    ///
    /// Returns a [`QueryError`] if the datastore is unavailable.
    async fn fetch_stat(&self, stat: StatKind, area: &Area) -> Result<i64, QueryError>;
}
