//! Entity model shared by the query layer, board variants, and templates.
//!
//! DESIGN
//! ======
//! Plain value objects. The only behavior here is derived display data
//! (names, icon URLs, fence text); anything that needs I/O or the clock
//! lives in `services`.

use serde::{Deserialize, Serialize};

// =============================================================================
// AREA
// =============================================================================

/// A named geofence. Every fetch for a board is scoped to its area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Area {
    pub name: String,
    /// Polygon vertices as `[lat, lon]` pairs.
    pub fence: Vec<[f64; 2]>,
}

impl Area {
    /// Render the fence as WKT polygon text for the SQL area filter.
    ///
    /// Coordinates are emitted in `lat lon` order to match `POINT(lat, lon)`
    /// in the queries. The ring is closed if the configured fence is open.
    #[must_use]
    pub fn fence_wkt(&self) -> String {
        let mut points: Vec<String> = self.fence.iter().map(|[lat, lon]| format!("{lat} {lon}")).collect();
        if let (Some(first), Some(last)) = (self.fence.first(), self.fence.last()) {
            if first != last {
                points.push(format!("{} {}", first[0], first[1]));
            }
        }
        format!("POLYGON(({}))", points.join(","))
    }
}

// =============================================================================
// LOCATIONS
// =============================================================================

/// A fixed point hosting timed events.
#[derive(Debug, Clone, PartialEq)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub ex_eligible: bool,
}

/// The location a field task was reported at.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

// =============================================================================
// CREATURE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Creature {
    /// Species id. Zero for a pending-event placeholder.
    pub id: u32,
    pub form: u32,
    pub moves: Option<(u32, u32)>,
    pub name: String,
    pub icon_url: String,
    /// Pre-configured emote markup, used instead of a materialized icon.
    pub emote: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Creature {
    /// Stand-in for the payload of an event that has not started yet.
    /// Only the level is known, so the identity is empty.
    #[must_use]
    pub fn placeholder(level: u8, name: String, icon_url: String, emote: Option<String>) -> Self {
        Self { id: 0, form: u32::from(level), moves: None, name, icon_url, emote, lat: None, lon: None }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.id == 0
    }

    /// Cache key used for icon materialization.
    #[must_use]
    pub fn icon_key(&self) -> String {
        if self.is_placeholder() {
            format!("egg_{}", self.form)
        } else if self.form == 0 {
            format!("mon_{}", self.id)
        } else {
            format!("mon_{}_{}", self.id, self.form)
        }
    }
}

// =============================================================================
// TIMED EVENT
// =============================================================================

/// Whether a timed event has started. Fixed when the event is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    Active,
}

/// A venue-scoped event with a start and an end (epoch seconds). The
/// level lives on in the placeholder when the payload is not yet known.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub start: i64,
    pub end: i64,
    pub venue: Venue,
    /// The real payload when active, a level placeholder when pending.
    pub creature: Creature,
    pub phase: Phase,
}

// =============================================================================
// WATCH-LIST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchKind {
    Item,
    Creature,
}

/// One configured reward of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEntry {
    pub kind: WatchKind,
    pub id: u32,
    pub name: String,
    pub icon_url: String,
}

impl WatchEntry {
    #[must_use]
    pub fn icon_key(&self) -> String {
        match self.kind {
            WatchKind::Item => format!("item_{}", self.id),
            WatchKind::Creature => format!("mon_{}", self.id),
        }
    }
}

/// Ordered watch-lists for a task board. Identifiers are unique per list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Watchlist {
    pub items: Vec<WatchEntry>,
    pub creatures: Vec<WatchEntry>,
}

impl Watchlist {
    /// The single watched entry, if exactly one is configured across both lists.
    #[must_use]
    pub fn only_entry(&self) -> Option<&WatchEntry> {
        match (self.items.as_slice(), self.creatures.as_slice()) {
            ([only], []) | ([], [only]) => Some(only),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
