//! Temporal state: pending vs. active timed events.
//!
//! An event is pending iff its start is strictly after the evaluation
//! instant; `start == now` counts as active. The phase is fixed when the
//! event is built and is not re-evaluated at render time, so an event can
//! still show as pending for the fetch-to-render latency after it starts.
//!
//! Timestamps come from the scanner and are not validated here.

use time::OffsetDateTime;

use crate::context::BoardContext;
use crate::model::{Creature, Phase, TimedEvent, Venue};

#[must_use]
pub fn phase_at(start: i64, now: OffsetDateTime) -> Phase {
    if start > now.unix_timestamp() { Phase::Pending } else { Phase::Active }
}

/// Build a [`TimedEvent`], swapping the payload for a level placeholder
/// while the event is pending. The placeholder's icon comes from the
/// configured `raid_egg_{level}` emote; no icon is materialized for it.
#[must_use]
pub fn derive_event(
    ctx: &BoardContext,
    level: u8,
    start: i64,
    end: i64,
    venue: Venue,
    payload: Creature,
    now: OffsetDateTime,
) -> TimedEvent {
    let phase = phase_at(start, now);
    let creature = match phase {
        Phase::Active => payload,
        Phase::Pending => placeholder(ctx, level),
    };
    TimedEvent { start, end, venue, creature, phase }
}

/// Level placeholder shown in place of a pending or unknown payload.
#[must_use]
pub fn placeholder(ctx: &BoardContext, level: u8) -> Creature {
    let level_text = level.to_string();
    Creature::placeholder(
        level,
        ctx.locale.format("level_egg", &[("level", &level_text)]),
        ctx.icon_repo.egg(level),
        ctx.emote(&format!("raid_egg_{level}")),
    )
}

#[cfg(test)]
#[path = "temporal_test.rs"]
mod tests;
