//! Timed-event board: pending (egg) or active (raid) events in one phase.
//!
//! Every record goes through the temporal deriver; records whose derived
//! phase differs from the board's phase are dropped. Active boards
//! materialize an icon for each accepted record through an [`IconTracker`],
//! so two records with the same creature share one attempt and one icon.

use time::OffsetDateTime;
use tracing::trace;

use super::{BoardVariant, templates};
use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::icons::{IconRef, IconRequest, IconTracker};
use crate::maps::MapMarker;
use crate::model::{Creature, Phase, TimedEvent, Venue};
use crate::query::{QueryError, TimedEventRow};
use crate::services::temporal::{derive_event, placeholder};

pub struct TimedEventBoard<'a> {
    phase: Phase,
    levels: &'a [u8],
    tracker: IconTracker,
}

impl<'a> TimedEventBoard<'a> {
    #[must_use]
    pub fn new(phase: Phase, levels: &'a [u8]) -> Self {
        Self { phase, levels, tracker: IconTracker::new() }
    }

    async fn attach_icon(&mut self, ctx: &BoardContext, event: &mut TimedEvent) {
        if event.creature.is_placeholder() {
            return;
        }
        let request = IconRequest { key: event.creature.icon_key(), image_url: event.creature.icon_url.clone() };
        if let Some(icon) = self.tracker.materialize(ctx.icons.as_ref(), request).await {
            event.creature.emote = Some(icon.markup);
        }
    }
}

fn split_row(ctx: &BoardContext, row: TimedEventRow) -> (u8, i64, i64, Venue, Creature) {
    let venue = Venue {
        id: row.venue_id,
        name: row.venue_name,
        lat: row.lat,
        lon: row.lon,
        ex_eligible: row.ex_eligible,
    };
    let creature = match row.creature_id {
        Some(id) => {
            let form = row.form.unwrap_or(0);
            Creature {
                id,
                form,
                moves: row.move_1.zip(row.move_2),
                name: ctx.locale.creature_name(id),
                icon_url: ctx.icon_repo.creature(id, form),
                emote: None,
                lat: Some(row.lat),
                lon: Some(row.lon),
            }
        }
        // Boss not announced yet.
        None => placeholder(ctx, row.level),
    };
    (row.level, row.start, row.end, venue, creature)
}

#[async_trait::async_trait]
impl<'a> BoardVariant for TimedEventBoard<'a> {
    type Record = TimedEventRow;
    type Object = TimedEvent;

    async fn fetch(&self, ctx: &BoardContext, board: &BoardConfig) -> Result<Vec<TimedEventRow>, QueryError> {
        ctx.queries.fetch_timed_events(&board.area, self.levels).await
    }

    async fn map(&mut self, ctx: &BoardContext, records: Vec<TimedEventRow>, now: OffsetDateTime) -> Vec<TimedEvent> {
        let mut events = Vec::with_capacity(records.len());
        for row in records {
            let (level, start, end, venue, creature) = split_row(ctx, row);
            let mut event = derive_event(ctx, level, start, end, venue, creature, now);
            if event.phase != self.phase {
                trace!(venue = %event.venue.id, phase = ?event.phase, "event outside board phase");
                continue;
            }
            if self.phase == Phase::Active {
                self.attach_icon(ctx, &mut event).await;
            }
            events.push(event);
        }
        events
    }

    fn render(&self, ctx: &BoardContext, object: &TimedEvent) -> String {
        templates::timed_event(ctx, object)
    }

    fn default_title(&self, ctx: &BoardContext) -> String {
        match self.phase {
            Phase::Pending => ctx.locale.get("eggs"),
            Phase::Active => ctx.locale.get("raids"),
        }
    }

    fn map_template(&self) -> Option<&'static str> {
        match self.phase {
            Phase::Pending => Some("areaboard-egg"),
            Phase::Active => Some("areaboard-raid"),
        }
    }

    fn markers(&self, objects: &[TimedEvent]) -> Vec<MapMarker> {
        objects
            .iter()
            .map(|event| MapMarker { lat: event.venue.lat, lon: event.venue.lon, url: event.creature.icon_url.clone() })
            .collect()
    }

    fn take_icons(&mut self) -> Vec<IconRef> {
        std::mem::take(&mut self.tracker).into_icons()
    }
}

#[cfg(test)]
#[path = "timed_event_test.rs"]
mod tests;
