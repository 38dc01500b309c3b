//! Task board: field tasks whose reward is on the board's watch-list.
//!
//! Each task's reward payload is decoded with the configured scan schema
//! and resolved against the watch-lists. A task whose reward resolves to
//! nothing is dropped whole. Icons go through an [`IconTracker`] so an
//! entry shared by several tasks is materialized once per cycle.

use time::OffsetDateTime;
use tracing::{trace, warn};

use super::{BoardVariant, templates};
use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::icons::{IconRef, IconRequest, IconTracker};
use crate::maps::MapMarker;
use crate::model::{TaskLocation, Watchlist};
use crate::query::{QueryError, TaskRow};
use crate::services::reward::{ResolvedReward, decode_reward, resolve};

pub struct TaskBoard<'a> {
    watchlist: &'a Watchlist,
    tracker: IconTracker,
}

impl<'a> TaskBoard<'a> {
    #[must_use]
    pub fn new(watchlist: &'a Watchlist) -> Self {
        Self { watchlist, tracker: IconTracker::new() }
    }
}

#[async_trait::async_trait]
impl<'a> BoardVariant for TaskBoard<'a> {
    type Record = TaskRow;
    type Object = ResolvedReward;

    async fn fetch(&self, ctx: &BoardContext, board: &BoardConfig) -> Result<Vec<TaskRow>, QueryError> {
        ctx.queries.fetch_tasks(&board.area).await
    }

    async fn map(&mut self, ctx: &BoardContext, records: Vec<TaskRow>, _now: OffsetDateTime) -> Vec<ResolvedReward> {
        let mut rewards = Vec::new();
        for row in records {
            let ids = match decode_reward(ctx.scan_schema, &row.reward_json) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!(error = %e, location = %row.location_id, "skipping task with malformed reward");
                    continue;
                }
            };
            let Some(entry) = resolve(ids, self.watchlist) else {
                trace!(location = %row.location_id, "reward not watched");
                continue;
            };
            let request = IconRequest { key: entry.icon_key(), image_url: entry.icon_url.clone() };
            let icon = self.tracker.materialize(ctx.icons.as_ref(), request).await;
            rewards.push(ResolvedReward {
                entry: entry.clone(),
                location: TaskLocation { name: row.location_name, lat: row.lat, lon: row.lon },
                task_text: row.task_text,
                icon: icon.map(|icon| icon.markup),
            });
        }
        rewards
    }

    fn render(&self, _ctx: &BoardContext, object: &ResolvedReward) -> String {
        templates::task(object)
    }

    /// Boards watching a single reward are titled after it.
    fn default_title(&self, ctx: &BoardContext) -> String {
        let quests = ctx.locale.get("quests");
        match self.watchlist.only_entry() {
            Some(entry) => format!("{} {quests}", entry.name),
            None => quests,
        }
    }

    fn map_template(&self) -> Option<&'static str> {
        Some("areaboard-quest")
    }

    fn markers(&self, objects: &[ResolvedReward]) -> Vec<MapMarker> {
        objects
            .iter()
            .map(|reward| MapMarker {
                lat: reward.location.lat,
                lon: reward.location.lon,
                url: reward.entry.icon_url.clone(),
            })
            .collect()
    }

    fn thumbnail(&self) -> Option<String> {
        self.watchlist.only_entry().map(|entry| entry.icon_url.clone())
    }

    fn take_icons(&mut self) -> Vec<IconRef> {
        std::mem::take(&mut self.tracker).into_icons()
    }
}

#[cfg(test)]
#[path = "task_test.rs"]
mod tests;
