//! Rare-spawn board: active top-quality sightings in the area.

use time::OffsetDateTime;

use super::{BoardVariant, templates};
use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::maps::MapMarker;
use crate::model::Creature;
use crate::query::{QueryError, RareSpawnRow};

pub struct RareSpawnBoard;

fn to_creature(ctx: &BoardContext, row: RareSpawnRow) -> Creature {
    let moves = row.move_1.zip(row.move_2);
    let creature = Creature {
        id: row.creature_id,
        form: row.form,
        moves,
        name: ctx.locale.creature_name(row.creature_id),
        icon_url: ctx.icon_repo.creature(row.creature_id, row.form),
        emote: None,
        lat: Some(row.lat),
        lon: Some(row.lon),
    };
    let emote = ctx.emote(&creature.icon_key());
    Creature { emote, ..creature }
}

#[async_trait::async_trait]
impl BoardVariant for RareSpawnBoard {
    type Record = RareSpawnRow;
    type Object = Creature;

    async fn fetch(&self, ctx: &BoardContext, board: &BoardConfig) -> Result<Vec<RareSpawnRow>, QueryError> {
        ctx.queries.fetch_rare_spawns(&board.area).await
    }

    async fn map(&mut self, ctx: &BoardContext, records: Vec<RareSpawnRow>, _now: OffsetDateTime) -> Vec<Creature> {
        records.into_iter().map(|row| to_creature(ctx, row)).collect()
    }

    fn render(&self, ctx: &BoardContext, object: &Creature) -> String {
        templates::rare_spawn(ctx, object)
    }

    fn default_title(&self, ctx: &BoardContext) -> String {
        ctx.locale.get("rare_spawns")
    }

    fn map_template(&self) -> Option<&'static str> {
        Some("areaboard-rare-spawn")
    }

    fn markers(&self, objects: &[Creature]) -> Vec<MapMarker> {
        objects
            .iter()
            .filter_map(|creature| {
                Some(MapMarker { lat: creature.lat?, lon: creature.lon?, url: creature.icon_url.clone() })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "rare_spawn_test.rs"]
mod tests;
