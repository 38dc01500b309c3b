//! `BoardQueries` over a MySQL scanner database (RDM or MAD layout).
//!
//! SYSTEM CONTEXT
//! ==============
//! The scanner owns the schema; this module only reads. The area filter is
//! the fence polygon bound as WKT text to `ST_CONTAINS`, and the level
//! whitelist is expanded into an `IN (...)` list with `QueryBuilder`.

use sqlx::{MySql, MySqlPool, QueryBuilder};
use tracing::debug;

use super::{BoardQueries, QueryError, RareSpawnRow, StatKind, TaskRow, TimedEventRow};
use crate::config::ScanSchema;
use crate::model::Area;

// =============================================================================
// SQL TEXT
// =============================================================================

/// Per-schema statement text. Statements take the fence WKT as their first
/// bind; the timed-event statement is assembled around its level list.
pub(crate) struct SchemaSql {
    pub(crate) rare_spawns: &'static str,
    /// Ends right where the fence WKT is bound.
    pub(crate) timed_events_head: &'static str,
    /// Closes the fence clause and opens the level `IN (` list.
    pub(crate) timed_events_levels: &'static str,
    pub(crate) timed_events_tail: &'static str,
    pub(crate) tasks: &'static str,
}

const RDM_SQL: SchemaSql = SchemaSql {
    rare_spawns: "SELECT CAST(pokemon_id AS SIGNED), CAST(move_1 AS SIGNED), CAST(move_2 AS SIGNED), \
                  CAST(form AS SIGNED), lat, lon \
                  FROM pokemon \
                  WHERE iv = 100 AND expire_timestamp > UNIX_TIMESTAMP() \
                  AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon)) \
                  ORDER BY expire_timestamp ASC",
    timed_events_head: "SELECT id, CAST(raid_battle_timestamp AS SIGNED), CAST(raid_end_timestamp AS SIGNED), lat, lon, \
                        CAST(raid_pokemon_id AS SIGNED), CAST(raid_pokemon_move_1 AS SIGNED), \
                        CAST(raid_pokemon_move_2 AS SIGNED), name, CAST(ex_raid_eligible AS SIGNED), \
                        CAST(raid_level AS SIGNED), CAST(raid_pokemon_form AS SIGNED) \
                        FROM gym \
                        WHERE raid_end_timestamp > UNIX_TIMESTAMP() \
                        AND ST_CONTAINS(ST_GEOMFROMTEXT(",
    timed_events_levels: "), POINT(lat, lon)) AND raid_level IN (",
    timed_events_tail: ") ORDER BY raid_level DESC, raid_end_timestamp ASC",
    tasks: "SELECT CAST(quest_rewards AS CHAR), quest_template, lat, lon, name, id \
            FROM pokestop \
            WHERE quest_type IS NOT NULL \
            AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon)) \
            ORDER BY quest_item_id ASC, quest_pokemon_id ASC, name ASC",
};

const MAD_SQL: SchemaSql = SchemaSql {
    rare_spawns: "SELECT CAST(pokemon_id AS SIGNED), CAST(move_1 AS SIGNED), CAST(move_2 AS SIGNED), \
                  CAST(form AS SIGNED), latitude, longitude \
                  FROM pokemon \
                  WHERE individual_attack = 15 AND individual_defense = 15 AND individual_stamina = 15 \
                  AND disappear_time > UTC_TIMESTAMP() \
                  AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(latitude, longitude)) \
                  ORDER BY disappear_time ASC",
    timed_events_head: "SELECT gym.gym_id, CAST(UNIX_TIMESTAMP(raid.start) AS SIGNED), \
                        CAST(UNIX_TIMESTAMP(raid.end) AS SIGNED), gym.latitude, gym.longitude, \
                        CAST(raid.pokemon_id AS SIGNED), CAST(raid.move_1 AS SIGNED), CAST(raid.move_2 AS SIGNED), \
                        gymdetails.name, CAST(gym.is_ex_raid_eligible AS SIGNED), CAST(raid.level AS SIGNED), \
                        CAST(raid.form AS SIGNED) \
                        FROM gym \
                        LEFT JOIN gymdetails ON gym.gym_id = gymdetails.gym_id \
                        LEFT JOIN raid ON raid.gym_id = gym.gym_id \
                        WHERE raid.end > UTC_TIMESTAMP() \
                        AND ST_CONTAINS(ST_GEOMFROMTEXT(",
    timed_events_levels: "), POINT(gym.latitude, gym.longitude)) AND raid.level IN (",
    timed_events_tail: ") ORDER BY raid.level DESC, raid.end ASC",
    tasks: "SELECT CAST(trs_quest.quest_reward AS CHAR), trs_quest.quest_task, pokestop.latitude, \
            pokestop.longitude, pokestop.name, pokestop.pokestop_id \
            FROM pokestop \
            INNER JOIN trs_quest ON pokestop.pokestop_id = trs_quest.GUID \
            WHERE DATE(FROM_UNIXTIME(trs_quest.quest_timestamp)) = CURDATE() \
            AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(pokestop.latitude, pokestop.longitude)) \
            ORDER BY trs_quest.quest_item_id ASC, trs_quest.quest_pokemon_id ASC, pokestop.name ASC",
};

pub(crate) fn schema_sql(schema: ScanSchema) -> &'static SchemaSql {
    match schema {
        ScanSchema::Rdm => &RDM_SQL,
        ScanSchema::Mad => &MAD_SQL,
    }
}

/// `COUNT(*)` statement for one stat. Takes the fence WKT as its only bind.
pub(crate) fn stat_sql(schema: ScanSchema, stat: StatKind) -> &'static str {
    match (schema, stat) {
        (ScanSchema::Rdm, StatKind::GymAmount) => {
            "SELECT COUNT(*) FROM gym WHERE ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Rdm, StatKind::RaidActive) => {
            "SELECT COUNT(*) FROM gym WHERE raid_battle_timestamp < UNIX_TIMESTAMP() \
             AND raid_end_timestamp > UNIX_TIMESTAMP() AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Rdm, StatKind::EggActive) => {
            "SELECT COUNT(*) FROM gym WHERE raid_battle_timestamp > UNIX_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Rdm, StatKind::TotalStops) => {
            "SELECT COUNT(*) FROM pokestop WHERE ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Rdm, StatKind::ActiveQuests) => {
            "SELECT COUNT(*) FROM pokestop WHERE quest_type IS NOT NULL \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Rdm, StatKind::ActiveMons) => {
            "SELECT COUNT(*) FROM pokemon WHERE expire_timestamp > UNIX_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Rdm, StatKind::ActiveHundos) => {
            "SELECT COUNT(*) FROM pokemon WHERE iv = 100 AND expire_timestamp > UNIX_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(lat, lon))"
        }
        (ScanSchema::Mad, StatKind::GymAmount) => {
            "SELECT COUNT(*) FROM gym WHERE ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(latitude, longitude))"
        }
        (ScanSchema::Mad, StatKind::RaidActive) => {
            "SELECT COUNT(*) FROM raid LEFT JOIN gym ON gym.gym_id = raid.gym_id \
             WHERE raid.start < UTC_TIMESTAMP() AND raid.end > UTC_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(gym.latitude, gym.longitude))"
        }
        (ScanSchema::Mad, StatKind::EggActive) => {
            "SELECT COUNT(*) FROM raid LEFT JOIN gym ON gym.gym_id = raid.gym_id \
             WHERE raid.start > UTC_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(gym.latitude, gym.longitude))"
        }
        (ScanSchema::Mad, StatKind::TotalStops) => {
            "SELECT COUNT(*) FROM pokestop WHERE ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(latitude, longitude))"
        }
        (ScanSchema::Mad, StatKind::ActiveQuests) => {
            "SELECT COUNT(*) FROM pokestop INNER JOIN trs_quest ON pokestop.pokestop_id = trs_quest.GUID \
             WHERE DATE(FROM_UNIXTIME(trs_quest.quest_timestamp)) = CURDATE() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(pokestop.latitude, pokestop.longitude))"
        }
        (ScanSchema::Mad, StatKind::ActiveMons) => {
            "SELECT COUNT(*) FROM pokemon WHERE disappear_time > UTC_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(latitude, longitude))"
        }
        (ScanSchema::Mad, StatKind::ActiveHundos) => {
            "SELECT COUNT(*) FROM pokemon WHERE individual_attack = 15 AND individual_defense = 15 \
             AND individual_stamina = 15 AND disappear_time > UTC_TIMESTAMP() \
             AND ST_CONTAINS(ST_GEOMFROMTEXT(?), POINT(latitude, longitude))"
        }
    }
}

// =============================================================================
// IMPLEMENTATION
// =============================================================================

pub struct SqlQueries {
    pool: MySqlPool,
    schema: ScanSchema,
}

impl SqlQueries {
    #[must_use]
    pub fn new(pool: MySqlPool, schema: ScanSchema) -> Self {
        Self { pool, schema }
    }
}

type TimedEventTuple = (
    String,
    i64,
    i64,
    f64,
    f64,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<i64>,
    i64,
    Option<i64>,
);

#[async_trait::async_trait]
impl BoardQueries for SqlQueries {
    async fn fetch_rare_spawns(&self, area: &Area) -> Result<Vec<RareSpawnRow>, QueryError> {
        let rows = sqlx::query_as::<_, (i64, Option<i64>, Option<i64>, Option<i64>, f64, f64)>(
            schema_sql(self.schema).rare_spawns,
        )
        .bind(area.fence_wkt())
        .fetch_all(&self.pool)
        .await?;

        debug!(area = %area.name, count = rows.len(), "fetched rare spawns");
        Ok(rows
            .into_iter()
            .map(|(creature_id, move_1, move_2, form, lat, lon)| RareSpawnRow {
                creature_id: to_u32(creature_id),
                move_1: move_1.map(to_u32),
                move_2: move_2.map(to_u32),
                form: form.map_or(0, to_u32),
                lat,
                lon,
            })
            .collect())
    }

    async fn fetch_timed_events(&self, area: &Area, levels: &[u8]) -> Result<Vec<TimedEventRow>, QueryError> {
        if levels.is_empty() {
            return Ok(Vec::new());
        }

        let sql = schema_sql(self.schema);
        let mut builder = QueryBuilder::<MySql>::new(sql.timed_events_head);
        builder.push_bind(area.fence_wkt());
        builder.push(sql.timed_events_levels);
        {
            let mut separated = builder.separated(", ");
            for level in levels {
                separated.push_bind(i64::from(*level));
            }
        }
        builder.push(sql.timed_events_tail);

        let rows = builder
            .build_query_as::<TimedEventTuple>()
            .fetch_all(&self.pool)
            .await?;

        debug!(area = %area.name, count = rows.len(), ?levels, "fetched timed events");
        Ok(rows
            .into_iter()
            .map(
                |(venue_id, start, end, lat, lon, creature_id, move_1, move_2, name, ex, level, form)| {
                    TimedEventRow {
                        venue_id,
                        start,
                        end,
                        lat,
                        lon,
                        creature_id: creature_id.map(to_u32).filter(|id| *id != 0),
                        move_1: move_1.map(to_u32),
                        move_2: move_2.map(to_u32),
                        venue_name: name.unwrap_or_default(),
                        ex_eligible: ex.unwrap_or(0) != 0,
                        level: u8::try_from(level).unwrap_or(0),
                        form: form.map(to_u32),
                    }
                },
            )
            .collect())
    }

    async fn fetch_tasks(&self, area: &Area) -> Result<Vec<TaskRow>, QueryError> {
        let rows = sqlx::query_as::<_, (Option<String>, Option<String>, f64, f64, Option<String>, String)>(
            schema_sql(self.schema).tasks,
        )
        .bind(area.fence_wkt())
        .fetch_all(&self.pool)
        .await?;

        debug!(area = %area.name, count = rows.len(), "fetched tasks");
        Ok(rows
            .into_iter()
            .filter_map(|(reward_json, task_text, lat, lon, name, location_id)| {
                Some(TaskRow {
                    reward_json: reward_json?,
                    task_text: task_text.unwrap_or_default(),
                    lat,
                    lon,
                    location_name: name.unwrap_or_default(),
                    location_id,
                })
            })
            .collect())
    }

    async fn fetch_stat(&self, stat: StatKind, area: &Area) -> Result<i64, QueryError> {
        let count: i64 = sqlx::query_scalar(stat_sql(self.schema, stat))
            .bind(area.fence_wkt())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
