//! Stat board: area counts grouped by what they count.
//!
//! The fixed counts are always shown; configured extras are appended. When
//! both the active and pending event counts are present they share one
//! line and the pending count gets no line of its own.

use std::collections::HashMap;

use time::OffsetDateTime;

use super::{BoardVariant, templates};
use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::query::{QueryError, StatKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatGroup {
    Creature,
    Venue,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub group: StatGroup,
    pub text: String,
    /// First line of a group after another group; rendered after a blank line.
    pub starts_group: bool,
}

pub struct StatBoard<'a> {
    extra: &'a [StatKind],
}

impl<'a> StatBoard<'a> {
    #[must_use]
    pub fn new(extra: &'a [StatKind]) -> Self {
        Self { extra }
    }

    /// Fixed stats followed by configured extras, without duplicates.
    fn requested(&self) -> Vec<StatKind> {
        let mut stats = StatKind::FIXED.to_vec();
        for stat in self.extra {
            if !stats.contains(stat) {
                stats.push(*stat);
            }
        }
        stats
    }
}

fn group(stat: StatKind) -> StatGroup {
    match stat {
        StatKind::ActiveMons | StatKind::ActiveHundos => StatGroup::Creature,
        StatKind::GymAmount | StatKind::RaidActive | StatKind::EggActive => StatGroup::Venue,
        StatKind::TotalStops | StatKind::ActiveQuests => StatGroup::Location,
    }
}

/// Locale key and emote key for a stat's line.
fn labels(stat: StatKind) -> (&'static str, &'static str) {
    match stat {
        StatKind::GymAmount => ("total_gyms", "gym_white"),
        StatKind::RaidActive => ("active_raids", "raid"),
        StatKind::EggActive => ("active_eggs", "raid"),
        StatKind::TotalStops => ("total_stops", "pokestop"),
        StatKind::ActiveQuests => ("active_quests", "quest"),
        StatKind::ActiveMons => ("active_mons", "pokeball"),
        StatKind::ActiveHundos => ("active_hundos", "hundo"),
    }
}

fn stat_text(ctx: &BoardContext, stat: StatKind, value: i64) -> String {
    let (key, emote_key) = labels(stat);
    let label = ctx.locale.format(key, &[("x", &value.to_string())]);
    match ctx.emote(emote_key) {
        Some(emote) => format!("{emote} {label}"),
        None => label,
    }
}

/// Build grouped stat lines from `(stat, count)` pairs in request order.
pub fn build_lines(ctx: &BoardContext, counts: &[(StatKind, i64)]) -> Vec<StatLine> {
    let values: HashMap<StatKind, i64> = counts.iter().copied().collect();
    let merged_pending = values.contains_key(&StatKind::RaidActive) && values.contains_key(&StatKind::EggActive);

    let mut lines = Vec::with_capacity(counts.len());
    for (stat, value) in counts {
        let text = match stat {
            StatKind::EggActive if merged_pending => continue,
            StatKind::RaidActive if merged_pending => {
                let pending = values.get(&StatKind::EggActive).copied().unwrap_or_default();
                let pending_text = ctx.locale.format("eggs_count", &[("x", &pending.to_string())]);
                format!("{} | {pending_text}", stat_text(ctx, *stat, *value))
            }
            _ => stat_text(ctx, *stat, *value),
        };
        lines.push(StatLine { group: group(*stat), text, starts_group: false });
    }

    lines.sort_by_key(|line| line.group);
    for index in 1..lines.len() {
        lines[index].starts_group = lines[index].group != lines[index - 1].group;
    }
    lines
}

#[async_trait::async_trait]
impl<'a> BoardVariant for StatBoard<'a> {
    type Record = (StatKind, i64);
    type Object = StatLine;

    async fn fetch(&self, ctx: &BoardContext, board: &BoardConfig) -> Result<Vec<Self::Record>, QueryError> {
        let mut counts = Vec::new();
        for stat in self.requested() {
            let value = ctx.queries.fetch_stat(stat, &board.area).await?;
            counts.push((stat, value));
        }
        Ok(counts)
    }

    async fn map(&mut self, ctx: &BoardContext, records: Vec<Self::Record>, _now: OffsetDateTime) -> Vec<StatLine> {
        build_lines(ctx, &records)
    }

    fn render(&self, _ctx: &BoardContext, object: &StatLine) -> String {
        templates::stat_line(object)
    }

    fn default_title(&self, ctx: &BoardContext) -> String {
        ctx.locale.get("stats")
    }
}

#[cfg(test)]
#[path = "stat_test.rs"]
mod tests;
