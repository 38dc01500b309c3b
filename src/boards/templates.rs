//! Text templates, one per board kind.
//!
//! Every template returns a complete fragment including its trailing
//! newline, so the renderer can concatenate fragments as-is.

use time::{OffsetDateTime, UtcOffset};

use crate::context::BoardContext;
use crate::model::{Creature, Phase, TimedEvent};
use crate::services::reward::ResolvedReward;

use super::stat::StatLine;

pub fn stat_line(line: &StatLine) -> String {
    if line.starts_group { format!("\n{}\n", line.text) } else { format!("{}\n", line.text) }
}

pub fn rare_spawn(ctx: &BoardContext, creature: &Creature) -> String {
    let moves = creature
        .moves
        .map(|(a, b)| format!(" ({} / {})", ctx.locale.move_name(a), ctx.locale.move_name(b)))
        .unwrap_or_default();
    format!("{}**{}**{moves}\n", icon_prefix(creature.emote.as_deref()), creature.name)
}

pub fn timed_event(ctx: &BoardContext, event: &TimedEvent) -> String {
    let ex = if event.venue.ex_eligible { " (EX)" } else { "" };
    let time_text = match event.phase {
        Phase::Pending => ctx
            .locale
            .format("egg_hatches", &[("time", &clock(event.start, ctx.display_offset))]),
        Phase::Active => ctx
            .locale
            .format("raid_until", &[("time", &clock(event.end, ctx.display_offset))]),
    };
    format!(
        "{}**{}**{ex}: {} {time_text}\n",
        icon_prefix(event.creature.emote.as_deref()),
        event.venue.name,
        event.creature.name,
    )
}

/// Reward, linked location, then the task itself when the scanner reported it.
pub fn task(reward: &ResolvedReward) -> String {
    let location = &reward.location;
    let task_text = reward.task_text.trim();
    let detail = if task_text.is_empty() { String::new() } else { format!(": {task_text}") };
    format!(
        "{}**{}** [{}](https://maps.google.com/?q={},{}){detail}\n",
        icon_prefix(reward.icon.as_deref()),
        reward.entry.name,
        location.name,
        location.lat,
        location.lon,
    )
}

fn icon_prefix(markup: Option<&str>) -> String {
    markup.map(|m| format!("{m} ")).unwrap_or_default()
}

/// `HH:MM` of an epoch timestamp in the display offset, or `--:--` when
/// the shifted time is out of range.
pub fn clock(timestamp: i64, offset: UtcOffset) -> String {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|t| t.checked_to_offset(offset))
        .map_or_else(|| "--:--".to_string(), |t| format!("{:02}:{:02}", t.hour(), t.minute()))
}

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;
