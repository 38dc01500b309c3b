use super::*;
use crate::boards::get_at;
use crate::config::BoardKind;
use crate::context::test_helpers::{self, MockIcons, MockMaps, MockQueries, timed_event_row};

const NOW: i64 = 1_700_000_000;

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(NOW).unwrap()
}

fn mixed_rows() -> Vec<TimedEventRow> {
    vec![
        // started ten minutes ago
        timed_event_row("a", 5, NOW - 600, NOW + 2100, Some(150)),
        // starts in ten minutes
        timed_event_row("b", 5, NOW + 600, NOW + 3300, Some(150)),
        // starts exactly now
        timed_event_row("c", 5, NOW, NOW + 2700, Some(382)),
        // level not requested
        timed_event_row("d", 3, NOW - 60, NOW + 2000, Some(68)),
    ]
}

fn board(phase: Phase) -> BoardConfig {
    test_helpers::test_board(BoardKind::TimedEvent { phase, levels: vec![5] })
}

#[tokio::test]
async fn active_board_keeps_started_events_with_icons() {
    let tc = test_helpers::test_context(MockQueries { timed_events: mixed_rows(), ..MockQueries::default() });

    let output = get_at(&tc.ctx, &board(Phase::Active), now()).await.unwrap();
    let lines: Vec<&str> = output.payload.description.lines().collect();
    assert_eq!(lines, vec!["<:mon_150:1> **Gym a**: #150 until 22:48", "<:mon_382:1> **Gym c**: #382 until 22:58"]);
    assert_eq!(output.payload.title, "Raids");
    assert_eq!(tc.icons.created(), vec!["mon_150", "mon_382"]);
    assert_eq!(output.icons.len(), 2);
    assert_eq!(tc.queries.calls(), vec!["timed_events:Downtown:[5]"]);
}

#[tokio::test]
async fn pending_board_shows_placeholders_without_icons() {
    let tc = test_helpers::test_context(MockQueries { timed_events: mixed_rows(), ..MockQueries::default() });

    let output = get_at(&tc.ctx, &board(Phase::Pending), now()).await.unwrap();
    assert_eq!(output.payload.description, "<:egg5:55> **Gym b**: Level 5 Egg hatches at 22:23\n");
    assert_eq!(output.payload.title, "Eggs");
    assert_eq!(output.payload.image_url(), Some("https://maps.test/areaboard-egg.png"));
    assert!(tc.icons.created().is_empty());
    assert!(output.icons.is_empty());
}

#[tokio::test]
async fn icon_failure_renders_without_icon() {
    let icons = MockIcons { unavailable: vec!["mon_150".into()], ..MockIcons::default() };
    let queries = MockQueries {
        timed_events: vec![timed_event_row("a", 5, NOW - 600, NOW + 2100, Some(150))],
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context_with(queries, icons, MockMaps::default());

    let output = get_at(&tc.ctx, &board(Phase::Active), now()).await.unwrap();
    assert_eq!(output.payload.description, "**Gym a**: #150 until 22:48\n");
    assert!(output.icons.is_empty());
}

#[tokio::test]
async fn unannounced_boss_uses_placeholder_on_active_board() {
    let queries = MockQueries {
        timed_events: vec![timed_event_row("a", 5, NOW - 600, NOW + 2100, None)],
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context(queries);

    let output = get_at(&tc.ctx, &board(Phase::Active), now()).await.unwrap();
    assert_eq!(output.payload.description, "<:egg5:55> **Gym a**: Level 5 Egg until 22:48\n");
    assert!(tc.icons.created().is_empty());
}

#[tokio::test]
async fn shared_creature_is_materialized_once_per_cycle() {
    let queries = MockQueries {
        timed_events: vec![
            timed_event_row("a", 5, NOW - 600, NOW + 2100, Some(150)),
            timed_event_row("b", 5, NOW - 300, NOW + 2400, Some(150)),
        ],
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context(queries);

    let output = get_at(&tc.ctx, &board(Phase::Active), now()).await.unwrap();
    assert_eq!(output.payload.description.matches("<:mon_150:1>").count(), 2);
    assert_eq!(tc.icons.created(), vec!["mon_150"]);
    assert_eq!(output.icons.len(), 1);
}
