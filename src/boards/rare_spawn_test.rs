use super::*;
use crate::boards::get_at;
use crate::config::BoardKind;
use crate::context::test_helpers::{self, MockQueries};

fn row(creature_id: u32, moves: (Option<u32>, Option<u32>)) -> RareSpawnRow {
    RareSpawnRow { creature_id, move_1: moves.0, move_2: moves.1, form: 0, lat: 1.0, lon: 2.0 }
}

#[tokio::test]
async fn maps_rows_to_creatures_in_fetch_order() {
    let queries = MockQueries {
        rare_spawns: vec![row(149, (Some(1), Some(2))), row(25, (Some(3), None))],
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context(queries);
    let board = test_helpers::test_board(BoardKind::RareSpawn);

    let output = get_at(&tc.ctx, &board, OffsetDateTime::now_utc()).await.unwrap();
    assert_eq!(output.payload.description, "**#149** (#1 / #2)\n**#25**\n");
    assert_eq!(output.payload.title, "100% Spawns");
    assert_eq!(output.payload.image_url(), Some("https://maps.test/areaboard-rare-spawn.png"));
    assert_eq!(*tc.maps.calls.lock().unwrap(), vec![("areaboard-rare-spawn".to_string(), 2)]);
    assert!(output.icons.is_empty());
}

#[test]
fn creature_takes_configured_emote() {
    let mut tc = test_helpers::test_context(MockQueries::default());
    let mut emotes = (*tc.ctx.emotes).clone();
    emotes.insert("mon_149".into(), "<:dnite:149>".into());
    tc.ctx.emotes = std::sync::Arc::new(emotes);

    let creature = to_creature(&tc.ctx, row(149, (None, None)));
    assert_eq!(creature.emote.as_deref(), Some("<:dnite:149>"));
    assert_eq!(creature.icon_url, "https://icons.test/pokemon/149.png");
    assert_eq!((creature.lat, creature.lon), (Some(1.0), Some(2.0)));
}
