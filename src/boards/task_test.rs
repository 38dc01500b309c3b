use super::*;
use crate::boards::get_at;
use crate::config::BoardKind;
use crate::context::test_helpers::{self, MockQueries, rdm_task_row};
use crate::icons::teardown;
use crate::model::{WatchEntry, WatchKind};

fn entry(kind: WatchKind, id: u32, name: &str) -> WatchEntry {
    WatchEntry { kind, id, name: name.into(), icon_url: format!("https://icons.test/{id}.png") }
}

fn watchlist() -> Watchlist {
    Watchlist {
        items: vec![entry(WatchKind::Item, 1301, "Rare Candy")],
        creatures: vec![entry(WatchKind::Creature, 25, "Pikachu"), entry(WatchKind::Creature, 1301, "Decoy")],
    }
}

fn board(watchlist: Watchlist) -> BoardConfig {
    test_helpers::test_board(BoardKind::Task { watchlist })
}

#[tokio::test]
async fn shared_entry_materializes_and_tears_down_once() {
    let queries = MockQueries {
        tasks: vec![rdm_task_row("s1", Some(1301), None), rdm_task_row("s2", Some(1301), None)],
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context(queries);

    let output = get_at(&tc.ctx, &board(watchlist()), OffsetDateTime::now_utc()).await.unwrap();
    assert_eq!(output.payload.description.lines().count(), 2);
    assert_eq!(tc.icons.created(), vec!["item_1301"]);
    assert_eq!(output.icons.len(), 1);

    teardown(tc.icons.as_ref(), &output.icons).await;
    assert_eq!(tc.icons.deleted(), vec!["item_1301"]);
}

#[tokio::test]
async fn unresolved_and_malformed_tasks_are_dropped() {
    let mut malformed = rdm_task_row("s3", None, None);
    malformed.reward_json = "{not json".into();
    let queries = MockQueries {
        tasks: vec![rdm_task_row("s1", Some(4), None), malformed, rdm_task_row("s2", None, Some(25))],
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context(queries);

    let output = get_at(&tc.ctx, &board(watchlist()), OffsetDateTime::now_utc()).await.unwrap();
    assert_eq!(
        output.payload.description,
        "<:mon_25:1> **Pikachu** [Stop s2](https://maps.google.com/?q=0.25,0.75): Catch 5 Pokemon\n"
    );
    assert_eq!(tc.icons.created(), vec!["mon_25"]);
}

#[tokio::test]
async fn item_list_wins_over_creature_list() {
    let tc = test_helpers::test_context(MockQueries::default());
    let rows = vec![rdm_task_row("s1", Some(1301), Some(1301))];

    let wl = watchlist();
    let mut variant = TaskBoard::new(&wl);
    let rewards = variant.map(&tc.ctx, rows, OffsetDateTime::now_utc()).await;
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].entry.kind, WatchKind::Item);
    assert_eq!(rewards[0].entry.name, "Rare Candy");
    assert_eq!(rewards[0].task_text, "Catch 5 Pokemon");
}

#[tokio::test]
async fn single_entry_board_is_titled_after_it() {
    let single = Watchlist { items: Vec::new(), creatures: vec![entry(WatchKind::Creature, 25, "Pikachu")] };
    let tc = test_helpers::test_context(MockQueries::default());

    let output = get_at(&tc.ctx, &board(single), OffsetDateTime::now_utc()).await.unwrap();
    assert_eq!(output.payload.title, "Pikachu Quests");
    assert_eq!(output.payload.thumbnail.map(|t| t.url).as_deref(), Some("https://icons.test/25.png"));
    assert_eq!(output.payload.description, "Nothing to see here right now");

    let output = get_at(&tc.ctx, &board(watchlist()), OffsetDateTime::now_utc()).await.unwrap();
    assert_eq!(output.payload.title, "Quests");
    assert!(output.payload.thumbnail.is_none());
}
