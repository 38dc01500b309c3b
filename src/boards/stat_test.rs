use super::*;
use crate::boards::get_at;
use crate::config::BoardKind;
use crate::context::test_helpers::{self, MockQueries};

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
}

#[test]
fn active_and_pending_counts_share_one_line() {
    let tc = test_helpers::test_context(MockQueries::default());
    let lines = build_lines(
        &tc.ctx,
        &[(StatKind::GymAmount, 4), (StatKind::RaidActive, 3), (StatKind::EggActive, 5)],
    );

    let texts: Vec<&str> = lines.iter().map(|line| line.text.as_str()).collect();
    assert_eq!(texts, vec!["<:gym:10> Gyms: **4**", "<:raid:11> Active Raids: **3** | Eggs: **5**"]);
    assert!(!texts.iter().any(|text| text.contains("Active Eggs")));
}

#[test]
fn pending_count_alone_keeps_its_line() {
    let tc = test_helpers::test_context(MockQueries::default());
    let lines = build_lines(&tc.ctx, &[(StatKind::EggActive, 5)]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "<:raid:11> Active Eggs: **5**");
}

#[test]
fn lines_are_grouped_with_breaks() {
    let tc = test_helpers::test_context(MockQueries::default());
    let lines = build_lines(
        &tc.ctx,
        &[(StatKind::GymAmount, 4), (StatKind::TotalStops, 9), (StatKind::ActiveMons, 120)],
    );

    let groups: Vec<StatGroup> = lines.iter().map(|line| line.group).collect();
    assert_eq!(groups, vec![StatGroup::Creature, StatGroup::Venue, StatGroup::Location]);
    let breaks: Vec<bool> = lines.iter().map(|line| line.starts_group).collect();
    assert_eq!(breaks, vec![false, true, true]);
    assert_eq!(lines[0].text, "Active Pokemon: **120**");
}

#[test]
fn requested_stats_skip_duplicate_extras() {
    let extra = [StatKind::RaidActive, StatKind::ActiveQuests];
    let board = StatBoard::new(&extra);
    assert_eq!(
        board.requested(),
        vec![StatKind::GymAmount, StatKind::RaidActive, StatKind::EggActive, StatKind::ActiveQuests]
    );
}

#[tokio::test]
async fn stat_board_renders_merged_block() {
    let queries = MockQueries {
        stats: HashMap::from([(StatKind::GymAmount, 4), (StatKind::RaidActive, 3), (StatKind::EggActive, 5)]),
        ..MockQueries::default()
    };
    let tc = test_helpers::test_context(queries);
    let board = test_helpers::test_board(BoardKind::Stats { extra: Vec::new() });

    let output = get_at(&tc.ctx, &board, now()).await.unwrap();
    assert_eq!(
        output.payload.description,
        "<:gym:10> Gyms: **4**\n<:raid:11> Active Raids: **3** | Eggs: **5**\n"
    );
    assert_eq!(output.payload.title, "Stats");
    assert!(output.payload.image.is_none());
    assert!(tc.maps.calls.lock().unwrap().is_empty());
    assert_eq!(tc.queries.calls().len(), 3);
}
