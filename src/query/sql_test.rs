use super::*;

const ALL_STATS: [StatKind; 7] = [
    StatKind::GymAmount,
    StatKind::RaidActive,
    StatKind::EggActive,
    StatKind::TotalStops,
    StatKind::ActiveQuests,
    StatKind::ActiveMons,
    StatKind::ActiveHundos,
];

fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

#[test]
fn every_fixed_statement_binds_only_the_fence() {
    for schema in [ScanSchema::Rdm, ScanSchema::Mad] {
        let sql = schema_sql(schema);
        assert_eq!(placeholders(sql.rare_spawns), 1);
        assert_eq!(placeholders(sql.tasks), 1);
        for stat in ALL_STATS {
            let text = stat_sql(schema, stat);
            assert_eq!(placeholders(text), 1, "{schema:?} {stat:?}");
            assert!(text.starts_with("SELECT COUNT(*)"));
        }
    }
}

#[test]
fn timed_event_fragments_leave_binds_to_the_builder() {
    for schema in [ScanSchema::Rdm, ScanSchema::Mad] {
        let sql = schema_sql(schema);
        assert_eq!(placeholders(sql.timed_events_head), 0);
        assert_eq!(placeholders(sql.timed_events_levels), 0);
        assert_eq!(placeholders(sql.timed_events_tail), 0);
        assert!(sql.timed_events_head.ends_with("ST_GEOMFROMTEXT("));
        assert!(sql.timed_events_levels.ends_with("IN ("));
    }
}

#[test]
fn schema_selects_scanner_tables() {
    assert!(schema_sql(ScanSchema::Rdm).tasks.contains("quest_rewards"));
    assert!(schema_sql(ScanSchema::Mad).tasks.contains("trs_quest"));
    assert!(schema_sql(ScanSchema::Rdm).timed_events_head.contains("FROM gym"));
    assert!(schema_sql(ScanSchema::Mad).timed_events_head.contains("JOIN raid"));
}

#[test]
fn assembled_timed_event_query_has_one_bind_per_level() {
    let sql = schema_sql(ScanSchema::Rdm);
    let mut builder = QueryBuilder::<MySql>::new(sql.timed_events_head);
    builder.push_bind("POLYGON((0 0,0 1,1 1,0 0))");
    builder.push(sql.timed_events_levels);
    {
        let mut separated = builder.separated(", ");
        for level in [1_i64, 3, 5] {
            separated.push_bind(level);
        }
    }
    builder.push(sql.timed_events_tail);

    let text = builder.sql();
    assert_eq!(placeholders(text), 4);
    assert!(text.contains("raid_level IN (?, ?, ?)"));
}

#[test]
fn negative_ids_collapse_to_zero() {
    assert_eq!(to_u32(-1), 0);
    assert_eq!(to_u32(150), 150);
}
