use super::*;
use std::sync::Mutex;

use std::collections::{HashMap, VecDeque};

use crate::config::{BoardKind, Delivery};
use crate::context::test_helpers::{self, MockQueries, MockUploader, TestContext, timed_event_row};
use crate::icons::CachedIconStore;
use crate::model::{Area, Phase};
use crate::query::{BoardQueries, QueryError, RareSpawnRow, StatKind, TaskRow, TimedEventRow};

// =============================================================================
// MOCKS
// =============================================================================

/// Records `(message_id, title)` per delivery and answers with `msg-1`.
#[derive(Default)]
struct MockSink {
    fail: bool,
    deliveries: Mutex<Vec<(Option<String>, String)>>,
}

impl MockSink {
    fn deliveries(&self) -> Vec<(Option<String>, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PayloadSink for MockSink {
    async fn deliver(
        &self,
        _delivery: &Delivery,
        message_id: Option<&str>,
        payload: &BoardPayload,
    ) -> Result<String, SinkError> {
        self.deliveries
            .lock()
            .unwrap()
            .push((message_id.map(str::to_string), payload.title.clone()));
        if self.fail {
            return Err(SinkError::Response { status: 500, body: "down".into() });
        }
        Ok("msg-1".into())
    }
}

/// Never answers within a test's timeout.
struct StalledQueries;

#[async_trait::async_trait]
impl BoardQueries for StalledQueries {
    async fn fetch_rare_spawns(&self, _area: &Area) -> Result<Vec<RareSpawnRow>, QueryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    async fn fetch_timed_events(&self, _area: &Area, _levels: &[u8]) -> Result<Vec<TimedEventRow>, QueryError> {
        Ok(Vec::new())
    }

    async fn fetch_tasks(&self, _area: &Area) -> Result<Vec<TaskRow>, QueryError> {
        Ok(Vec::new())
    }

    async fn fetch_stat(&self, _stat: StatKind, _area: &Area) -> Result<i64, QueryError> {
        Ok(0)
    }
}

/// Serves one queued batch of timed events per fetch, then nothing.
struct CycleQueries {
    batches: Mutex<VecDeque<Vec<TimedEventRow>>>,
}

impl CycleQueries {
    fn new(batches: Vec<Vec<TimedEventRow>>) -> Self {
        Self { batches: Mutex::new(batches.into()) }
    }
}

#[async_trait::async_trait]
impl BoardQueries for CycleQueries {
    async fn fetch_rare_spawns(&self, _area: &Area) -> Result<Vec<RareSpawnRow>, QueryError> {
        Ok(Vec::new())
    }

    async fn fetch_timed_events(&self, _area: &Area, _levels: &[u8]) -> Result<Vec<TimedEventRow>, QueryError> {
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn fetch_tasks(&self, _area: &Area) -> Result<Vec<TaskRow>, QueryError> {
        Ok(Vec::new())
    }

    async fn fetch_stat(&self, _stat: StatKind, _area: &Area) -> Result<i64, QueryError> {
        Ok(0)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

const TIMEOUT: Duration = Duration::from_secs(5);

fn raid_context() -> TestContext {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let queries = MockQueries {
        timed_events: vec![timed_event_row("a", 5, now - 600, now + 2100, Some(150))],
        ..MockQueries::default()
    };
    test_helpers::test_context(queries)
}

fn raid_board(delivery: Option<Delivery>) -> BoardConfig {
    let mut board = test_helpers::test_board(BoardKind::TimedEvent { phase: Phase::Active, levels: vec![5] });
    board.delivery = delivery;
    board
}

fn webhook() -> Option<Delivery> {
    Some(Delivery { webhook_url: "https://hook.test/1/abc".into(), message_id: None })
}

// =============================================================================
// TESTS
// =============================================================================

#[tokio::test]
async fn first_delivery_creates_then_edits() {
    let tc = raid_context();
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink.clone(), raid_board(webhook()));

    runner.publish_loading().await;
    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::Delivered);
    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::Delivered);

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 3);
    assert_eq!(deliveries[0], (None, "Raids".to_string()));
    assert_eq!(deliveries[1].0.as_deref(), Some("msg-1"));
    assert_eq!(deliveries[2].0.as_deref(), Some("msg-1"));
    assert_eq!(runner.message_id(), Some("msg-1"));
}

#[tokio::test]
async fn configured_message_id_is_edited_in_place() {
    let tc = raid_context();
    let sink = Arc::new(MockSink::default());
    let delivery = Delivery { webhook_url: "https://hook.test/1/abc".into(), message_id: Some("existing".into()) };
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink.clone(), raid_board(Some(delivery)));

    runner.run_once(TIMEOUT).await;
    assert_eq!(sink.deliveries()[0].0.as_deref(), Some("existing"));
}

#[tokio::test]
async fn each_delivery_releases_the_previous_cycle_references() {
    let tc = raid_context();
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink, raid_board(webhook()));

    runner.run_once(TIMEOUT).await;
    assert!(tc.icons.deleted().is_empty());

    runner.run_once(TIMEOUT).await;
    assert_eq!(tc.icons.created(), vec!["mon_150", "mon_150"]);
    assert_eq!(tc.icons.deleted(), vec!["mon_150"]);
}

#[tokio::test]
async fn superseded_icons_are_deleted_once_after_next_delivery() {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let mut tc = test_helpers::test_context(MockQueries::default());
    tc.ctx.queries = Arc::new(CycleQueries::new(vec![vec![
        timed_event_row("a", 5, now - 600, now + 2100, Some(150)),
        timed_event_row("b", 5, now - 300, now + 2400, Some(150)),
    ]]));
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink, raid_board(webhook()));

    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::Delivered);
    assert_eq!(tc.icons.created(), vec!["mon_150"]);
    assert!(tc.icons.deleted().is_empty());

    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::Delivered);
    assert_eq!(tc.icons.deleted(), vec!["mon_150"]);

    runner.run_once(TIMEOUT).await;
    assert_eq!(tc.icons.deleted(), vec!["mon_150"]);
}

#[tokio::test]
async fn uploaded_icon_survives_while_still_shown() {
    let mut tc = raid_context();
    let uploader = Arc::new(MockUploader::default());
    tc.ctx.icons = Arc::new(CachedIconStore::new(HashMap::new(), Some(uploader.clone())));
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink, raid_board(webhook()));

    runner.run_once(TIMEOUT).await;
    runner.run_once(TIMEOUT).await;
    runner.run_once(TIMEOUT).await;
    assert_eq!(uploader.uploads().len(), 1);
    assert!(uploader.removed().is_empty());
}

#[tokio::test]
async fn fetch_failure_skips_delivery() {
    let tc = test_helpers::test_context(MockQueries { fail: true, ..MockQueries::default() });
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink.clone(), raid_board(webhook()));

    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::Failed);
    assert!(sink.deliveries().is_empty());
}

#[tokio::test]
async fn delivery_failure_releases_new_icons() {
    let tc = raid_context();
    let sink = Arc::new(MockSink { fail: true, ..MockSink::default() });
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink, raid_board(webhook()));

    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::DeliveryFailed);
    assert_eq!(tc.icons.deleted(), vec!["mon_150"]);
    assert!(runner.message_id().is_none());
}

#[tokio::test]
async fn board_without_delivery_only_renders() {
    let tc = raid_context();
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink.clone(), raid_board(None));

    assert_eq!(runner.run_once(TIMEOUT).await, CycleResult::Rendered);
    assert!(sink.deliveries().is_empty());
}

#[tokio::test]
async fn stalled_cycle_times_out() {
    let mut tc = test_helpers::test_context(MockQueries::default());
    tc.ctx.queries = Arc::new(StalledQueries);
    let sink = Arc::new(MockSink::default());
    let mut runner = BoardRunner::new(tc.ctx.clone(), sink.clone(), test_helpers::test_board(BoardKind::RareSpawn));

    assert_eq!(runner.run_once(Duration::from_millis(20)).await, CycleResult::TimedOut);
    assert!(sink.deliveries().is_empty());
}
