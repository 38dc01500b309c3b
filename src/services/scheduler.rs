//! Scheduler: one background task per board, refreshing on an interval.
//!
//! DESIGN
//! ======
//! Each board gets its own tokio task and its own [`BoardRunner`], so boards
//! never share mutable state and a slow board never delays another. A task
//! publishes the loading placeholder once, then runs one cycle per tick.
//! Every cycle is bounded by a deadline; a cycle that misses it is
//! abandoned and the previous payload stays up.
//!
//! Icons are released one cycle late: after the new payload is delivered,
//! every reference the previous cycle took is handed back. Keys the new
//! cycle still shows survive because it materialized its own reference
//! first; the store drops an icon only when nobody holds it. If delivery
//! fails, the new cycle's references go instead and the previous payload
//! keeps its own.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::boards;
use crate::config::BoardConfig;
use crate::context::BoardContext;
use crate::icons::{IconRef, teardown};
use crate::payload::BoardPayload;
use crate::sink::{PayloadSink, SinkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub refresh_interval: Duration,
    pub cycle_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    Delivered,
    /// Rendered for a board with no delivery target.
    Rendered,
    Failed,
    TimedOut,
    DeliveryFailed,
}

/// Spawn the refresh loop for one board. Returns a handle for shutdown.
pub fn spawn_board_task(
    ctx: BoardContext,
    sink: Arc<dyn PayloadSink>,
    board: BoardConfig,
    config: SchedulerConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut runner = BoardRunner::new(ctx, sink, board);
        runner.publish_loading().await;

        let mut interval = tokio::time::interval(config.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            runner.run_once(config.cycle_timeout).await;
        }
    })
}

/// Per-board state carried between cycles.
pub struct BoardRunner {
    ctx: BoardContext,
    sink: Arc<dyn PayloadSink>,
    board: BoardConfig,
    message_id: Option<String>,
    previous_icons: Vec<IconRef>,
}

impl BoardRunner {
    #[must_use]
    pub fn new(ctx: BoardContext, sink: Arc<dyn PayloadSink>, board: BoardConfig) -> Self {
        let message_id = board.delivery.as_ref().and_then(|d| d.message_id.clone());
        Self { ctx, sink, board, message_id, previous_icons: Vec::new() }
    }

    #[cfg(test)]
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub async fn publish_loading(&mut self) {
        let payload = boards::loading_payload(&self.ctx, &self.board);
        if let Err(e) = self.publish(&payload).await {
            warn!(error = %e, board = %self.board.name, "loading placeholder not delivered");
        }
    }

    /// Run one cycle under `timeout` and deliver its payload.
    pub async fn run_once(&mut self, timeout: Duration) -> CycleResult {
        let output = match tokio::time::timeout(timeout, boards::get(&self.ctx, &self.board)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(error = %e, board = %self.board.name, "board cycle failed; keeping previous payload");
                return CycleResult::Failed;
            }
            Err(_) => {
                warn!(board = %self.board.name, timeout_secs = timeout.as_secs(), "board cycle timed out");
                return CycleResult::TimedOut;
            }
        };

        debug!(board = %self.board.name, outcome = ?output.outcome, icons = output.icons.len(), "cycle rendered");
        let delivered = self.publish(&output.payload).await;
        match delivered {
            Ok(has_target) => {
                let previous = std::mem::replace(&mut self.previous_icons, output.icons);
                let released = teardown(self.ctx.icons.as_ref(), &previous).await;
                debug!(board = %self.board.name, released, "released previous icons");
                if has_target { CycleResult::Delivered } else { CycleResult::Rendered }
            }
            Err(e) => {
                error!(error = %e, board = %self.board.name, "board delivery failed");
                teardown(self.ctx.icons.as_ref(), &output.icons).await;
                CycleResult::DeliveryFailed
            }
        }
    }

    /// Deliver `payload`, creating the board's message on first use.
    /// Returns `false` when the board has no delivery target.
    async fn publish(&mut self, payload: &BoardPayload) -> Result<bool, SinkError> {
        let Some(delivery) = &self.board.delivery else {
            info!(board = %self.board.name, title = %payload.title, "no delivery configured; rendered only");
            return Ok(false);
        };
        let id = self.sink.deliver(delivery, self.message_id.as_deref(), payload).await?;
        if self.message_id.as_deref() != Some(id.as_str()) {
            info!(board = %self.board.name, message_id = %id, "board message created");
        }
        self.message_id = Some(id);
        Ok(true)
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
