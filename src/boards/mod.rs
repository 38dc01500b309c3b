//! Boards: the fetch, map, render cycle shared by every board kind.
//!
//! DESIGN
//! ======
//! A board kind is a [`BoardVariant`]: it fetches its raw records, maps them
//! into renderable objects (deriving event phase, resolving rewards,
//! materializing icons), and renders one object to a text fragment.
//! [`run_cycle`] drives any variant through the same stages and assembles
//! the payload. Variants are rebuilt for every cycle; only the board
//! configuration outlives one.
//!
//! ERROR HANDLING
//! ==============
//! A fetch failure fails the cycle and nothing is rendered. Map images and
//! icons are best-effort: their failures are logged and the payload is
//! built without them.

pub mod rare_spawn;
pub mod stat;
pub mod task;
pub mod templates;
pub mod timed_event;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::config::{BoardConfig, BoardKind};
use crate::context::BoardContext;
use crate::icons::IconRef;
use crate::maps::MapMarker;
use crate::payload::{BoardPayload, EmbedFooter, EmbedMedia};
use crate::query::QueryError;
use crate::services::render::{BodyOutcome, render_body};

use rare_spawn::RareSpawnBoard;
use stat::StatBoard;
use task::TaskBoard;
use timed_event::TimedEventBoard;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] QueryError),
}

/// Result of one completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardOutput {
    pub payload: BoardPayload,
    /// Icons materialized for this cycle, to release once superseded.
    pub icons: Vec<IconRef>,
    pub outcome: BodyOutcome,
}

/// The per-kind capabilities [`run_cycle`] is parameterized over.
#[async_trait::async_trait]
pub trait BoardVariant: Send + Sync {
    type Record: Send;
    type Object: Send + Sync;

    /// Read this board's raw records, scoped to its area.
    async fn fetch(&self, ctx: &BoardContext, board: &BoardConfig) -> Result<Vec<Self::Record>, QueryError>;

    /// Turn raw records into renderable objects, dropping any that do not belong.
    async fn map(&mut self, ctx: &BoardContext, records: Vec<Self::Record>, now: OffsetDateTime) -> Vec<Self::Object>;

    /// Template: one object as a text fragment.
    fn render(&self, ctx: &BoardContext, object: &Self::Object) -> String;

    /// Title used when the board configures none.
    fn default_title(&self, ctx: &BoardContext) -> String;

    /// Tileserver template name, or `None` for boards without a map.
    fn map_template(&self) -> Option<&'static str> {
        None
    }

    fn markers(&self, _objects: &[Self::Object]) -> Vec<MapMarker> {
        Vec::new()
    }

    fn thumbnail(&self) -> Option<String> {
        None
    }

    /// Hand over the icons materialized during `map`.
    fn take_icons(&mut self) -> Vec<IconRef> {
        Vec::new()
    }
}

// =============================================================================
// CYCLE
// =============================================================================

/// Run one board cycle at the current instant.
///
/// # Errors
///
/// Returns [`BoardError::Fetch`] if the board's records cannot be read.
pub async fn get(ctx: &BoardContext, board: &BoardConfig) -> Result<BoardOutput, BoardError> {
    get_at(ctx, board, OffsetDateTime::now_utc()).await
}

/// Run one board cycle, evaluating time-based state at `now`.
///
/// # Errors
///
/// Returns [`BoardError::Fetch`] if the board's records cannot be read.
pub async fn get_at(ctx: &BoardContext, board: &BoardConfig, now: OffsetDateTime) -> Result<BoardOutput, BoardError> {
    match &board.kind {
        BoardKind::Stats { extra } => run_cycle(&mut StatBoard::new(extra), ctx, board, now).await,
        BoardKind::RareSpawn => run_cycle(&mut RareSpawnBoard, ctx, board, now).await,
        BoardKind::TimedEvent { phase, levels } => {
            run_cycle(&mut TimedEventBoard::new(*phase, levels), ctx, board, now).await
        }
        BoardKind::Task { watchlist } => run_cycle(&mut TaskBoard::new(watchlist), ctx, board, now).await,
    }
}

/// Drive `variant` through fetch, map, and render, then assemble the payload.
///
/// # Errors
///
/// Returns [`BoardError::Fetch`] if the fetch stage fails.
pub async fn run_cycle<V: BoardVariant>(
    variant: &mut V,
    ctx: &BoardContext,
    board: &BoardConfig,
    now: OffsetDateTime,
) -> Result<BoardOutput, BoardError> {
    debug!(board = %board.name, area = %board.area.name, "fetching");
    let records = variant.fetch(ctx, board).await?;

    debug!(board = %board.name, count = records.len(), "mapping");
    let objects = variant.map(ctx, records, now).await;

    debug!(board = %board.name, count = objects.len(), "rendering");
    let empty_text = ctx.locale.get("empty_board");
    let body = render_body(&objects, |object| variant.render(ctx, object), &empty_text);

    let image = match body.outcome {
        BodyOutcome::Empty => None,
        BodyOutcome::Complete => render_map(variant, ctx, board, &objects).await,
        BodyOutcome::Truncated { omitted } => {
            debug!(board = %board.name, omitted, "body truncated at size limit");
            render_map(variant, ctx, board, &objects).await
        }
    };

    let payload = BoardPayload {
        title: board.title.clone().unwrap_or_else(|| variant.default_title(ctx)),
        description: body.text,
        timestamp: Some(now),
        footer: EmbedFooter { text: board.area.name.clone() },
        image: image.map(|url| EmbedMedia { url }),
        thumbnail: variant.thumbnail().map(|url| EmbedMedia { url }),
    };

    Ok(BoardOutput { payload, icons: variant.take_icons(), outcome: body.outcome })
}

async fn render_map<V: BoardVariant>(
    variant: &V,
    ctx: &BoardContext,
    board: &BoardConfig,
    objects: &[V::Object],
) -> Option<String> {
    let template = variant.map_template()?;
    let markers = variant.markers(objects);
    match ctx.maps.render(template, &markers).await {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, board = %board.name, "map render failed; publishing without image");
            None
        }
    }
}

/// Placeholder payload published before a board's first cycle.
#[must_use]
pub fn loading_payload(ctx: &BoardContext, board: &BoardConfig) -> BoardPayload {
    let (default_title, thumbnail) = match &board.kind {
        BoardKind::Stats { extra } => {
            let variant = StatBoard::new(extra);
            (variant.default_title(ctx), variant.thumbnail())
        }
        BoardKind::RareSpawn => (RareSpawnBoard.default_title(ctx), None),
        BoardKind::TimedEvent { phase, levels } => {
            let variant = TimedEventBoard::new(*phase, levels);
            (variant.default_title(ctx), variant.thumbnail())
        }
        BoardKind::Task { watchlist } => {
            let variant = TaskBoard::new(watchlist);
            (variant.default_title(ctx), variant.thumbnail())
        }
    };
    let title = board.title.clone().unwrap_or(default_title);
    let footer = ctx.locale.format("loading_board", &[("area", &board.area.name)]);
    BoardPayload::loading(title, footer, thumbnail)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
