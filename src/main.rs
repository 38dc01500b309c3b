mod boards;
mod config;
mod context;
mod db;
mod emoji;
mod icons;
mod locale;
mod maps;
mod model;
mod payload;
mod query;
mod services;
mod sink;

use std::sync::Arc;
use std::time::Duration;

use time::UtcOffset;

use crate::config::{AppConfig, load_boards};
use crate::context::BoardContext;
use crate::emoji::DiscordEmojiUploader;
use crate::icons::{CachedIconStore, IconRepo, IconUploader};
use crate::maps::{MapRenderer, NoMaps, TileserverMaps};
use crate::query::SqlQueries;
use crate::services::scheduler::{self, SchedulerConfig};
use crate::sink::{PayloadSink, WebhookSink};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let locale = config.load_locale().expect("locale load failed");
    let icon_repo = IconRepo::new(config.icon_repo_url.clone());
    let board_set = load_boards(&config.boards_file, &locale, &icon_repo).expect("boards file invalid");

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    // Maps are optional: boards publish without images if no tileserver is set.
    let maps: Arc<dyn MapRenderer> = match &config.tileserver_url {
        Some(url) => match TileserverMaps::new(url.clone()) {
            Ok(maps) => {
                tracing::info!(tileserver = %url, "static maps enabled");
                Arc::new(maps)
            }
            Err(e) => {
                tracing::warn!(error = %e, "tileserver client failed; maps disabled");
                Arc::new(NoMaps)
            }
        },
        None => Arc::new(NoMaps),
    };

    // Without an upload target only pre-configured emotes render as icons.
    let uploader: Option<Arc<dyn IconUploader>> = match &config.emoji_upload {
        Some(upload) => {
            let uploader =
                DiscordEmojiUploader::new(upload.api_url.clone(), upload.guild_id.clone(), upload.bot_token.clone())
                    .expect("emoji client build failed");
            tracing::info!(guild = %upload.guild_id, "emoji uploads enabled");
            Some(Arc::new(uploader))
        }
        None => None,
    };

    let display_offset = UtcOffset::from_hms(config.utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    let ctx = BoardContext {
        queries: Arc::new(SqlQueries::new(pool, config.scan_schema)),
        icons: Arc::new(CachedIconStore::new(board_set.emotes.clone(), uploader)),
        maps,
        locale: Arc::new(locale),
        emotes: Arc::new(board_set.emotes),
        icon_repo,
        scan_schema: config.scan_schema,
        display_offset,
    };
    let sink: Arc<dyn PayloadSink> = Arc::new(WebhookSink::new().expect("webhook client build failed"));

    let scheduler_config = SchedulerConfig {
        refresh_interval: Duration::from_secs(config.refresh_interval_secs.max(1)),
        cycle_timeout: Duration::from_secs(config.cycle_timeout_secs.max(1)),
    };

    let tasks: Vec<_> = board_set
        .boards
        .into_iter()
        .map(|board| {
            tracing::info!(board = %board.name, area = %board.area.name, "starting board");
            scheduler::spawn_board_task(ctx.clone(), sink.clone(), board, scheduler_config)
        })
        .collect();

    tracing::info!(boards = tasks.len(), schema = ?config.scan_schema, "areaboard running");
    futures::future::join_all(tasks).await;
}
