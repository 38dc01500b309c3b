//! Process settings from environment variables and board definitions from YAML.
//!
//! DESIGN
//! ======
//! Settings that vary per deployment come from the environment (with `.env`
//! support in `main`). Board layout (areas, emotes, and the boards
//! themselves) lives in a YAML file because it is structured and
//! per-board. Raw YAML shapes are resolved into immutable `BoardConfig`
//! values at startup so a render cycle never re-validates configuration.
//!
//! ERROR HANDLING
//! ==============
//! Every problem is reported at load time: an unknown scan schema, a board
//! pointing at an undefined area, a duplicated area, a degenerate fence, or
//! a misspelled key. Nothing here is retried.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::icons::IconRepo;
use crate::locale::{Locale, LocaleError};
use crate::model::{Area, Phase, WatchEntry, WatchKind, Watchlist};
use crate::query::StatKind;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BOARDS_FILE: &str = "config/boards.yaml";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ICON_REPO_URL: &str = "https://raw.githubusercontent.com/WatWowMap/wwm-uicons/main";
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingEnv(&'static str),
    #[error("unsupported scan schema '{0}' (expected 'rdm' or 'mad')")]
    UnsupportedSchema(String),
    #[error("failed to read boards file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid boards file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("board {board} references unknown area '{area}'")]
    UnknownArea { board: String, area: String },
    #[error("area '{0}' needs at least 3 fence points")]
    InvalidFence(String),
    #[error("area '{0}' is defined more than once")]
    DuplicateArea(String),
    #[error("locale: {0}")]
    Locale(#[from] LocaleError),
}

// =============================================================================
// SCAN SCHEMA
// =============================================================================

/// Which scanner database layout the datastore uses. Selects both the SQL
/// text and the shape of the quest reward payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSchema {
    /// Shape A: `payload[0].info.{pokemon_id,item_id}`.
    Rdm,
    /// Shape B: `payload[0].item.item` and `payload[0].pokemon_encounter.pokemon_id`.
    Mad,
}

impl ScanSchema {
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedSchema`] for anything but `rdm` or `mad`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rdm" => Ok(Self::Rdm),
            "mad" => Ok(Self::Mad),
            other => Err(ConfigError::UnsupportedSchema(other.to_string())),
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub scan_schema: ScanSchema,
    pub boards_file: PathBuf,
    pub locale_file: Option<PathBuf>,
    pub refresh_interval_secs: u64,
    pub cycle_timeout_secs: u64,
    pub icon_repo_url: String,
    pub tileserver_url: Option<String>,
    pub utc_offset_hours: i8,
    pub emoji_upload: Option<EmojiUploadConfig>,
}

/// Where icons without a pre-configured emote get uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiUploadConfig {
    pub api_url: String,
    pub guild_id: String,
    pub bot_token: String,
}

impl AppConfig {
    /// Build typed settings from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `SCAN_SCHEMA`: `rdm` (default) or `mad`
    /// - `BOARDS_FILE`: default `config/boards.yaml`
    /// - `LOCALE_FILE`: JSON string table layered over English
    /// - `REFRESH_INTERVAL_SECS`: default 60
    /// - `CYCLE_TIMEOUT_SECS`: default 30
    /// - `ICON_REPO_URL`: UICONS-style icon repository
    /// - `TILESERVER_URL`: tileserver-cache base URL; maps disabled when unset
    /// - `UTC_OFFSET_HOURS`: display offset for event times, default 0
    /// - `EMOJI_GUILD_ID` + `DISCORD_BOT_TOKEN`: enable emoji uploads; both or neither
    /// - `DISCORD_API_URL`: default `https://discord.com/api/v10`
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing, the schema is unknown, or
    /// only half of the emoji upload settings are present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;
        let scan_schema = ScanSchema::parse(&std::env::var("SCAN_SCHEMA").unwrap_or_else(|_| "rdm".into()))?;
        let boards_file = std::env::var("BOARDS_FILE").unwrap_or_else(|_| DEFAULT_BOARDS_FILE.into());
        let icon_repo_url = std::env::var("ICON_REPO_URL")
            .unwrap_or_else(|_| DEFAULT_ICON_REPO_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let tileserver_url = env_nonempty("TILESERVER_URL").map(|url| url.trim_end_matches('/').to_string());
        let emoji_upload = match (env_nonempty("EMOJI_GUILD_ID"), env_nonempty("DISCORD_BOT_TOKEN")) {
            (Some(guild_id), Some(bot_token)) => Some(EmojiUploadConfig {
                api_url: env_nonempty("DISCORD_API_URL")
                    .unwrap_or_else(|| DEFAULT_DISCORD_API_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                guild_id,
                bot_token,
            }),
            (Some(_), None) => return Err(ConfigError::MissingEnv("DISCORD_BOT_TOKEN")),
            (None, Some(_)) => return Err(ConfigError::MissingEnv("EMOJI_GUILD_ID")),
            (None, None) => None,
        };

        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            scan_schema,
            boards_file: PathBuf::from(boards_file),
            locale_file: env_nonempty("LOCALE_FILE").map(PathBuf::from),
            refresh_interval_secs: env_parse("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS),
            cycle_timeout_secs: env_parse("CYCLE_TIMEOUT_SECS", DEFAULT_CYCLE_TIMEOUT_SECS),
            icon_repo_url,
            tileserver_url,
            utc_offset_hours: env_parse("UTC_OFFSET_HOURS", 0),
            emoji_upload,
        })
    }

    /// Load the configured locale, or the built-in English table.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured locale file is unreadable or invalid.
    pub fn load_locale(&self) -> Result<Locale, ConfigError> {
        match &self.locale_file {
            Some(path) => Ok(Locale::from_file(path)?),
            None => Ok(Locale::builtin()),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// =============================================================================
// BOARD DEFINITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Delivery {
    pub webhook_url: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Resolved, immutable definition of one board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// Stable label for logs, e.g. `task-2`.
    pub name: String,
    pub area: Area,
    pub title: Option<String>,
    pub delivery: Option<Delivery>,
    pub kind: BoardKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardKind {
    Stats { extra: Vec<StatKind> },
    RareSpawn,
    TimedEvent { phase: Phase, levels: Vec<u8> },
    Task { watchlist: Watchlist },
}

impl BoardKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stats { .. } => "stats",
            Self::RareSpawn => "rare_spawn",
            Self::TimedEvent { phase: Phase::Pending, .. } => "egg",
            Self::TimedEvent { phase: Phase::Active, .. } => "raid",
            Self::Task { .. } => "task",
        }
    }
}

/// Everything loaded from the boards file.
#[derive(Debug, Clone, Default)]
pub struct BoardSet {
    pub boards: Vec<BoardConfig>,
    /// Pre-uploaded emote markup keyed by name (`gym_white`, `raid_egg_5`, ...).
    pub emotes: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBoardsFile {
    #[serde(default)]
    areas: Vec<Area>,
    #[serde(default)]
    emotes: HashMap<String, String>,
    #[serde(default)]
    boards: Vec<RawBoard>,
}

/// One board entry. Every kind repeats the shared keys so unknown keys can
/// be rejected per kind.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
enum RawBoard {
    Stats {
        area: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        delivery: Option<Delivery>,
        #[serde(default)]
        stats: Vec<StatKind>,
    },
    RareSpawn {
        area: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        delivery: Option<Delivery>,
    },
    TimedEvent {
        area: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        delivery: Option<Delivery>,
        phase: Phase,
        #[serde(default = "default_levels")]
        levels: Vec<u8>,
    },
    Task {
        area: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        delivery: Option<Delivery>,
        #[serde(default)]
        items: Vec<u32>,
        #[serde(default)]
        creatures: Vec<u32>,
    },
}

/// Shared keys of a board entry, split from its kind.
struct RawTarget {
    area: String,
    title: Option<String>,
    delivery: Option<Delivery>,
}

fn default_levels() -> Vec<u8> {
    vec![1, 2, 3, 4, 5, 6]
}

/// Read and resolve the boards file.
///
/// # Errors
///
/// Returns an error if the file is unreadable or fails [`parse_boards`].
pub fn load_boards(path: &Path, locale: &Locale, icons: &IconRepo) -> Result<BoardSet, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    parse_boards(&raw, locale, icons)
}

/// Parse board definitions and resolve area references and watch-lists.
///
/// # Errors
///
/// Returns an error on invalid YAML (including unknown keys), an unknown or
/// duplicated area, or a fence with fewer than three points.
pub fn parse_boards(raw: &str, locale: &Locale, icons: &IconRepo) -> Result<BoardSet, ConfigError> {
    let file: RawBoardsFile = serde_yaml::from_str(raw)?;

    let mut areas = HashMap::new();
    for area in file.areas {
        if area.fence.len() < 3 {
            return Err(ConfigError::InvalidFence(area.name));
        }
        if areas.contains_key(&area.name) {
            return Err(ConfigError::DuplicateArea(area.name));
        }
        areas.insert(area.name.clone(), area);
    }

    let mut boards = Vec::with_capacity(file.boards.len());
    for (index, raw_board) in file.boards.into_iter().enumerate() {
        let (target, kind) = resolve_board(raw_board, locale, icons);
        let name = format!("{}-{index}", kind.label());
        let area = areas
            .get(&target.area)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownArea { board: name.clone(), area: target.area.clone() })?;
        boards.push(BoardConfig { name, area, title: target.title, delivery: target.delivery, kind });
    }

    Ok(BoardSet { boards, emotes: file.emotes })
}

fn resolve_board(raw: RawBoard, locale: &Locale, icons: &IconRepo) -> (RawTarget, BoardKind) {
    match raw {
        RawBoard::Stats { area, title, delivery, stats } => {
            (RawTarget { area, title, delivery }, BoardKind::Stats { extra: stats })
        }
        RawBoard::RareSpawn { area, title, delivery } => (RawTarget { area, title, delivery }, BoardKind::RareSpawn),
        RawBoard::TimedEvent { area, title, delivery, phase, levels } => {
            (RawTarget { area, title, delivery }, BoardKind::TimedEvent { phase, levels })
        }
        RawBoard::Task { area, title, delivery, items, creatures } => {
            let watchlist = resolve_watchlist(items, creatures, locale, icons);
            (RawTarget { area, title, delivery }, BoardKind::Task { watchlist })
        }
    }
}

fn resolve_watchlist(items: Vec<u32>, creatures: Vec<u32>, locale: &Locale, icons: &IconRepo) -> Watchlist {
    let items = items
        .into_iter()
        .map(|id| WatchEntry { kind: WatchKind::Item, id, name: locale.item_name(id), icon_url: icons.item(id) })
        .collect();
    let creatures = creatures
        .into_iter()
        .map(|id| WatchEntry {
            kind: WatchKind::Creature,
            id,
            name: locale.creature_name(id),
            icon_url: icons.creature(id, 0),
        })
        .collect();
    Watchlist { items, creatures }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
