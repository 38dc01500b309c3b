//! Localized string table.
//!
//! Built-in English strings, optionally overridden key-by-key from a JSON
//! object file. Placeholders use `{name}` syntax. Missing keys render as the
//! key itself so a gap in a translation file is visible but never fatal.

use std::collections::HashMap;
use std::path::Path;

const DEFAULT_STRINGS: &[(&str, &str)] = &[
    ("empty_board", "Nothing to see here right now"),
    ("loading_board", "Loading {area}..."),
    ("stats", "Stats"),
    ("rare_spawns", "100% Spawns"),
    ("raids", "Raids"),
    ("eggs", "Eggs"),
    ("quests", "Quests"),
    ("level_egg", "Level {level} Egg"),
    ("raid_until", "until {time}"),
    ("egg_hatches", "hatches at {time}"),
    ("total_gyms", "Gyms: **{x}**"),
    ("active_raids", "Active Raids: **{x}**"),
    ("active_eggs", "Active Eggs: **{x}**"),
    ("eggs_count", "Eggs: **{x}**"),
    ("total_stops", "Pokestops: **{x}**"),
    ("active_quests", "Quests: **{x}**"),
    ("active_mons", "Active Pokemon: **{x}**"),
    ("active_hundos", "Active 100%: **{x}**"),
];

#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    #[error("failed to read locale file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid locale file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Locale {
    strings: HashMap<String, String>,
}

impl Locale {
    /// English defaults only.
    #[must_use]
    pub fn builtin() -> Self {
        let strings = DEFAULT_STRINGS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Self { strings }
    }

    /// Load a JSON string table and layer it over the built-in strings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a flat JSON
    /// object of strings.
    pub fn from_file(path: &Path) -> Result<Self, LocaleError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// # Errors
    ///
    /// Returns an error if `raw` is not a flat JSON object of strings.
    pub fn from_json(raw: &str) -> Result<Self, LocaleError> {
        let overrides: HashMap<String, String> = serde_json::from_str(raw)?;
        let mut locale = Self::builtin();
        locale.strings.extend(overrides);
        Ok(locale)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> String {
        self.strings.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    /// Look up `key` and substitute each `{name}` placeholder from `params`.
    #[must_use]
    pub fn format(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut out = self.get(key);
        for (name, value) in params {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }

    #[must_use]
    pub fn creature_name(&self, id: u32) -> String {
        self.lookup_or_id("mon", id)
    }

    #[must_use]
    pub fn item_name(&self, id: u32) -> String {
        self.lookup_or_id("item", id)
    }

    #[must_use]
    pub fn move_name(&self, id: u32) -> String {
        self.lookup_or_id("move", id)
    }

    fn lookup_or_id(&self, prefix: &str, id: u32) -> String {
        self.strings
            .get(&format!("{prefix}_{id}"))
            .cloned()
            .unwrap_or_else(|| format!("#{id}"))
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "locale_test.rs"]
mod tests;
