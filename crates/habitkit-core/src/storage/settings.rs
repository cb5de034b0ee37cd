//! Persisted user settings record.

use serde::{Deserialize, Deserializer, Serialize};

use super::KvStore;
use crate::clock::{clamp_rollover_hour, DEFAULT_ROLLOVER_HOUR};
use crate::error::Result;
use crate::ordering::{FilterMode, SortMode};

/// Storage key of the settings record.
pub const SETTINGS_KEY: &str = "habits.settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hour at which a new logical day begins.
    #[serde(deserialize_with = "lenient_rollover")]
    pub rollover_hour: u32,
    pub sort: SortMode,
    pub filter: FilterMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
            sort: SortMode::default(),
            filter: FilterMode::default(),
        }
    }
}

impl Settings {
    /// Load from the store. Absent or malformed records yield defaults.
    pub fn load(store: &impl KvStore) -> Self {
        let raw = match store.read(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read settings, using defaults");
                return Self::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "malformed settings record, using defaults");
            Self::default()
        })
    }

    /// Persist to the store.
    ///
    /// # Errors
    /// Returns an error if the store write fails.
    pub fn save(&self, store: &impl KvStore) -> Result<()> {
        store.write(SETTINGS_KEY, &serde_json::to_string(self)?)
    }
}

fn lenient_rollover<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    let hour = match &raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(hour.map_or(DEFAULT_ROLLOVER_HOUR, clamp_rollover_hour))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn absent_record_gives_defaults() {
        let settings = Settings::load(&MemoryStore::new());
        assert_eq!(settings.rollover_hour, 4);
        assert_eq!(settings.sort, SortMode::Streak);
        assert_eq!(settings.filter, FilterMode::All);
    }

    #[test]
    fn malformed_record_gives_defaults() {
        let store = MemoryStore::with_entry(SETTINGS_KEY, "{not json");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn partial_record_fills_missing_fields() {
        let store = MemoryStore::with_entry(SETTINGS_KEY, r#"{"rollover_hour": 2}"#);
        let settings = Settings::load(&store);
        assert_eq!(settings.rollover_hour, 2);
        assert_eq!(settings.sort, SortMode::Streak);
    }

    #[test]
    fn rollover_is_clamped_on_load() {
        let store = MemoryStore::with_entry(SETTINGS_KEY, r#"{"rollover_hour": 30}"#);
        assert_eq!(Settings::load(&store).rollover_hour, 23);
        let store = MemoryStore::with_entry(SETTINGS_KEY, r#"{"rollover_hour": "6"}"#);
        assert_eq!(Settings::load(&store).rollover_hour, 6);
        let store = MemoryStore::with_entry(SETTINGS_KEY, r#"{"rollover_hour": null}"#);
        assert_eq!(Settings::load(&store).rollover_hour, 4);
    }

    #[test]
    fn save_then_load() {
        let store = MemoryStore::new();
        let settings = Settings {
            rollover_hour: 0,
            sort: SortMode::Name,
            filter: FilterMode::Open,
        };
        settings.save(&store).unwrap();
        assert_eq!(Settings::load(&store), settings);
    }
}
