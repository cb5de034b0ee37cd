//! JSON codecs for the habit collection and the undo slot.
//!
//! Reads never fail. A payload that is not an array is an empty collection
//! (or no undo snapshot). Inside an array each record decodes on its own, so a
//! bad record is dropped without taking its neighbours with it.

use super::KvStore;
use crate::error::Result;
use crate::habit::Habit;

/// Storage key of the habit collection.
pub const HABITS_KEY: &str = "habits.v1";

/// Storage key of the single undo snapshot.
pub const UNDO_KEY: &str = "habits.undo";

/// Load the whole collection, keeping every readable record.
pub fn load_habits(store: &impl KvStore) -> Vec<Habit> {
    decode(store, HABITS_KEY)
        .map(|(habits, _)| habits)
        .unwrap_or_default()
}

/// Load the undo snapshot, if one is stored and every record is readable.
///
/// Restoring a partial snapshot would silently delete habits, so a snapshot
/// with dropped records counts as none.
pub fn load_undo(store: &impl KvStore) -> Option<Vec<Habit>> {
    match decode(store, UNDO_KEY)? {
        (habits, 0) => Some(habits),
        (_, dropped) => {
            tracing::warn!(dropped, "undo snapshot discarded");
            None
        }
    }
}

/// Serialize a collection to its stored form.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode<'a, I>(habits: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let list: Vec<&Habit> = habits.into_iter().collect();
    Ok(serde_json::to_string(&list)?)
}

/// Decoded records plus the number dropped.
fn decode(store: &impl KvStore, key: &str) -> Option<(Vec<Habit>, usize)> {
    let raw = match store.read(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, error = %e, "could not read stored habits");
            return None;
        }
    };
    let records = match serde_json::from_str::<Option<Vec<serde_json::Value>>>(&raw) {
        Ok(records) => records?,
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed habit payload ignored");
            return None;
        }
    };

    let stored = records.len();
    let habits: Vec<Habit> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| decode_record(key, index, record))
        .collect();
    let dropped = stored - habits.len();
    if dropped > 0 {
        tracing::warn!(key, stored, dropped, "dropped unreadable habit records");
    }
    Some((habits, dropped))
}

fn decode_record(key: &str, index: usize, record: serde_json::Value) -> Option<Habit> {
    match serde_json::from_value::<Habit>(record) {
        Ok(habit) if habit.name.trim().is_empty() => {
            tracing::warn!(key, index, id = %habit.id, "dropped habit with blank name");
            None
        }
        Ok(habit) => Some(habit),
        Err(e) => {
            tracing::warn!(key, index, error = %e, "dropped malformed habit record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Schedule;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    #[test]
    fn missing_collection_is_empty() {
        assert!(load_habits(&MemoryStore::new()).is_empty());
    }

    #[test]
    fn malformed_collection_is_empty() {
        for raw in ["{", "42", r#"[{"name": 1}]"#, r#"[{"id":"x","name":"a"}]"#] {
            let store = MemoryStore::with_entry(HABITS_KEY, raw);
            assert!(load_habits(&store).is_empty(), "accepted {raw}");
        }
    }

    #[test]
    fn null_collection_is_empty() {
        let store = MemoryStore::with_entry(HABITS_KEY, "null");
        assert!(load_habits(&store).is_empty());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let store = MemoryStore::new();
        let habits = vec![
            Habit::new("one", Schedule::Daily, Utc::now()),
            Habit::new("two", Schedule::weekly_quota(3), Utc::now()),
        ];
        store.write(HABITS_KEY, &encode(&habits).unwrap()).unwrap();
        assert_eq!(load_habits(&store), habits);
    }

    #[test]
    fn malformed_undo_slot_is_none() {
        let store = MemoryStore::with_entry(UNDO_KEY, "[[[");
        assert!(load_undo(&store).is_none());
    }

    #[test]
    fn bad_records_are_dropped_and_neighbours_kept() {
        let good = Habit::new("Good", Schedule::Daily, Utc::now());
        let raw = serde_json::json!([
            good,
            {"id": "not-a-uuid", "name": "Broken", "created_at": "2024-06-01T08:00:00Z"},
            {"id": "6f1c1b9e-8d5c-4a53-9a55-3f1f3c1b2d10", "name": "  ", "created_at": "2024-06-01T08:00:00Z"},
            {
                "id": "0d9c5f44-2c1e-4c55-9c43-8c7f8a0e7b21",
                "name": "Gym",
                "schedule": {"type": "weekly_quota", "per_week": 300},
                "created_at": "2024-06-01T08:00:00Z"
            }
        ]);
        let store = MemoryStore::with_entry(HABITS_KEY, &raw.to_string());

        let loaded = load_habits(&store);
        let names: Vec<&str> = loaded.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Good", "Gym"]);
        assert_eq!(loaded[0], good);
        assert_eq!(loaded[1].schedule, Schedule::WeeklyQuota { per_week: 7 });
    }

    #[test]
    fn partial_undo_snapshot_is_none() {
        let good = Habit::new("Good", Schedule::Daily, Utc::now());
        let raw = serde_json::json!([good, 42]);
        let store = MemoryStore::with_entry(UNDO_KEY, &raw.to_string());
        assert!(load_undo(&store).is_none());

        let raw = serde_json::json!([good]);
        let store = MemoryStore::with_entry(UNDO_KEY, &raw.to_string());
        assert_eq!(load_undo(&store), Some(vec![good]));
    }
}
