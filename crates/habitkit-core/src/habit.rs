//! The habit record and its persisted shape.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::clock::DateKey;
use crate::recurrence::Schedule;

pub type HabitId = Uuid;

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    /// Target streak length. `None` or at least 1.
    #[serde(default, deserialize_with = "lenient_goal")]
    pub goal_days: Option<u32>,
    /// Completion record, one key per completed day.
    #[serde(default)]
    pub days: BTreeSet<DateKey>,
    /// Unknown stored shapes load as daily.
    #[serde(default, deserialize_with = "lenient_schedule")]
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub collapsed: bool,
    /// Last day the goal acknowledgement fired.
    #[serde(default)]
    pub last_goal_congrats_key: Option<DateKey>,
    /// Week-start key of the last weekly acknowledgement.
    #[serde(default)]
    pub last_weekly_congrats_week: Option<DateKey>,
}

impl Habit {
    pub fn new(name: impl Into<String>, schedule: Schedule, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            goal_days: None,
            days: BTreeSet::new(),
            schedule,
            created_at,
            collapsed: false,
            last_goal_congrats_key: None,
            last_weekly_congrats_week: None,
        }
    }

    pub fn with_goal(mut self, goal_days: Option<u32>) -> Self {
        self.goal_days = goal_days.filter(|g| *g > 0);
        self
    }

    pub fn is_done_on(&self, key: DateKey) -> bool {
        self.days.contains(&key)
    }

    /// Flip membership of `key`. Returns whether the day is now completed.
    pub fn toggle_day(&mut self, key: DateKey) -> bool {
        if self.days.remove(&key) {
            false
        } else {
            self.days.insert(key);
            true
        }
    }
}

/// Interpret free-form goal input.
///
/// Numbers are floored; anything non-positive or unparsable means "no goal".
pub fn parse_goal(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return goal_from_i64(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => goal_from_i64(f.floor() as i64),
        _ => None,
    }
}

fn goal_from_i64(n: i64) -> Option<u32> {
    if n > 0 {
        Some(n.min(i64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

fn lenient_goal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(i) => goal_from_i64(i),
            None => n.as_f64().and_then(|f| parse_goal(&f.to_string())),
        },
        Some(serde_json::Value::String(s)) => parse_goal(&s),
        _ => None,
    })
}

fn lenient_schedule<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Schedule, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unknown stored schedule, using daily");
        Schedule::Daily
    }))
}
