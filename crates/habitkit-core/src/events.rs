use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DateKey;
use crate::habit::HabitId;
use crate::ordering::{FilterMode, SortMode};

/// Every state change in the tracker produces an Event.
/// Front ends drain them after each command to show confirmations and
/// celebrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitAdded {
        id: HabitId,
        name: String,
        at: DateTime<Utc>,
    },
    CompletionToggled {
        id: HabitId,
        day: DateKey,
        done: bool,
        at: DateTime<Utc>,
    },
    GoalUpdated {
        id: HabitId,
        goal_days: Option<u32>,
        at: DateTime<Utc>,
    },
    HabitRemoved {
        id: HabitId,
        name: String,
        at: DateTime<Utc>,
    },
    CollapsedToggled {
        id: HabitId,
        collapsed: bool,
        at: DateTime<Utc>,
    },
    /// The single undo snapshot was restored.
    Undone {
        at: DateTime<Utc>,
    },
    /// Streak reached the goal (at most once per day).
    GoalReached {
        id: HabitId,
        name: String,
        streak: u32,
        goal: u32,
        at: DateTime<Utc>,
    },
    /// Weekly target reached (at most once per week).
    WeeklyTargetReached {
        id: HabitId,
        name: String,
        count: u32,
        target: u32,
        week_start: DateKey,
        at: DateTime<Utc>,
    },
    SortChanged {
        sort: SortMode,
        at: DateTime<Utc>,
    },
    FilterChanged {
        filter: FilterMode,
        at: DateTime<Utc>,
    },
    RolloverChanged {
        rollover_hour: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether this is a celebratory acknowledgement.
    pub fn is_acknowledgement(&self) -> bool {
        matches!(
            self,
            Event::GoalReached { .. } | Event::WeeklyTargetReached { .. }
        )
    }
}
