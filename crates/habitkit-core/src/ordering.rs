//! Filtering and sorting of the habit collection for display.
//!
//! All sorts are stable, so ties keep the collection's insertion order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::clock::DateKey;
use crate::habit::Habit;
use crate::recurrence::is_allowed_on_date;
use crate::streak::{compute_best, compute_streak, goal_progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    #[default]
    All,
    /// Due today and not yet completed.
    Open,
    /// Completed today, whether or not it was due.
    DoneToday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    #[default]
    Streak,
    Best,
    Progress,
    Recent,
    Overdue,
    Name,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::All, FilterMode::Open, FilterMode::DoneToday];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Open => "open",
            FilterMode::DoneToday => "done-today",
        }
    }

    pub fn accepts(self, habit: &Habit, today: DateKey) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Open => is_open(habit, today),
            FilterMode::DoneToday => habit.is_done_on(today),
        }
    }
}

impl SortMode {
    pub const ALL: [SortMode; 6] = [
        SortMode::Streak,
        SortMode::Best,
        SortMode::Progress,
        SortMode::Recent,
        SortMode::Overdue,
        SortMode::Name,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Streak => "streak",
            SortMode::Best => "best",
            SortMode::Progress => "progress",
            SortMode::Recent => "recent",
            SortMode::Overdue => "overdue",
            SortMode::Name => "name",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "donetoday" | "done_today" => return Ok(FilterMode::DoneToday),
            _ => {}
        }
        FilterMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown filter '{s}' (expected all, open, done-today)"))
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        SortMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                format!("unknown sort '{s}' (expected streak, best, progress, recent, overdue, name)")
            })
    }
}

/// Due today and not completed today.
pub fn is_open(habit: &Habit, today: DateKey) -> bool {
    is_allowed_on_date(habit, today) && !habit.is_done_on(today)
}

/// Apply `filter`, then a stable `sort`. Returns references in display order.
pub fn order<'a, I>(habits: I, filter: FilterMode, sort: SortMode, today: DateKey) -> Vec<&'a Habit>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let mut list: Vec<&Habit> = habits
        .into_iter()
        .filter(|h| filter.accepts(h, today))
        .collect();

    match sort {
        SortMode::Streak => {
            list.sort_by_cached_key(|h| std::cmp::Reverse(compute_streak(h, today)));
        }
        SortMode::Best => {
            list.sort_by_cached_key(|h| std::cmp::Reverse(compute_best(h)));
        }
        SortMode::Progress => {
            list.sort_by(|a, b| goal_progress(b, today).total_cmp(&goal_progress(a, today)));
        }
        SortMode::Recent => {
            list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SortMode::Overdue => {
            // Open habits first (false sorts before true), then longer streaks.
            list.sort_by_cached_key(|h| {
                (!is_open(h, today), std::cmp::Reverse(compute_streak(h, today)))
            });
        }
        SortMode::Name => {
            list.sort_by(|a, b| compare_names(&a.name, &b.name));
        }
    }
    list
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
