//! Per-habit computed view handed to presentation layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DateKey;
use crate::habit::{Habit, HabitId};
use crate::quota::count_this_week;
use crate::recurrence::{is_allowed_on_date, week_target};
use crate::streak::{compute_best, compute_streak, goal_progress_pct};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitView {
    pub id: HabitId,
    pub name: String,
    pub streak: u32,
    pub best: u32,
    pub weekly_count: u32,
    pub weekly_target: u32,
    /// Scheduled for today ("due") as opposed to a rest day.
    pub allowed_today: bool,
    pub done_today: bool,
    pub goal_days: Option<u32>,
    pub goal_met: bool,
    pub week_met: bool,
    pub goal_progress_pct: u32,
    pub schedule_label: String,
    pub collapsed: bool,
    pub created_at: DateTime<Utc>,
}

impl HabitView {
    pub fn compute(habit: &Habit, today: DateKey) -> Self {
        let streak = compute_streak(habit, today);
        let weekly_count = count_this_week(habit, today);
        let weekly_target = week_target(habit);
        Self {
            id: habit.id,
            name: habit.name.clone(),
            streak,
            best: compute_best(habit),
            weekly_count,
            weekly_target,
            allowed_today: is_allowed_on_date(habit, today),
            done_today: habit.is_done_on(today),
            goal_days: habit.goal_days,
            goal_met: habit.goal_days.is_some_and(|g| streak >= g),
            week_met: weekly_target > 0 && weekly_count >= weekly_target,
            goal_progress_pct: goal_progress_pct(habit, today),
            schedule_label: habit.schedule.label(),
            collapsed: habit.collapsed,
            created_at: habit.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::ScheduleSpec;

    #[test]
    fn computes_every_field() {
        let mut habit = Habit::new("Guitar", ScheduleSpec::MonWedFri.resolve(), Utc::now())
            .with_goal(Some(2));
        // Mon, Tue (off-day) and Wed of the week of 2024-06-10.
        habit.days = ["2024-06-10", "2024-06-11", "2024-06-12"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let view = HabitView::compute(&habit, "2024-06-12".parse().unwrap());

        assert_eq!(view.streak, 3);
        assert_eq!(view.best, 3);
        assert_eq!(view.weekly_count, 2);
        assert_eq!(view.weekly_target, 3);
        assert!(view.allowed_today);
        assert!(view.done_today);
        assert!(view.goal_met);
        assert!(!view.week_met);
        assert_eq!(view.goal_progress_pct, 100);
        assert_eq!(view.schedule_label, "Mon/Wed/Fri");
    }

    #[test]
    fn rest_day_without_goal() {
        let habit = Habit::new("Guitar", ScheduleSpec::TueThu.resolve(), Utc::now());
        let view = HabitView::compute(&habit, "2024-06-12".parse().unwrap());
        assert!(!view.allowed_today);
        assert!(!view.done_today);
        assert!(!view.goal_met);
        assert_eq!(view.goal_progress_pct, 0);
        assert_eq!(view.streak, 0);
    }
}
