//! Weekly quota counting and one-shot acknowledgements.

use serde::{Deserialize, Serialize};

use crate::clock::DateKey;
use crate::habit::Habit;
use crate::recurrence::{is_allowed_on_date, week_target, Schedule};
use crate::streak::compute_streak;

/// Completions inside the Monday-start week containing `today`.
///
/// Quota schedules count every completion in the window. Fixed-day schedules
/// count only completions on scheduled days.
pub fn count_this_week(habit: &Habit, today: DateKey) -> u32 {
    let week_start = today.week_start();
    let week_end = DateKey::from_date(week_start.to_date() + chrono::Duration::days(6));
    habit
        .days
        .range(week_start..=week_end)
        .filter(|key| match habit.schedule {
            Schedule::WeeklyQuota { .. } => true,
            Schedule::Daily | Schedule::SpecificWeekdays { .. } => is_allowed_on_date(habit, **key),
        })
        .count() as u32
}

/// Whether the weekly target is met as of `today`.
pub fn week_met(habit: &Habit, today: DateKey) -> bool {
    count_this_week(habit, today) >= week_target(habit)
}

/// Whether the current streak has reached the goal.
pub fn goal_met(habit: &Habit, today: DateKey) -> bool {
    habit
        .goal_days
        .is_some_and(|goal| compute_streak(habit, today) >= goal)
}

/// A celebratory signal that fires at most once per guard period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Acknowledgement {
    /// Streak reached the goal; once per date-key.
    GoalMet { streak: u32, goal: u32 },
    /// Weekly count reached the target; once per week-start key.
    WeeklyTargetMet { count: u32, target: u32 },
}

/// Fire any eligible acknowledgements and record their guard markers.
///
/// Call after a completion toggle, on the post-toggle habit.
pub fn check_acknowledgements(habit: &mut Habit, today: DateKey) -> Vec<Acknowledgement> {
    let mut fired = Vec::new();

    if let Some(goal) = habit.goal_days {
        let streak = compute_streak(habit, today);
        if streak >= goal && habit.last_goal_congrats_key != Some(today) {
            habit.last_goal_congrats_key = Some(today);
            fired.push(Acknowledgement::GoalMet { streak, goal });
        }
    }

    let target = week_target(habit);
    let count = count_this_week(habit, today);
    let week_key = today.week_start();
    if target > 0 && count >= target && habit.last_weekly_congrats_week != Some(week_key) {
        habit.last_weekly_congrats_week = Some(week_key);
        fired.push(Acknowledgement::WeeklyTargetMet { count, target });
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::ScheduleSpec;
    use chrono::Utc;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn habit(spec: ScheduleSpec, days: &[&str]) -> Habit {
        let mut habit = Habit::new("Swim", spec.resolve(), Utc::now());
        habit.days = days.iter().map(|d| key(d)).collect();
        habit
    }

    // Mon 2024-06-10 .. Sun 2024-06-16.
    const TODAY: &str = "2024-06-13";

    #[test]
    fn fixed_schedule_skips_off_days() {
        // Tue and Thu are off-days for MWF.
        let h = habit(
            ScheduleSpec::MonWedFri,
            &["2024-06-10", "2024-06-11", "2024-06-12", "2024-06-13"],
        );
        assert_eq!(count_this_week(&h, key(TODAY)), 2);
    }

    #[test]
    fn quota_schedule_counts_any_day() {
        let h = habit(
            ScheduleSpec::Weekly(3),
            &["2024-06-10", "2024-06-11", "2024-06-13"],
        );
        assert_eq!(count_this_week(&h, key(TODAY)), 3);
        assert!(week_met(&h, key(TODAY)));
    }

    #[test]
    fn window_excludes_neighbouring_weeks() {
        let h = habit(
            ScheduleSpec::Daily,
            &["2024-06-09", "2024-06-10", "2024-06-16", "2024-06-17"],
        );
        assert_eq!(count_this_week(&h, key(TODAY)), 2);
        // Sunday still sees the week that started on Monday.
        assert_eq!(count_this_week(&h, key("2024-06-16")), 2);
    }

    #[test]
    fn goal_acknowledgement_fires_once_per_day() {
        let mut h = habit(ScheduleSpec::Daily, &["2024-06-12", "2024-06-13"]).with_goal(Some(2));
        let fired = check_acknowledgements(&mut h, key(TODAY));
        assert_eq!(fired, vec![Acknowledgement::GoalMet { streak: 2, goal: 2 }]);
        assert_eq!(h.last_goal_congrats_key, Some(key(TODAY)));

        assert!(check_acknowledgements(&mut h, key(TODAY)).is_empty());

        h.days.insert(key("2024-06-14"));
        let fired = check_acknowledgements(&mut h, key("2024-06-14"));
        assert_eq!(fired, vec![Acknowledgement::GoalMet { streak: 3, goal: 2 }]);
    }

    #[test]
    fn weekly_acknowledgement_fires_once_per_week() {
        let mut h = habit(ScheduleSpec::TueThu, &["2024-06-11", "2024-06-13"]);
        let fired = check_acknowledgements(&mut h, key(TODAY));
        assert_eq!(fired, vec![Acknowledgement::WeeklyTargetMet { count: 2, target: 2 }]);
        assert_eq!(h.last_weekly_congrats_week, Some(key("2024-06-10")));

        assert!(check_acknowledgements(&mut h, key("2024-06-15")).is_empty());

        h.days.insert(key("2024-06-18"));
        h.days.insert(key("2024-06-20"));
        let fired = check_acknowledgements(&mut h, key("2024-06-20"));
        assert_eq!(fired, vec![Acknowledgement::WeeklyTargetMet { count: 2, target: 2 }]);
    }

    #[test]
    fn nothing_fires_below_thresholds() {
        let mut h = habit(ScheduleSpec::Daily, &["2024-06-13"]).with_goal(Some(5));
        assert!(check_acknowledgements(&mut h, key(TODAY)).is_empty());
        assert!(!goal_met(&h, key(TODAY)));
        assert_eq!(h.last_goal_congrats_key, None);
        assert_eq!(h.last_weekly_congrats_week, None);
    }
}
