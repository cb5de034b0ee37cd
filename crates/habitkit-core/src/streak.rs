//! Current and best streaks over a habit's completion record.
//!
//! Streaks look only at calendar-day continuity of `days`. The schedule is not
//! consulted, so an off-schedule completion still bridges a streak.

use crate::clock::DateKey;
use crate::habit::Habit;

/// Consecutive completed days ending at `today`. Zero if today is not done.
pub fn compute_streak(habit: &Habit, today: DateKey) -> u32 {
    let mut key = today;
    let mut streak = 0;
    while habit.days.contains(&key) {
        streak += 1;
        key = key.prev_day();
    }
    streak
}

/// Longest run of consecutive calendar days anywhere in the history.
pub fn compute_best(habit: &Habit) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<DateKey> = None;
    // `days` is a BTreeSet, so iteration is already sorted and deduplicated.
    for &key in &habit.days {
        run = match previous {
            Some(prev) if key.prev_day() == prev => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(key);
    }
    best
}

/// Fraction of the goal reached by the current streak; 0 without a goal.
pub fn goal_progress(habit: &Habit, today: DateKey) -> f64 {
    match habit.goal_days {
        Some(goal) if goal > 0 => f64::from(compute_streak(habit, today)) / f64::from(goal),
        _ => 0.0,
    }
}

/// Goal progress as a rounded percentage capped at 100.
pub fn goal_progress_pct(habit: &Habit, today: DateKey) -> u32 {
    (goal_progress(habit, today) * 100.0).round().min(100.0) as u32
}
