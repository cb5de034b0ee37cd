//! Recurrence rules: which days a habit is due and how many completions a
//! week asks for.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::DateKey;
use crate::habit::Habit;

/// Weekly target used when `weekly` is given without a count.
pub const DEFAULT_PER_WEEK: u8 = 3;

/// A set of weekdays, stored as a Monday-first bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        ALL_WEEKDAYS.into_iter().filter(move |d| self.contains(*d))
    }
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

/// How often a habit is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Due every day.
    #[default]
    Daily,
    /// Due only on the listed weekdays.
    SpecificWeekdays { days: WeekdaySet },
    /// Any day counts; `per_week` completions are expected per Monday-start week.
    WeeklyQuota {
        #[serde(default = "default_per_week", deserialize_with = "lenient_per_week")]
        per_week: u8,
    },
}

fn default_per_week() -> u8 {
    DEFAULT_PER_WEEK
}

fn clamp_per_week(per_week: i64) -> u8 {
    per_week.clamp(1, 7) as u8
}

/// Stored targets are clamped into `1..=7`; zero, null or junk means the default.
fn lenient_per_week<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match number {
        Some(f) if f.is_finite() && f.floor() != 0.0 => clamp_per_week(f.floor() as i64),
        _ => DEFAULT_PER_WEEK,
    })
}

impl Schedule {
    /// Weekly quota with the count clamped into `1..=7`.
    pub fn weekly_quota(per_week: i64) -> Self {
        Schedule::WeeklyQuota {
            per_week: clamp_per_week(per_week),
        }
    }

    /// Fixed weekdays. An empty set means every day.
    pub fn weekdays(days: WeekdaySet) -> Self {
        if days.is_empty() {
            Schedule::Daily
        } else {
            Schedule::SpecificWeekdays { days }
        }
    }

    pub fn is_allowed_on(&self, key: DateKey) -> bool {
        match self {
            Schedule::Daily => true,
            Schedule::SpecificWeekdays { days } => days.contains(key.weekday()),
            Schedule::WeeklyQuota { .. } => true,
        }
    }

    pub fn week_target(&self) -> u32 {
        match self {
            Schedule::Daily => 7,
            Schedule::SpecificWeekdays { days } => days.len() as u32,
            Schedule::WeeklyQuota { per_week } => u32::from(*per_week).max(1),
        }
    }

    /// Short human label, e.g. `Mon/Wed/Fri` or `Weekly: 3`.
    pub fn label(&self) -> String {
        match self {
            Schedule::Daily => "Daily".to_string(),
            Schedule::SpecificWeekdays { days } => days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("/"),
            Schedule::WeeklyQuota { .. } => format!("Weekly: {}", self.week_target()),
        }
    }
}

/// Whether `key` is a scheduled day for `habit`.
pub fn is_allowed_on_date(habit: &Habit, key: DateKey) -> bool {
    habit.schedule.is_allowed_on(key)
}

/// Completions the habit's schedule expects in one week.
pub fn week_target(habit: &Habit) -> u32 {
    habit.schedule.week_target()
}

/// Schedule choice as entered by a user when creating a habit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScheduleSpec {
    #[default]
    Daily,
    MonWedFri,
    TueThu,
    /// Raw weekly count; clamped into `1..=7` when resolved.
    Weekly(i64),
    Weekdays(Vec<Weekday>),
}

impl ScheduleSpec {
    pub fn resolve(&self) -> Schedule {
        match self {
            ScheduleSpec::Daily => Schedule::Daily,
            ScheduleSpec::MonWedFri => {
                Schedule::weekdays([Weekday::Mon, Weekday::Wed, Weekday::Fri].into_iter().collect())
            }
            ScheduleSpec::TueThu => {
                Schedule::weekdays([Weekday::Tue, Weekday::Thu].into_iter().collect())
            }
            ScheduleSpec::Weekly(n) => Schedule::weekly_quota(*n),
            ScheduleSpec::Weekdays(days) => Schedule::weekdays(days.iter().copied().collect()),
        }
    }
}

impl FromStr for ScheduleSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "" | "daily" => return Ok(ScheduleSpec::Daily),
            "mwf" => return Ok(ScheduleSpec::MonWedFri),
            "tuth" => return Ok(ScheduleSpec::TueThu),
            "weekly" => return Ok(ScheduleSpec::Weekly(i64::from(DEFAULT_PER_WEEK))),
            _ => {}
        }
        if let Some(count) = s.strip_prefix("weekly:") {
            // Invalid counts fall back to the default rather than failing.
            let n = count
                .trim()
                .parse::<i64>()
                .unwrap_or(i64::from(DEFAULT_PER_WEEK));
            return Ok(ScheduleSpec::Weekly(n));
        }
        s.split(',')
            .map(|part| {
                part.trim()
                    .parse::<Weekday>()
                    .map_err(|_| format!("unknown schedule or weekday: '{}'", part.trim()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ScheduleSpec::Weekdays)
    }
}

impl fmt::Display for ScheduleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleSpec::Daily => write!(f, "daily"),
            ScheduleSpec::MonWedFri => write!(f, "mwf"),
            ScheduleSpec::TueThu => write!(f, "tuth"),
            ScheduleSpec::Weekly(n) => write!(f, "weekly:{n}"),
            ScheduleSpec::Weekdays(days) => {
                let names: Vec<String> = days.iter().map(|d| d.to_string().to_lowercase()).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    // 2024-06-10 is a Monday.
    const WEEK: [&str; 7] = [
        "2024-06-10", "2024-06-11", "2024-06-12", "2024-06-13", "2024-06-14", "2024-06-15",
        "2024-06-16",
    ];

    #[test]
    fn mwf_allows_only_mon_wed_fri() {
        let schedule = ScheduleSpec::MonWedFri.resolve();
        let allowed: Vec<bool> = WEEK.iter().map(|k| schedule.is_allowed_on(key(k))).collect();
        assert_eq!(allowed, vec![true, false, true, false, true, false, false]);
        assert_eq!(schedule.week_target(), 3);
        assert_eq!(schedule.label(), "Mon/Wed/Fri");
    }

    #[test]
    fn tuth_targets_two_days() {
        let schedule = ScheduleSpec::TueThu.resolve();
        assert_eq!(schedule.week_target(), 2);
        assert!(schedule.is_allowed_on(key("2024-06-11")));
        assert!(!schedule.is_allowed_on(key("2024-06-12")));
        assert_eq!(schedule.label(), "Tue/Thu");
    }

    #[test]
    fn daily_and_quota_allow_every_day() {
        for schedule in [Schedule::Daily, Schedule::weekly_quota(2)] {
            assert!(WEEK.iter().all(|k| schedule.is_allowed_on(key(k))));
        }
        assert_eq!(Schedule::Daily.week_target(), 7);
        assert_eq!(Schedule::weekly_quota(2).week_target(), 2);
        assert_eq!(Schedule::weekly_quota(2).label(), "Weekly: 2");
    }

    #[test]
    fn weekly_quota_is_clamped() {
        assert_eq!(Schedule::weekly_quota(0), Schedule::WeeklyQuota { per_week: 1 });
        assert_eq!(Schedule::weekly_quota(-5), Schedule::WeeklyQuota { per_week: 1 });
        assert_eq!(Schedule::weekly_quota(12), Schedule::WeeklyQuota { per_week: 7 });
        // A stored zero still targets at least one completion.
        assert_eq!(Schedule::WeeklyQuota { per_week: 0 }.week_target(), 1);
    }

    #[test]
    fn parses_specs() {
        assert_eq!("daily".parse::<ScheduleSpec>().unwrap(), ScheduleSpec::Daily);
        assert_eq!("MWF".parse::<ScheduleSpec>().unwrap(), ScheduleSpec::MonWedFri);
        assert_eq!("weekly".parse::<ScheduleSpec>().unwrap(), ScheduleSpec::Weekly(3));
        assert_eq!("weekly:5".parse::<ScheduleSpec>().unwrap(), ScheduleSpec::Weekly(5));
        assert_eq!("weekly:x".parse::<ScheduleSpec>().unwrap(), ScheduleSpec::Weekly(3));
        assert_eq!(
            "sat, sun".parse::<ScheduleSpec>().unwrap(),
            ScheduleSpec::Weekdays(vec![Weekday::Sat, Weekday::Sun])
        );
        assert!("fortnightly".parse::<ScheduleSpec>().is_err());
    }

    #[test]
    fn custom_weekdays_label_and_dedupe() {
        let schedule = ScheduleSpec::Weekdays(vec![Weekday::Sun, Weekday::Sat, Weekday::Sun]).resolve();
        assert_eq!(schedule.week_target(), 2);
        assert_eq!(schedule.label(), "Sat/Sun");
    }

    #[test]
    fn empty_weekday_list_is_daily() {
        assert_eq!(ScheduleSpec::Weekdays(vec![]).resolve(), Schedule::Daily);
    }

    #[test]
    fn schedule_json_shape() {
        let schedule = ScheduleSpec::MonWedFri.resolve();
        let json = serde_json::to_value(schedule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "specific_weekdays", "days": ["Mon", "Wed", "Fri"]})
        );
        let back: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, schedule);

        let quota: Schedule =
            serde_json::from_value(serde_json::json!({"type": "weekly_quota", "per_week": 4})).unwrap();
        assert_eq!(quota.week_target(), 4);
    }

    #[test]
    fn stored_per_week_is_clamped() {
        let load = |per_week: serde_json::Value| -> Schedule {
            serde_json::from_value(serde_json::json!({"type": "weekly_quota", "per_week": per_week}))
                .unwrap()
        };
        assert_eq!(load(serde_json::json!(9)).week_target(), 7);
        assert_eq!(load(serde_json::json!(300)).label(), "Weekly: 7");
        assert_eq!(load(serde_json::json!(-2)).week_target(), 1);
        assert_eq!(load(serde_json::json!("5")).week_target(), 5);
        assert_eq!(load(serde_json::json!(0)).week_target(), 3);
        assert_eq!(load(serde_json::json!("lots")).week_target(), 3);
        assert_eq!(load(serde_json::Value::Null).week_target(), 3);

        let missing: Schedule =
            serde_json::from_value(serde_json::json!({"type": "weekly_quota"})).unwrap();
        assert_eq!(missing, Schedule::WeeklyQuota { per_week: 3 });
    }
}
