//! # habitkit Core Library
//!
//! This library provides the scheduling and analytics engine behind habitkit.
//! It follows a CLI-first philosophy: every operation is available through the
//! standalone `habitkit` binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Clock**: canonical `YYYY-MM-DD` date keys, an injected "now" provider
//!   and a configurable day-rollover hour
//! - **Recurrence**: daily, fixed-weekday and weekly-quota schedules
//! - **Streaks**: current and best consecutive-day runs
//! - **Quota**: weekly counts and one-shot acknowledgements
//! - **Ordering**: filter and stable sort modes for display
//! - **Tracker**: the single writer, with a one-level undo
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`HabitTracker`]: owns the collection and runs every command
//! - [`DateKey`]: canonical date identifier
//! - [`Schedule`]: exhaustively matched recurrence rule
//! - [`Database`]: persistent key-value store
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod habit;
pub mod ordering;
pub mod quota;
pub mod recurrence;
pub mod storage;
pub mod streak;
pub mod tracker;
pub mod view;

pub use clock::{Clock, DateKey, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use habit::{parse_goal, Habit, HabitId};
pub use ordering::{FilterMode, SortMode};
pub use quota::{count_this_week, Acknowledgement};
pub use recurrence::{is_allowed_on_date, week_target, Schedule, ScheduleSpec, WeekdaySet};
pub use storage::{Config, Database, KvStore, MemoryStore, Settings};
pub use streak::{compute_best, compute_streak};
pub use tracker::HabitTracker;
pub use view::HabitView;
