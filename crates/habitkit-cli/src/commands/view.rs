//! Display settings: sort, filter and the day-rollover hour.
//!
//! These are saved with the habits and are not undoable.

use clap::Subcommand;
use habitkit_core::{Config, FilterMode, SortMode};

use super::open_tracker;

#[derive(Subcommand)]
pub enum ViewAction {
    /// Set the list sort (streak, best, progress, recent, overdue, name)
    Sort { mode: SortMode },
    /// Set the list filter (all, open, done-today)
    Filter { mode: FilterMode },
    /// Set the hour (0-23) at which a new day starts
    Rollover {
        #[arg(allow_negative_numbers = true)]
        hour: i64,
    },
    /// Show current settings and today's date key
    Show {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ViewAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker(config)?;

    match action {
        ViewAction::Sort { mode } => {
            tracker.change_sort(mode)?;
            println!("sort: {mode}");
        }
        ViewAction::Filter { mode } => {
            tracker.change_filter(mode)?;
            println!("filter: {mode}");
        }
        ViewAction::Rollover { hour } => {
            let stored = tracker.change_rollover_hour(hour)?;
            if i64::from(stored) != hour {
                eprintln!("rollover hour {hour} out of range, using {stored}");
            }
            println!("rollover: {stored:02}:00 (today is {})", tracker.today_key());
        }
        ViewAction::Show { json } => {
            let settings = tracker.settings();
            if json {
                let value = serde_json::json!({
                    "rollover_hour": settings.rollover_hour,
                    "sort": settings.sort,
                    "filter": settings.filter,
                    "today": tracker.today_key(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Sort:     {}", settings.sort);
                println!("Filter:   {}", settings.filter);
                println!("Rollover: {:02}:00", settings.rollover_hour);
                println!("Today:    {}", tracker.today_key());
            }
        }
    }
    Ok(())
}
