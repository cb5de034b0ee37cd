//! Habit management commands for CLI.

use std::io::{BufRead, Write};

use clap::Subcommand;
use habitkit_core::{parse_goal, Config, Event, FilterMode, HabitView, ScheduleSpec, SortMode};

use super::{open_tracker, resolve};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a new habit
    Add {
        /// Habit name
        name: String,
        /// Goal streak length in days (0 or "none" for no goal)
        #[arg(long)]
        goal: Option<String>,
        /// Schedule: daily, mwf, tuth, weekly, weekly:N, or weekdays like "mon,thu"
        #[arg(long)]
        schedule: Option<ScheduleSpec>,
    },
    /// List habits in display order
    List {
        /// Sort for this listing only
        #[arg(long)]
        sort: Option<SortMode>,
        /// Filter for this listing only
        #[arg(long)]
        filter: Option<FilterMode>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one habit's computed stats as JSON
    Show {
        /// Habit id, id prefix, list position or name
        reference: String,
    },
    /// Mark or unmark today's completion
    ///
    /// Positions and --first follow the saved sort and filter. Pass the same
    /// --sort/--filter used with `habit list` to address that listing.
    Toggle {
        /// Habit id, id prefix, list position or name
        #[arg(required_unless_present = "first")]
        reference: Option<String>,
        /// Toggle the first habit of the current list
        #[arg(long, conflicts_with = "reference")]
        first: bool,
        /// Sort that positions refer to (defaults to the saved sort)
        #[arg(long)]
        sort: Option<SortMode>,
        /// Filter that positions refer to (defaults to the saved filter)
        #[arg(long)]
        filter: Option<FilterMode>,
        /// Output events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set or clear the goal
    Goal {
        /// Habit id, id prefix, list position or name
        reference: String,
        /// Goal in days; anything below 1 clears it
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Delete a habit
    Remove {
        /// Habit id, id prefix, list position or name
        reference: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Collapse or expand a habit in list output
    Collapse {
        /// Habit id, id prefix, list position or name
        reference: String,
    },
}

pub fn run(action: HabitAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker(config)?;

    match action {
        HabitAction::Add {
            name,
            goal,
            schedule,
        } => {
            let goal_days = match goal {
                Some(raw) => parse_goal(&raw),
                None => config.defaults.goal_days,
            };
            let schedule = schedule.unwrap_or_else(|| config.default_schedule());
            let id = tracker.add_habit(&name, goal_days, &schedule)?;
            if let Some(view) = tracker.view(id) {
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
        }
        HabitAction::List { sort, filter, json } => {
            let settings = tracker.settings();
            let views = tracker.views_with(
                filter.unwrap_or(settings.filter),
                sort.unwrap_or(settings.sort),
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else if views.is_empty() {
                println!("No habits yet. Add one with `habitkit habit add <NAME>`.");
            } else {
                println!("Today: {}", tracker.today_key());
                for (i, view) in views.iter().enumerate() {
                    println!(
                        "{}",
                        format_line(i + 1, view, config.display.show_collapsed_details)
                    );
                }
            }
        }
        HabitAction::Show { reference } => {
            let id = resolve(&tracker, &reference)?;
            if let Some(view) = tracker.view(id) {
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
        }
        HabitAction::Toggle {
            reference,
            first,
            sort,
            filter,
            json,
        } => {
            if sort.is_some() || filter.is_some() {
                let settings = tracker.settings();
                tracker.views_with(
                    filter.unwrap_or(settings.filter),
                    sort.unwrap_or(settings.sort),
                );
            }
            let toggled = if first {
                tracker.toggle_first_visible()?.map(|(_, done)| done)
            } else {
                let reference = reference.ok_or("a habit reference or --first is required")?;
                let id = resolve(&tracker, &reference)?;
                tracker.toggle_today(id)?
            };
            if toggled.is_none() {
                return Err("no habit to toggle".into());
            }

            let events = tracker.drain_events();
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                for event in &events {
                    if let Some(line) = describe(event) {
                        println!("{line}");
                    }
                }
            }
        }
        HabitAction::Goal { reference, value } => {
            let id = resolve(&tracker, &reference)?;
            match tracker.update_goal(id, &value)? {
                Some(Some(goal)) => println!("goal set to {goal} days"),
                Some(None) => println!("goal cleared"),
                None => return Err(format!("no habit matches '{reference}'").into()),
            }
        }
        HabitAction::Remove { reference, yes } => {
            let id = resolve(&tracker, &reference)?;
            let removed = tracker.remove_habit(id, |habit| yes || confirm(&habit.name))?;
            if removed {
                println!("deleted");
            } else {
                println!("kept");
            }
        }
        HabitAction::Collapse { reference } => {
            let id = resolve(&tracker, &reference)?;
            match tracker.toggle_collapsed(id)? {
                Some(true) => println!("collapsed"),
                Some(false) => println!("expanded"),
                None => return Err(format!("no habit matches '{reference}'").into()),
            }
        }
    }

    for event in tracker.drain_events() {
        tracing::debug!(?event, "event");
    }
    Ok(())
}

/// Ask on stdin; anything but y/yes declines.
fn confirm(name: &str) -> bool {
    print!("Delete habit '{name}'? [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn format_line(pos: usize, view: &HabitView, show_collapsed_details: bool) -> String {
    let mark = if view.done_today { "x" } else { " " };
    if view.collapsed && !show_collapsed_details {
        return format!("{pos:>3}. [{mark}] {} ▸", view.name);
    }

    let mut line = format!(
        "{pos:>3}. [{mark}] {:<20} streak {:>3} (best {:>3})  week {}/{}  {:<12} {}",
        view.name,
        view.streak,
        view.best,
        view.weekly_count,
        view.weekly_target,
        view.schedule_label,
        if view.allowed_today { "due today" } else { "rest day" },
    );
    if let Some(goal) = view.goal_days {
        line.push_str(&format!("  goal {}/{goal} ({}%)", view.streak, view.goal_progress_pct));
    }
    if view.goal_met {
        line.push_str("  [goal met]");
    }
    if view.week_met {
        line.push_str("  [week met]");
    }
    line
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::CompletionToggled { day, done: true, .. } => Some(format!("done for {day}")),
        Event::CompletionToggled { day, done: false, .. } => Some(format!("undone for {day}")),
        Event::GoalReached {
            name, streak, goal, ..
        } => Some(format!("Goal met! {name}: {streak}/{goal} day streak")),
        Event::WeeklyTargetReached {
            name,
            count,
            target,
            ..
        } => Some(format!("Weekly target hit! {name}: {count}/{target} this week")),
        _ => None,
    }
}
