pub mod config;
pub mod habit;
pub mod undo;
pub mod view;

use habitkit_core::{Config, Database, HabitId, HabitTracker};

pub type Tracker = HabitTracker<Database>;

/// Open the tracker on the configured database.
pub fn open_tracker(config: &Config) -> Result<Tracker, Box<dyn std::error::Error>> {
    let db = Database::open_at(&config.database_path()?)?;
    Ok(HabitTracker::open(db, habitkit_core::SystemClock))
}

/// Resolve a habit reference.
///
/// Accepts a full UUID, a 1-based position in the current list order, a
/// unique UUID prefix, or a unique case-insensitive name. Positions index
/// `rendered_order()`, which follows the saved sort and filter unless the
/// caller re-rendered with one-off modes first.
pub fn resolve(tracker: &Tracker, reference: &str) -> Result<HabitId, Box<dyn std::error::Error>> {
    let reference = reference.trim();

    if let Ok(id) = reference.parse::<HabitId>() {
        return tracker
            .get(id)
            .map(|h| h.id)
            .ok_or_else(|| format!("no habit with id {id}").into());
    }

    if let Ok(pos) = reference.parse::<usize>() {
        return pos
            .checked_sub(1)
            .and_then(|i| tracker.rendered_order().get(i).copied())
            .ok_or_else(|| {
                format!(
                    "no habit at position {pos} (list shows {})",
                    tracker.rendered_order().len()
                )
                .into()
            });
    }

    let lower = reference.to_lowercase();
    let by_prefix: Vec<HabitId> = tracker
        .habits()
        .filter(|h| h.id.to_string().starts_with(&lower))
        .map(|h| h.id)
        .collect();
    let by_name: Vec<HabitId> = tracker
        .habits()
        .filter(|h| h.name.to_lowercase() == lower)
        .map(|h| h.id)
        .collect();

    match (by_prefix.as_slice(), by_name.as_slice()) {
        ([id], _) | ([], [id]) => Ok(*id),
        ([], []) => Err(format!("no habit matches '{reference}'").into()),
        _ => Err(format!("'{reference}' matches more than one habit").into()),
    }
}
