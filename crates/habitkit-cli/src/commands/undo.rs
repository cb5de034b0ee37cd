use habitkit_core::Config;

use super::open_tracker;

/// Restore the collection as it was before the last habit change.
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker(config)?;
    if tracker.undo()? {
        println!("undone ({} habits)", tracker.len());
    } else {
        println!("nothing to undo");
    }
    Ok(())
}
