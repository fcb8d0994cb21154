//! List command: the stored entries in canonical order.

use anyhow::Result;
use chashav_db::Database;

/// Runs the list command.
pub fn run(db: &Database, json: bool) -> Result<()> {
    let list = db.load_entries()?;
    if json {
        let entries: Vec<_> = list.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if list.is_empty() {
        println!("No entries.");
        return Ok(());
    }
    for (index, entry) in list.iter().enumerate() {
        let mut markers = String::new();
        if entry.ignore_for_flagged_dates {
            markers.push_str(" [not flagged]");
        }
        if entry.ignore_for_kavuah {
            markers.push_str(" [no kavuah]");
        }
        println!("{index:>3}  {entry}{markers}");
        if !entry.comments.is_empty() {
            println!("     {}", entry.comments);
        }
    }
    Ok(())
}
