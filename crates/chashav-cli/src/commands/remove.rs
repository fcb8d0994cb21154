//! Remove command: delete the entry at a list index.

use anyhow::{Context, Result, bail};
use chashav_db::Database;

/// Runs the remove command. The index is as printed by `list`; kavuahs set
/// by the removed entry are removed with it.
pub fn run(db: &mut Database, index: usize) -> Result<()> {
    let list = db.load_entries()?;
    let Some(entry) = list.get(index) else {
        bail!("no entry at index {index} (list has {})", list.len());
    };
    let id = entry
        .id
        .context("stored entry has no id; the database is inconsistent")?;
    db.delete_entry(id)?;
    println!("Removed entry: {}", entry.onah);
    Ok(())
}
