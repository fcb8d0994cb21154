//! Flags command: the synthesized flagged-date list.

use anyhow::Result;
use chashav_db::Database;

/// Runs the flags command.
pub fn run(db: &Database, json: bool) -> Result<()> {
    let entries = db.load_entries()?;
    let settings = db.load_settings()?;
    let kavuahs = db.load_kavuahs(&entries)?;
    let probs = entries.problem_onahs(&kavuahs, &settings);

    if json {
        println!("{}", serde_json::to_string_pretty(&probs)?);
        return Ok(());
    }
    if probs.is_empty() {
        println!("No flagged dates.");
        return Ok(());
    }
    for prob in &probs {
        println!("{prob}");
    }
    Ok(())
}
