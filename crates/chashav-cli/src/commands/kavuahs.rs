//! Kavuah commands: list stored kavuahs and show detected candidates.

use anyhow::Result;
use chashav_db::Database;

/// Lists the stored kavuahs. Ignored kavuahs are hidden unless the
/// `show_ignored_kavuahs` setting is on.
pub fn list(db: &Database, json: bool) -> Result<()> {
    let entries = db.load_entries()?;
    let settings = db.load_settings()?;
    let kavuahs: Vec<_> = db
        .load_kavuahs(&entries)?
        .into_iter()
        .filter(|k| settings.show_ignored_kavuahs || !k.ignored)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&kavuahs)?);
        return Ok(());
    }
    if kavuahs.is_empty() {
        println!("No kavuahs.");
        return Ok(());
    }
    for kavuah in &kavuahs {
        println!("{kavuah}");
        println!("    set by: {}", kavuah.setting_entry);
    }
    Ok(())
}

/// Shows kavuah candidates detected from the current entries that no active
/// kavuah already covers.
pub fn suggest(db: &Database) -> Result<()> {
    let entries = db.load_entries()?;
    let settings = db.load_settings()?;
    let kavuahs = db.load_kavuahs(&entries)?;
    let suggestions = chashav_core::kavuah::get_possible_new_kavuahs(
        &entries.real_entry_list(),
        &kavuahs,
        &settings,
    );
    if suggestions.is_empty() {
        println!("No kavuah candidates detected.");
        return Ok(());
    }
    for suggestion in &suggestions {
        println!("Possible kavuah: {}", suggestion.kavuah);
        for contributing in &suggestion.entries {
            println!("    from: {contributing}");
        }
    }
    Ok(())
}
