//! Add command: record an entry and surface what it changes.
//!
//! After the entry is stored the haflagas are recalculated and, when
//! `calc_kavuahs_on_new_entry` is set, the detection pass reports new kavuah
//! candidates and kavuahs the entry broke, fell out of, or reawakened.

use anyhow::{Context, Result, bail};
use chashav_core::{Entry, JewishDate, NightDay, Onah, kavuah};
use chashav_db::Database;
use chrono::NaiveDate;

/// Runs the add command.
pub fn run(
    db: &mut Database,
    date: &str,
    night_day: NightDay,
    secular: bool,
    ignore_flagged: bool,
    ignore_kavuah: bool,
    comments: Option<String>,
) -> Result<()> {
    let jdate = parse_date(date, secular)?;
    let mut entry = Entry::new(Onah::new(jdate, night_day));
    entry.ignore_for_flagged_dates = ignore_flagged;
    entry.ignore_for_kavuah = ignore_kavuah;
    entry.comments = comments.unwrap_or_default();

    let existing = db.load_entries()?;
    if existing.contains(&entry) {
        bail!("an entry for {} already exists", entry.onah);
    }
    db.save_entry(&mut entry)?;
    println!("Added entry: {}", entry.onah);

    // Reload for the recomputed haflagas before running detection.
    let list = db.load_entries()?;
    let settings = db.load_settings()?;
    if !settings.calc_kavuahs_on_new_entry {
        return Ok(());
    }

    let real = list.real_entry_list();
    let kavuahs = db.load_kavuahs(&list)?;

    let suggestions = kavuah::get_possible_new_kavuahs(&real, &kavuahs, &settings);
    for suggestion in &suggestions {
        println!("Possible kavuah: {}", suggestion.kavuah);
        for contributing in &suggestion.entries {
            println!("    from: {contributing}");
        }
    }

    // The stored instance carries the recalculated haflaga; an entry ignored
    // for flagged dates is absent from the real list and breaks nothing.
    if let Some(stored) = real.iter().find(|e| e.is_same_entry(&entry)) {
        for broken in kavuah::find_broken_kavuahs(stored, &kavuahs, &real, &settings) {
            println!("Broken kavuah: {broken}");
        }
        for out in kavuah::find_out_of_pattern(stored, &kavuahs, &real, &settings) {
            println!("Entry is out of pattern with: {out}");
        }
        for awakened in kavuah::find_reawakened_kavuahs(stored, &kavuahs, &real, &settings) {
            println!("Reawakened kavuah: {awakened}");
        }
    }
    Ok(())
}

/// Parses `year-month-day`, Jewish by default, secular on request.
fn parse_date(date: &str, secular: bool) -> Result<JewishDate> {
    let mut parts = date.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("invalid date {date:?}, expected year-month-day");
    };
    let year: i32 = year.parse().with_context(|| format!("invalid year {year:?}"))?;
    let month: u8 = month
        .parse()
        .with_context(|| format!("invalid month {month:?}"))?;
    let day: u8 = day.parse().with_context(|| format!("invalid day {day:?}"))?;

    if secular {
        let naive = NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
            .with_context(|| format!("invalid secular date {date:?}"))?;
        Ok(JewishDate::from_secular(naive))
    } else {
        Ok(JewishDate::from_ymd(year, month, day)?)
    }
}
