//! A recorded observation on a specific onah.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::jdate::JewishDate;
use crate::onah::{NightDay, Onah};

/// A single cycle observation.
///
/// Two entries are "the same entry" iff their onahs are equal; the storage id
/// is used for lookup and deduplication against the database, never for
/// identity. The `haflaga` is derived by [`crate::EntryList::calculate_haflagas`],
/// not supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub onah: Onah,
    /// Database id, assigned by the storage layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Excluded from the real-entry view and from flagged-date generation.
    #[serde(default)]
    pub ignore_for_flagged_dates: bool,
    /// Excluded from kavuah pattern detection.
    #[serde(default)]
    pub ignore_for_kavuah: bool,
    #[serde(default)]
    pub comments: String,
    /// Days since the previous real entry; `None` on the first real entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub haflaga: Option<i32>,
}

impl Entry {
    /// Creates an entry with no id, no ignore flags and no comments.
    #[must_use]
    pub const fn new(onah: Onah) -> Self {
        Self {
            onah,
            id: None,
            ignore_for_flagged_dates: false,
            ignore_for_kavuah: false,
            comments: String::new(),
            haflaga: None,
        }
    }

    /// The calendar date of the underlying onah.
    #[must_use]
    pub const fn date(&self) -> JewishDate {
        self.onah.jdate
    }

    /// The day of the Jewish month.
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.onah.jdate.day()
    }

    /// The Jewish month. Nissan is 1.
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.onah.jdate.month()
    }

    /// The Jewish year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.onah.jdate.year()
    }

    /// The day of the week. Sunday is 0.
    #[must_use]
    pub const fn day_of_week(&self) -> u8 {
        self.onah.jdate.day_of_week()
    }

    /// Which half of the day the observation was on.
    #[must_use]
    pub const fn night_day(&self) -> NightDay {
        self.onah.night_day
    }

    /// Has this entry been assigned a database id?
    #[must_use]
    pub const fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Sets the haflaga from the immediately preceding real entry; clears it
    /// when there is none.
    pub fn set_haflaga(&mut self, previous: Option<&Self>) {
        self.haflaga = previous.map(|p| p.date().diff_days(self.date()));
    }

    /// Do the two entries record the same onah? The id plays no part here.
    #[must_use]
    pub fn is_same_entry(&self, other: &Self) -> bool {
        self.onah == other.onah
    }

    /// The signed number of half-day steps from this entry's onah to the
    /// other's.
    #[must_use]
    pub const fn onah_differential(&self, other: &Self) -> i32 {
        const fn onah_index(onah: Onah) -> i32 {
            onah.jdate.abs() * 2
                + match onah.night_day {
                    NightDay::Night => 0,
                    NightDay::Day => 1,
                }
        }
        onah_index(other.onah) - onah_index(self.onah)
    }
}

impl fmt::Display for Entry {
    /// Formats as "Nissan 10, 5780 (night)".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.date(), self.night_day())?;
        if let Some(haflaga) = self.haflaga {
            write!(f, " [haflaga {haflaga}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(month: u8, day: u8, night_day: NightDay) -> Entry {
        Entry::new(Onah::new(
            JewishDate::from_ymd(5780, month, day).unwrap(),
            night_day,
        ))
    }

    #[test]
    fn same_entry_ignores_id() {
        let a = entry(1, 10, NightDay::Night);
        let mut b = entry(1, 10, NightDay::Night);
        b.id = Some(42);
        assert!(a.is_same_entry(&b));
        assert!(!a.is_same_entry(&entry(1, 10, NightDay::Day)));
        assert!(!a.is_same_entry(&entry(1, 11, NightDay::Night)));
    }

    #[test]
    fn set_haflaga_from_previous() {
        let first = entry(1, 1, NightDay::Night);
        let mut second = entry(2, 1, NightDay::Night);
        second.set_haflaga(Some(&first));
        // Nissan has 30 days.
        assert_eq!(second.haflaga, Some(30));
    }

    #[test]
    fn set_haflaga_without_previous_clears() {
        let mut e = entry(1, 10, NightDay::Night);
        e.haflaga = Some(29);
        e.set_haflaga(None);
        assert_eq!(e.haflaga, None);
    }

    #[test]
    fn onah_differential_counts_half_days() {
        let a = entry(1, 10, NightDay::Night);
        let b = entry(1, 10, NightDay::Day);
        let c = entry(1, 12, NightDay::Night);
        assert_eq!(a.onah_differential(&b), 1);
        assert_eq!(b.onah_differential(&a), -1);
        assert_eq!(a.onah_differential(&c), 4);
        assert_eq!(a.onah_differential(&a), 0);
    }

    #[test]
    fn serde_round_trip() {
        let mut e = entry(1, 10, NightDay::Night);
        e.comments = "note".into();
        e.haflaga = Some(30);
        let json = serde_json::to_string(&e).unwrap();
        let parsed: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, e);
    }
}
