//! The ordered, deduplicated collection of entries.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::flagging::FlaggedDatesGenerator;
use crate::kavuah::Kavuah;
use crate::problem::ProblemOnah;
use crate::settings::Settings;

/// An owned collection of [`Entry`] values with a uniqueness invariant: no
/// two elements record the same onah.
///
/// The list itself is kept in insertion order; chronological views are
/// derived. Canonical chronological order is ascending calendar date with
/// night before day on the same date - exactly [`crate::Onah`]'s `Ord`.
///
/// Mutation never recomputes anything on its own. After any change the
/// caller runs [`Self::calculate_haflagas`] and then re-runs detection and
/// flag synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Appends an entry and returns its index, or `None` if an equal entry
    /// (same onah) is already present.
    ///
    /// Does not sort and does not recalculate haflagas.
    pub fn add(&mut self, entry: Entry) -> Option<usize> {
        if self.contains(&entry) {
            tracing::debug!(%entry, "duplicate entry ignored");
            return None;
        }
        self.entries.push(entry);
        Some(self.entries.len() - 1)
    }

    /// Removes the entry at the given position, or `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<Entry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Removes the first element recording the same onah as the given entry.
    /// The argument does not have to be the stored instance.
    pub fn remove(&mut self, entry: &Entry) -> Option<Entry> {
        let index = self.entries.iter().position(|e| e.is_same_entry(entry))?;
        Some(self.entries.remove(index))
    }

    /// Is an entry recording the same onah in the list?
    #[must_use]
    pub fn contains(&self, entry: &Entry) -> bool {
        self.entries.iter().any(|e| e.is_same_entry(entry))
    }

    /// A chronologically descending copy - the most recent entry first.
    #[must_use]
    pub fn descending(&self) -> Vec<Entry> {
        let mut list = self.entries.clone();
        list.sort_by_key(|e| std::cmp::Reverse(e.onah));
        list
    }

    /// The chronologically ascending sub-list of entries not ignored for
    /// flagged dates. This is the only view pattern detection consumes.
    #[must_use]
    pub fn real_entry_list(&self) -> Vec<Entry> {
        let mut list: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| !e.ignore_for_flagged_dates)
            .cloned()
            .collect();
        list.sort_by_key(|e| e.onah);
        list
    }

    /// The entry with the latest date, ignored or not. Ties between the two
    /// onahs of one day are resolved arbitrarily.
    #[must_use]
    pub fn last_entry(&self) -> Option<&Entry> {
        self.entries.iter().max_by_key(|e| e.date().abs())
    }

    /// The last entry of the real-entry view.
    #[must_use]
    pub fn last_regular_entry(&self) -> Option<Entry> {
        self.real_entry_list().pop()
    }

    /// Recalculates the haflaga of every real entry from its immediate real
    /// predecessor. The first real entry has no haflaga; ignored entries are
    /// left untouched.
    ///
    /// Idempotent: running it twice without an intervening mutation yields
    /// identical values.
    pub fn calculate_haflagas(&mut self) {
        // Walk the real entries in chronological order by index so the
        // "previous" relationship is structural.
        let mut order: Vec<usize> = (0..self.entries.len())
            .filter(|&i| !self.entries[i].ignore_for_flagged_dates)
            .collect();
        order.sort_by_key(|&i| self.entries[i].onah);

        let mut previous_date = None;
        for &i in &order {
            let date = self.entries[i].date();
            self.entries[i].haflaga = previous_date.map(|p: crate::JewishDate| p.diff_days(date));
            previous_date = Some(date);
        }
        tracing::debug!(real_entries = order.len(), "haflagas recalculated");
    }

    /// Synthesizes the flagged problem onahs from this list, the given
    /// kavuahs and the halachic settings.
    #[must_use]
    pub fn problem_onahs(&self, kavuahs: &[Kavuah], settings: &Settings) -> Vec<ProblemOnah> {
        FlaggedDatesGenerator::new(self.real_entry_list(), kavuahs, settings).problem_onahs()
    }
}

impl FromIterator<Entry> for EntryList {
    /// Collects entries, silently dropping duplicates by onah.
    fn from_iter<T: IntoIterator<Item = Entry>>(iter: T) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.add(entry);
        }
        list
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
