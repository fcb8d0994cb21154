//! Synthesis of the flagged problem-onah list.
//!
//! A pure pass over an explicit snapshot: the chronological real-entry list,
//! the kavuah list and the halachic settings go in, the sorted
//! [`ProblemOnah`] list comes out. Nothing here mutates the inputs.

use crate::entry::Entry;
use crate::kavuah::{self, Kavuah, KavuahType};
use crate::onah::{NightDay, Onah};
use crate::problem::{ProblemFlag, ProblemOnah};
use crate::settings::Settings;

/// Where a candidate flag came from; decides the Onah Beinonis suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagSource {
    OnahBeinonis,
    Kavuah { cancels: bool },
}

/// A flag before merging, still carrying its provenance.
#[derive(Debug, Clone)]
struct RawFlag {
    onah: Onah,
    description: String,
    source: FlagSource,
}

/// Synthesizes the current flagged dates from a snapshot of the entries,
/// kavuahs and settings.
#[derive(Debug)]
pub struct FlaggedDatesGenerator<'a> {
    /// Chronologically ascending real entries, haflagas already calculated.
    entries: Vec<Entry>,
    kavuahs: &'a [Kavuah],
    settings: &'a Settings,
}

impl<'a> FlaggedDatesGenerator<'a> {
    #[must_use]
    pub const fn new(entries: Vec<Entry>, kavuahs: &'a [Kavuah], settings: &'a Settings) -> Self {
        Self {
            entries,
            kavuahs,
            settings,
        }
    }

    /// Runs the synthesis. With no entries there is nothing to project and
    /// the result is empty.
    #[must_use]
    pub fn problem_onahs(&self) -> Vec<ProblemOnah> {
        let Some(last) = self.entries.last() else {
            return Vec::new();
        };

        let mut raw = Vec::new();
        self.push_onah_beinonis_flags(&mut raw);
        if self.settings.keep_longer_haflagah {
            self.push_unsurpassed_haflagas(last, &mut raw);
        }
        self.push_kavuah_flags(last, &mut raw);

        if self.settings.show_ohr_zeruah {
            // The onah directly preceding a flagged onah inherits the flag.
            let preceding: Vec<RawFlag> = raw
                .iter()
                .map(|flag| RawFlag {
                    onah: flag.onah.previous(),
                    description: format!("Ohr Zeruah of {}", flag.description),
                    source: flag.source,
                })
                .collect();
            raw.extend(preceding);
        }

        // A cancelling kavuah knocks out the generic flags on the onahs it
        // covers itself.
        let cancelling: Vec<Onah> = raw
            .iter()
            .filter(|f| f.source == FlagSource::Kavuah { cancels: true })
            .map(|f| f.onah)
            .collect();
        raw.retain(|f| f.source != FlagSource::OnahBeinonis || !cancelling.contains(&f.onah));

        if self.settings.no_probs_after_entry {
            raw.retain(|f| f.onah > last.onah);
        }

        let probs = merge(raw);
        tracing::debug!(
            entries = self.entries.len(),
            kavuahs = self.kavuahs.len(),
            problem_onahs = probs.len(),
            "flagged dates synthesized"
        );
        probs
    }

    /// The two onahs a flag lands on for a date projected from the given
    /// entry: the whole day under `onah_beinunis_24_hours`, otherwise only
    /// the entry's own half.
    fn periods(&self, entry: &Entry) -> Vec<NightDay> {
        if self.settings.onah_beinunis_24_hours {
            vec![NightDay::Night, NightDay::Day]
        } else {
            vec![entry.night_day()]
        }
    }

    /// The generic Onah Beinonis recurrence per real entry: the thirtieth
    /// day, the thirty-first day, and the entry's own haflaga interval.
    /// The entry's date counts as day one.
    fn push_onah_beinonis_flags(&self, raw: &mut Vec<RawFlag>) {
        for entry in &self.entries {
            let periods = self.periods(entry);
            for night_day in &periods {
                raw.push(RawFlag {
                    onah: Onah::new(entry.date().add_days(29), *night_day),
                    description: "Thirtieth Day".into(),
                    source: FlagSource::OnahBeinonis,
                });
                if self.settings.keep_thirty_one {
                    raw.push(RawFlag {
                        onah: Onah::new(entry.date().add_days(30), *night_day),
                        description: "Thirty First Day".into(),
                        source: FlagSource::OnahBeinonis,
                    });
                }
            }
            if let Some(haflaga) = entry.haflaga
                && haflaga > 0
            {
                for night_day in &periods {
                    raw.push(RawFlag {
                        onah: Onah::new(entry.date().add_days(haflaga), *night_day),
                        description: format!("Haflaga of {haflaga} days"),
                        source: FlagSource::OnahBeinonis,
                    });
                }
            }
        }
    }

    /// The Ta"z: every haflaga that no later entry surpassed keeps being
    /// projected forward from the latest entry.
    fn push_unsurpassed_haflagas(&self, last: &Entry, raw: &mut Vec<RawFlag>) {
        let periods = self.periods(last);
        for (i, entry) in self.entries.iter().enumerate() {
            let Some(haflaga) = entry.haflaga else {
                continue;
            };
            if haflaga <= 0 {
                continue;
            }
            let surpassed = self.entries[i + 1..]
                .iter()
                .any(|e| e.haflaga.is_some_and(|later| later >= haflaga));
            if surpassed {
                continue;
            }
            for night_day in &periods {
                raw.push(RawFlag {
                    onah: Onah::new(last.date().add_days(haflaga), *night_day),
                    description: format!("Haflaga of {haflaga} days"),
                    source: FlagSource::OnahBeinonis,
                });
            }
        }
    }

    /// One projection per active, non-ignored kavuah: the full iteration
    /// series for independent types out to the warning horizon, the next
    /// direct continuation from the latest entry for the rest.
    fn push_kavuah_flags(&self, last: &Entry, raw: &mut Vec<RawFlag>) {
        let horizon =
            i32::try_from(self.settings.number_months_ahead_to_warn).unwrap_or(i32::MAX);
        let stop = last.date().add_months(horizon);

        for k in self.kavuahs.iter().filter(|k| k.active && !k.ignored) {
            let source = FlagSource::Kavuah {
                cancels: k.cancels_onah_beinunis,
            };
            let description = format!("Kavuah: {k}");
            if k.is_independent() {
                for onah in
                    kavuah::independent_iterations(k, stop, self.settings.dilug_chodesh_past_ends)
                {
                    raw.push(RawFlag {
                        onah,
                        description: description.clone(),
                        source,
                    });
                }
                continue;
            }
            let onah = match k.kavuah_type {
                KavuahType::Haflagah | KavuahType::HaflagaMaayanPasuach => (k.special_number > 0)
                    .then(|| {
                        Onah::new(
                            last.date().add_days(k.special_number),
                            k.setting_entry.night_day(),
                        )
                    }),
                KavuahType::DilugHaflaga => last.haflaga.and_then(|h| {
                    let next = h + k.special_number;
                    (next > 0).then(|| {
                        Onah::new(last.date().add_days(next), k.setting_entry.night_day())
                    })
                }),
                KavuahType::HaflagaOnahs => {
                    (k.special_number > 0).then(|| last.onah.add_onahs(k.special_number))
                }
                _ => None,
            };
            if let Some(onah) = onah {
                raw.push(RawFlag {
                    onah,
                    description,
                    source,
                });
            }
        }
    }
}

/// Merges the raw flags into one [`ProblemOnah`] per onah, dropping
/// duplicate descriptions, in canonical order.
fn merge(mut raw: Vec<RawFlag>) -> Vec<ProblemOnah> {
    raw.sort_by_key(|f| f.onah);
    let mut probs: Vec<ProblemOnah> = Vec::new();
    for flag in raw {
        if probs.last().is_none_or(|p| p.onah != flag.onah) {
            probs.push(ProblemOnah::new(flag.onah));
        }
        let candidate = ProblemFlag {
            jdate: flag.onah.jdate,
            night_day: flag.onah.night_day,
            description: flag.description,
        };
        if let Some(prob) = probs.last_mut()
            && !prob.flags.iter().any(|f| f.is_same_prob(&candidate))
        {
            prob.flags.push(candidate);
        }
    }
    probs
}
