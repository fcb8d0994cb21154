//! The recurring-pattern model: detection, validation, projection and
//! pattern-break search across nine pattern families.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::entry::Entry;
use crate::jdate::JewishDate;
use crate::onah::{NightDay, Onah};
use crate::settings::Settings;

const DOW_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Shabbos",
];

/// The nine kavuah pattern families.
///
/// "Independent" types are evaluated purely against the calendar -
/// intervening entries are irrelevant; the rest require consecutive real
/// entries to literally continue the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KavuahType {
    /// A constant number of days between consecutive entries.
    Haflagah,
    /// The same day of the Jewish month.
    DayOfMonth,
    /// The same weekday at a constant day interval.
    DayOfWeek,
    /// The same day of the month at a constant multi-month gap.
    Sirug,
    /// A constant signed day-delta added to the haflaga each cycle.
    DilugHaflaga,
    /// A constant signed day-delta added to the month-day each cycle.
    DilugDayOfMonth,
    /// Haflagah under the relaxed Ma'ayan Pasuach sub-rule.
    HaflagaMaayanPasuach,
    /// DayOfMonth under the relaxed Ma'ayan Pasuach sub-rule.
    DayOfMonthMaayanPasuach,
    /// A constant number of half-day onah steps between consecutive entries
    /// (the Shulchan Aruch Harav).
    HaflagaOnahs,
}

impl KavuahType {
    /// Is this pattern evaluated against the calendar alone, without regard
    /// to intervening entries?
    #[must_use]
    pub const fn is_independent(self) -> bool {
        matches!(
            self,
            Self::DayOfMonth
                | Self::DayOfMonthMaayanPasuach
                | Self::DayOfWeek
                | Self::DilugDayOfMonth
                | Self::Sirug
        )
    }

    /// The persisted numeric discriminant. Historical powers of two; always
    /// compared by equality, never combined.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Haflagah => 1,
            Self::DayOfMonth => 2,
            Self::DayOfWeek => 4,
            Self::Sirug => 8,
            Self::DilugHaflaga => 16,
            Self::DilugDayOfMonth => 32,
            Self::HaflagaMaayanPasuach => 64,
            Self::DayOfMonthMaayanPasuach => 128,
            Self::HaflagaOnahs => 256,
        }
    }

    /// The inverse of [`Self::code`], for rows read back from storage.
    pub const fn from_code(code: i64) -> Result<Self, CoreError> {
        match code {
            1 => Ok(Self::Haflagah),
            2 => Ok(Self::DayOfMonth),
            4 => Ok(Self::DayOfWeek),
            8 => Ok(Self::Sirug),
            16 => Ok(Self::DilugHaflaga),
            32 => Ok(Self::DilugDayOfMonth),
            64 => Ok(Self::HaflagaMaayanPasuach),
            128 => Ok(Self::DayOfMonthMaayanPasuach),
            256 => Ok(Self::HaflagaOnahs),
            other => Err(CoreError::UnknownTypeCode(other)),
        }
    }

    /// Display name for listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Haflagah => "Haflaga",
            Self::DayOfMonth => "Day of Month",
            Self::DayOfWeek => "Day of Week",
            Self::Sirug => "Sirug",
            Self::DilugHaflaga => "\"Dilug\" of Haflaga",
            Self::DilugDayOfMonth => "\"Dilug\" of Day of Month",
            Self::HaflagaMaayanPasuach => "Haflaga with Ma'ayan Pasuach",
            Self::DayOfMonthMaayanPasuach => "Day of Month with Ma'ayan Pasuach",
            Self::HaflagaOnahs => "Haflaga of Onahs",
        }
    }

    /// What the special number represents for this type.
    #[must_use]
    pub const fn number_definition(self) -> &'static str {
        match self {
            Self::DayOfMonth | Self::DayOfMonthMaayanPasuach => "Day of each Jewish month",
            Self::Haflagah | Self::HaflagaMaayanPasuach | Self::DayOfWeek => {
                "Number of days between entries"
            }
            Self::DilugDayOfMonth => "Number of days to add/subtract each month",
            Self::DilugHaflaga => "Number of days to add/subtract to the haflaga each entry",
            Self::HaflagaOnahs => "Number of onahs between entries",
            Self::Sirug => "Number of months separating the entries",
        }
    }
}

impl fmt::Display for KavuahType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An established recurring pattern.
///
/// The `setting_entry` is the entry whose occurrence established the pattern
/// (the 3rd or 4th of the detected sequence). The meaning of
/// `special_number` depends on the type; see [`KavuahType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kavuah {
    pub kavuah_type: KavuahType,
    pub setting_entry: Entry,
    pub special_number: i32,
    /// Does this kavuah cancel the generic Onah Beinonis flags?
    pub cancels_onah_beinunis: bool,
    pub active: bool,
    pub ignored: bool,
    /// Database id, assigned by the storage layer.
    pub id: Option<i64>,
}

/// A detected kavuah candidate together with the 3 or 4 entries that formed
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KavuahSuggestion {
    pub kavuah: Kavuah,
    pub entries: Vec<Entry>,
}

impl Kavuah {
    /// Creates an active, non-ignored kavuah that cancels Onah Beinonis.
    ///
    /// A `DilugDayOfMonth` with a zero delta is rejected outright: it would
    /// be a plain `DayOfMonth` and the month-rollover guard in the iteration
    /// projection assumes a signed, non-zero step.
    pub fn new(
        kavuah_type: KavuahType,
        setting_entry: Entry,
        special_number: i32,
    ) -> Result<Self, CoreError> {
        if kavuah_type == KavuahType::DilugDayOfMonth && special_number == 0 {
            return Err(CoreError::InvalidSpecialNumber {
                kind: "DilugDayOfMonth",
                value: special_number,
            });
        }
        Ok(Self {
            kavuah_type,
            setting_entry,
            special_number,
            cancels_onah_beinunis: true,
            active: true,
            ignored: false,
            id: None,
        })
    }

    /// Has this kavuah been assigned a database id?
    #[must_use]
    pub const fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// See [`KavuahType::is_independent`].
    #[must_use]
    pub const fn is_independent(&self) -> bool {
        self.kavuah_type.is_independent()
    }

    /// Same type, same setting onah, same special number. Used to filter
    /// suggestions that merely rediscover an existing kavuah.
    #[must_use]
    pub fn is_matching_kavuah(&self, other: &Self) -> bool {
        self.kavuah_type == other.kavuah_type
            && self.setting_entry.onah == other.setting_entry.onah
            && self.special_number == other.special_number
    }

    /// Advisory validation: does the special number plausibly describe the
    /// setting entry? An ill-formed kavuah can still be constructed; this is
    /// surfaced to the creating caller.
    #[must_use]
    pub fn special_number_matches_entry(&self) -> bool {
        if self.special_number == 0 {
            return false;
        }
        match self.kavuah_type {
            KavuahType::Haflagah | KavuahType::HaflagaMaayanPasuach => {
                self.special_number > 0
                    && self
                        .setting_entry
                        .haflaga
                        .is_none_or(|h| h == self.special_number)
            }
            KavuahType::DayOfMonth | KavuahType::DayOfMonthMaayanPasuach => {
                self.special_number > 0
                    && self.special_number <= 30
                    && self.special_number == i32::from(self.setting_entry.day())
            }
            KavuahType::HaflagaOnahs => self.special_number > 0,
            _ => true,
        }
    }

    /// Does the given entry continue this kavuah's pattern?
    ///
    /// `entries` is the chronologically sorted real-entry list; some types
    /// need it to find the entry's immediate predecessor. The entry's
    /// night/day must match the setting entry's, or the test fails
    /// immediately.
    #[must_use]
    pub fn is_entry_in_pattern(&self, entry: &Entry, entries: &[Entry], settings: &Settings) -> bool {
        if entry.night_day() != self.setting_entry.night_day() {
            return false;
        }
        match self.kavuah_type {
            KavuahType::Haflagah | KavuahType::HaflagaMaayanPasuach => {
                entry.haflaga == Some(self.special_number)
            }
            KavuahType::DayOfMonth | KavuahType::DayOfMonthMaayanPasuach => {
                i32::from(entry.day()) == self.special_number
            }
            KavuahType::Sirug => previous_of(entry, entries).is_some_and(|previous| {
                entry.day() == self.setting_entry.day()
                    && previous.date().diff_months(entry.date()) == self.special_number
            }),
            KavuahType::DilugHaflaga => previous_of(entry, entries).is_some_and(|previous| {
                match (entry.haflaga, previous.haflaga) {
                    (Some(h), Some(ph)) => h == ph + self.special_number,
                    _ => false,
                }
            }),
            KavuahType::DayOfWeek | KavuahType::DilugDayOfMonth => {
                independent_iterations(self, entry.date(), settings.dilug_chodesh_past_ends)
                    .contains(&entry.onah)
            }
            // Not independently verifiable from a single entry.
            KavuahType::HaflagaOnahs => false,
        }
    }

    /// Proposes the special number for a kavuah the user is creating by
    /// hand, from the chosen setting entry and type.
    #[must_use]
    pub fn default_special_number(
        setting_entry: &Entry,
        kavuah_type: KavuahType,
        entries: &[Entry],
    ) -> i32 {
        match kavuah_type {
            KavuahType::Haflagah | KavuahType::HaflagaMaayanPasuach => {
                setting_entry.haflaga.unwrap_or(0)
            }
            KavuahType::DayOfMonth | KavuahType::DayOfMonthMaayanPasuach => {
                i32::from(setting_entry.day())
            }
            KavuahType::HaflagaOnahs => previous_of(setting_entry, entries)
                .map_or(0, |previous| previous.onah_differential(setting_entry)),
            _ => 0,
        }
    }
}

impl fmt::Display for Kavuah {
    /// Formats as e.g. "Night-time every 30 days." with `[INACTIVE]` /
    /// `[IGNORED]` prefixes where applicable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.active {
            write!(f, "[INACTIVE] ")?;
        }
        if self.ignored {
            write!(f, "[IGNORED] ")?;
        }
        match self.setting_entry.night_day() {
            NightDay::Night => write!(f, "Night-time ")?,
            NightDay::Day => write!(f, "Day-time ")?,
        }
        let n = self.special_number;
        match self.kavuah_type {
            KavuahType::Haflagah => write!(f, "every {n} days")?,
            KavuahType::DayOfMonth => {
                write!(f, "on every {} day of the Jewish month", suffixed(n))?;
            }
            KavuahType::DayOfWeek => write!(
                f,
                "on the {} of every {} week",
                DOW_NAMES[usize::from(self.setting_entry.day_of_week()) % 7],
                suffixed(n / 7)
            )?,
            KavuahType::Sirug => write!(
                f,
                "on the {} day of every {} month",
                suffixed(i32::from(self.setting_entry.day())),
                suffixed(n)
            )?,
            KavuahType::HaflagaMaayanPasuach => {
                write!(f, "every {n} days (through Ma'ayan Pasuach)")?;
            }
            KavuahType::DayOfMonthMaayanPasuach => write!(
                f,
                "on the {} day of the Jewish month (through Ma'ayan Pasuach)",
                suffixed(n)
            )?,
            KavuahType::DilugHaflaga => write!(
                f,
                "of \"Dilug Haflaga\" in the interval pattern of \"{} {} days\"",
                if n < 0 { "subtract" } else { "add" },
                n.abs()
            )?,
            KavuahType::DilugDayOfMonth => write!(
                f,
                "of \"Dilug Yom Hachodesh\" in the interval pattern of \"{} {} days\"",
                if n < 0 { "subtract" } else { "add" },
                n.abs()
            )?,
            KavuahType::HaflagaOnahs => write!(f, "every {n} onahs")?,
        }
        write!(f, ".")
    }
}

/// Ordinal suffix: 1st, 2nd, 3rd, 4th...
fn suffixed(n: i32) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// The entry immediately preceding the given one in the sorted list, found
/// structurally by position.
fn previous_of<'a>(entry: &Entry, entries: &'a [Entry]) -> Option<&'a Entry> {
    let index = entries.iter().position(|e| e.is_same_entry(entry))?;
    index.checked_sub(1).map(|i| &entries[i])
}

/// The ordered list of theoretical onahs an independent kavuah predicts
/// between its setting entry and the cutoff date.
///
/// Non-independent types yield an empty list, as does a non-positive step
/// for the month/day stepping types (it would never reach the cutoff).
#[must_use]
pub fn independent_iterations(
    kavuah: &Kavuah,
    cutoff: JewishDate,
    dilug_chodesh_past_ends: bool,
) -> Vec<Onah> {
    match kavuah.kavuah_type {
        KavuahType::DayOfWeek => day_of_week_iterations(kavuah, cutoff),
        KavuahType::DilugDayOfMonth => {
            dilug_day_of_month_iterations(kavuah, cutoff, dilug_chodesh_past_ends)
        }
        KavuahType::Sirug | KavuahType::DayOfMonth | KavuahType::DayOfMonthMaayanPasuach => {
            let step = if kavuah.kavuah_type == KavuahType::Sirug {
                kavuah.special_number
            } else {
                1
            };
            if step <= 0 {
                return Vec::new();
            }
            let night_day = kavuah.setting_entry.night_day();
            let mut iterations = Vec::new();
            let mut next = kavuah.setting_entry.date();
            while next < cutoff {
                next = next.add_months(step);
                iterations.push(Onah::new(next, night_day));
            }
            iterations
        }
        _ => Vec::new(),
    }
}

fn day_of_week_iterations(kavuah: &Kavuah, cutoff: JewishDate) -> Vec<Onah> {
    if kavuah.special_number <= 0 {
        return Vec::new();
    }
    let night_day = kavuah.setting_entry.night_day();
    let mut iterations = Vec::new();
    let mut next = kavuah.setting_entry.date();
    while next < cutoff {
        next = next.add_days(kavuah.special_number);
        iterations.push(Onah::new(next, night_day));
    }
    iterations
}

fn dilug_day_of_month_iterations(
    kavuah: &Kavuah,
    cutoff: JewishDate,
    dilug_chodesh_past_ends: bool,
) -> Vec<Onah> {
    let setting_date = kavuah.setting_entry.date();
    let night_day = kavuah.setting_entry.night_day();
    let mut iterations = Vec::new();
    let mut next_month = setting_date;
    for i in 1.. {
        next_month = next_month.add_months(1);
        let iteration = next_month.add_days(kavuah.special_number * i);
        if iteration > cutoff || iteration <= setting_date {
            break;
        }
        // If the iteration's day has crossed the setting day in the
        // direction of the dilug, the increment has slid into a neighboring
        // month; stop there unless configured to keep going.
        if !dilug_chodesh_past_ends
            && (i32::from(kavuah.setting_entry.day()) - i32::from(iteration.day())).signum()
                == kavuah.special_number.signum()
        {
            break;
        }
        iterations.push(Onah::new(iteration, night_day));
    }
    iterations
}

/// Detected kavuah candidates from the real-entry list that are not already
/// covered by an active kavuah. Ignored kavuahs do not suppress a
/// resurfacing suggestion.
#[must_use]
pub fn get_possible_new_kavuahs(
    real_entry_list: &[Entry],
    kavuah_list: &[Kavuah],
    settings: &Settings,
) -> Vec<KavuahSuggestion> {
    let active: Vec<&Kavuah> = kavuah_list.iter().filter(|k| k.active).collect();
    get_kavuah_suggestion_list(real_entry_list, kavuah_list, settings)
        .into_iter()
        .filter(|s| !active.iter().any(|k| k.is_matching_kavuah(&s.kavuah)))
        .collect()
}

/// Works out all possible kavuahs from the given entries.
///
/// A single forward pass over the chronological real-entry list (entries
/// ignored for kavuah are skipped), keeping a sliding window of the last
/// four visited entries for the consecutive-entry pattern families.
#[must_use]
pub fn get_kavuah_suggestion_list(
    real_entry_list: &[Entry],
    previous_kavuahs: &[Kavuah],
    settings: &Settings,
) -> Vec<KavuahSuggestion> {
    let mut suggestions: Vec<KavuahSuggestion> = Vec::new();
    let mut window: Vec<&Entry> = Vec::new();

    for entry in real_entry_list.iter().filter(|e| !e.ignore_for_kavuah) {
        // Calendar-anchored patterns first; intervening entries don't matter.
        suggestions.extend(day_of_month_kavuah(entry, real_entry_list, settings));
        suggestions.extend(day_of_week_kavuahs(entry, real_entry_list, settings));

        // A three-entry Dilug Yom Hachodesh is only looked for when no
        // active DayOfMonth kavuah already explains this entry's day.
        // [Sha"ch yr"d 189, 7]
        let day_explained = previous_kavuahs.iter().any(|k| {
            k.active
                && k.kavuah_type == KavuahType::DayOfMonth
                && k.special_number == i32::from(entry.day())
        });
        if !day_explained {
            suggestions.extend(dilug_day_of_month_kavuah(entry, real_entry_list, settings));
        }

        window.push(entry);
        if window.len() > 4 {
            window.remove(0);
        }

        // Sirug needs just three entries in a row.
        if window.len() >= 3 {
            let last3 = &window[window.len() - 3..];
            if settings.kavuah_diff_onahs
                || (last3[0].night_day() == last3[1].night_day()
                    && last3[1].night_day() == last3[2].night_day())
            {
                suggestions.extend(sirug_kavuah(last3));
            }
        }

        if window.len() == 4 {
            // Haflaga patterns need the latter three entries on the same
            // night/day - the first of the four does not have to match.
            // [Nodah Biyehuda (2, 83); see Chazon Ish (85, 59-)]
            if settings.kavuah_diff_onahs
                || (window[1].night_day() == window[2].night_day()
                    && window[2].night_day() == window[3].night_day())
            {
                suggestions.extend(haflagah_kavuah(&window));
                suggestions.extend(dilug_haflagah_kavuah(&window));
            }
            // Haflaga of onahs covers exactly the case the day-count haflaga
            // misses: the middle two entries on differing onahs.
            if settings.haflaga_of_onahs && window[1].night_day() != window[2].night_day() {
                suggestions.extend(haflaga_onahs_kavuah(&window));
            }
        }
    }

    tracing::debug!(count = suggestions.len(), "kavuah suggestion pass complete");
    suggestions
}

/// A night/day match under the `kavuah_diff_onahs` relaxation.
fn onah_matches(a: &Entry, b: &Entry, settings: &Settings) -> bool {
    settings.kavuah_diff_onahs || a.night_day() == b.night_day()
}

/// An entry exactly one and exactly two Jewish months after the given one,
/// all on the same day of the month.
fn day_of_month_kavuah(
    entry: &Entry,
    entry_list: &[Entry],
    settings: &Settings,
) -> Option<KavuahSuggestion> {
    let next_month = entry.date().add_months(1);
    let third_month = next_month.add_months(1);
    let second = entry_list
        .iter()
        .find(|en| onah_matches(en, entry, settings) && en.date() == next_month)?;
    let third = entry_list
        .iter()
        .find(|en| onah_matches(en, entry, settings) && en.date() == third_month)?;
    let kavuah = Kavuah::new(
        KavuahType::DayOfMonth,
        third.clone(),
        i32::from(third_month.day()),
    )
    .ok()?;
    Some(KavuahSuggestion {
        kavuah,
        entries: vec![entry.clone(), second.clone(), third.clone()],
    })
}

/// A constant, non-zero month-over-month shift of the day of the month
/// across three consecutive months.
fn dilug_day_of_month_kavuah(
    entry: &Entry,
    entry_list: &[Entry],
    settings: &Settings,
) -> Option<KavuahSuggestion> {
    // Any entry in the next Jewish month - but not on the same day, as that
    // would be a plain DayOfMonth with no dilug.
    let next_month = entry.date().add_months(1);
    let second = entry_list.iter().find(|en| {
        onah_matches(en, entry, settings)
            && en.day() != next_month.day()
            && en.month() == next_month.month()
            && en.year() == next_month.year()
    })?;
    let third_month = entry.date().add_months(2);
    let dilug_days = i32::from(second.day()) - i32::from(entry.day());
    let third = entry_list.iter().find(|en| {
        onah_matches(en, entry, settings)
            && i32::from(en.day()) - i32::from(second.day()) == dilug_days
            && en.month() == third_month.month()
            && en.year() == third_month.year()
    })?;
    let kavuah = Kavuah::new(KavuahType::DilugDayOfMonth, third.clone(), dilug_days).ok()?;
    Some(KavuahSuggestion {
        kavuah,
        entries: vec![entry.clone(), second.clone(), third.clone()],
    })
}

/// Two later entries sharing the given entry's weekday at a constant
/// day-interval from it.
fn day_of_week_kavuahs(
    entry: &Entry,
    entry_list: &[Entry],
    settings: &Settings,
) -> Vec<KavuahSuggestion> {
    let mut list = Vec::new();
    for first_find in entry_list.iter().filter(|e| {
        onah_matches(e, entry, settings)
            && e.date() > entry.date()
            && e.day_of_week() == entry.day_of_week()
    }) {
        let interval = entry.date().diff_days(first_find.date());
        let next_date = first_find.date().add_days(interval);
        if entry.day_of_week() != next_date.day_of_week() {
            continue;
        }
        let second_find = entry_list
            .iter()
            .find(|en| onah_matches(en, entry, settings) && en.date() == next_date);
        if let Some(second_find) = second_find
            && let Ok(kavuah) = Kavuah::new(KavuahType::DayOfWeek, second_find.clone(), interval)
        {
            list.push(KavuahSuggestion {
                kavuah,
                entries: vec![entry.clone(), first_find.clone(), second_find.clone()],
            });
        }
    }
    list
}

/// Three equal consecutive haflagas across four entries.
fn haflagah_kavuah(four: &[&Entry]) -> Option<KavuahSuggestion> {
    let (Some(h1), Some(h2), Some(h3)) = (four[1].haflaga, four[2].haflaga, four[3].haflaga)
    else {
        return None;
    };
    if h1 != h2 || h2 != h3 {
        return None;
    }
    let kavuah = Kavuah::new(KavuahType::Haflagah, four[3].clone(), h3).ok()?;
    Some(KavuahSuggestion {
        kavuah,
        entries: four.iter().map(|e| (*e).clone()).collect(),
    })
}

/// Three equal consecutive onah-differentials across four entries.
fn haflaga_onahs_kavuah(four: &[&Entry]) -> Option<KavuahSuggestion> {
    let onahs = four[0].onah_differential(four[1]);
    if four[1].onah_differential(four[2]) != onahs || four[2].onah_differential(four[3]) != onahs {
        return None;
    }
    let kavuah = Kavuah::new(KavuahType::HaflagaOnahs, four[3].clone(), onahs).ok()?;
    Some(KavuahSuggestion {
        kavuah,
        entries: four.iter().map(|e| (*e).clone()).collect(),
    })
}

/// Three entries on the same day of the month at a constant month gap
/// greater than one. A gap of exactly one month is DayOfMonth's domain.
fn sirug_kavuah(three: &[&Entry]) -> Option<KavuahSuggestion> {
    let month_diff = three[0].date().diff_months(three[1].date());
    if month_diff <= 1
        || three[0].day() != three[1].day()
        || three[1].day() != three[2].day()
        || three[1].date().diff_months(three[2].date()) != month_diff
    {
        return None;
    }
    let kavuah = Kavuah::new(KavuahType::Sirug, three[2].clone(), month_diff).ok()?;
    Some(KavuahSuggestion {
        kavuah,
        entries: three.iter().map(|e| (*e).clone()).collect(),
    })
}

/// Two equal consecutive haflaga-deltas, non-zero (a zero delta is a plain
/// Haflagah kavuah).
fn dilug_haflagah_kavuah(four: &[&Entry]) -> Option<KavuahSuggestion> {
    let (Some(h1), Some(h2), Some(h3)) = (four[1].haflaga, four[2].haflaga, four[3].haflaga)
    else {
        return None;
    };
    let diff1 = h3 - h2;
    let diff2 = h2 - h1;
    if diff1 == 0 || diff1 != diff2 {
        return None;
    }
    let kavuah = Kavuah::new(KavuahType::DilugHaflaga, four[3].clone(), diff1).ok()?;
    Some(KavuahSuggestion {
        kavuah,
        entries: four.iter().map(|e| (*e).clone()).collect(),
    })
}

/// Active kavuahs whose pattern the given entry has broken, independent and
/// non-independent alike.
#[must_use]
pub fn find_broken_kavuahs<'a>(
    entry: &Entry,
    kavuah_list: &'a [Kavuah],
    entries: &[Entry],
    settings: &Settings,
) -> Vec<&'a Kavuah> {
    let mut broken = find_independent_brokens(entry.date(), kavuah_list, entries, settings);
    broken.extend(find_non_independent_brokens(
        entry, kavuah_list, entries, settings,
    ));
    broken
}

/// Independent kavuahs set before the given date whose last three
/// theoretical iterations all lack a matching actual entry.
#[must_use]
pub fn find_independent_brokens<'a>(
    jdate: JewishDate,
    kavuah_list: &'a [Kavuah],
    entries: &[Entry],
    settings: &Settings,
) -> Vec<&'a Kavuah> {
    kavuah_list
        .iter()
        .filter(|k| {
            k.active && !k.ignored && k.is_independent() && k.setting_entry.date() < jdate
        })
        .filter(|k| {
            let iterations = independent_iterations(k, jdate, settings.dilug_chodesh_past_ends);
            let last3 = &iterations[iterations.len().saturating_sub(3)..];
            last3.len() == 3
                && !last3
                    .iter()
                    .any(|onah| entries.iter().any(|e| e.onah == *onah))
        })
        .collect()
}

/// Non-independent kavuahs set before the last three entries, none of which
/// continues the pattern.
#[must_use]
pub fn find_non_independent_brokens<'a>(
    entry: &Entry,
    kavuah_list: &'a [Kavuah],
    entries: &[Entry],
    settings: &Settings,
) -> Vec<&'a Kavuah> {
    // Without at least two predecessors no kavuah can have been broken yet.
    let Some(index) = entries.iter().position(|e| e.is_same_entry(entry)) else {
        return Vec::new();
    };
    if index < 2 {
        return Vec::new();
    }
    let last_three = &entries[index - 2..=index];
    kavuah_list
        .iter()
        .filter(|k| {
            k.active
                && !k.ignored
                && !k.is_independent()
                && last_three
                    .iter()
                    .all(|e| e.date() > k.setting_entry.date())
        })
        .filter(|k| {
            !last_three
                .iter()
                .any(|e| k.is_entry_in_pattern(e, entries, settings))
        })
        .collect()
}

/// Active, Onah-Beinonis-cancelling, non-independent kavuahs that the given
/// entry alone is out of pattern with.
#[must_use]
pub fn find_out_of_pattern<'a>(
    entry: &Entry,
    kavuah_list: &'a [Kavuah],
    entries: &[Entry],
    settings: &Settings,
) -> Vec<&'a Kavuah> {
    kavuah_list
        .iter()
        .filter(|k| {
            k.cancels_onah_beinunis
                && k.active
                && !k.ignored
                && !k.is_independent()
                && k.setting_entry.date() < entry.date()
        })
        .filter(|k| !k.is_entry_in_pattern(entry, entries, settings))
        .collect()
}

/// Inactive kavuahs set before the given entry that the entry is back in
/// pattern with.
#[must_use]
pub fn find_reawakened_kavuahs<'a>(
    entry: &Entry,
    kavuah_list: &'a [Kavuah],
    entries: &[Entry],
    settings: &Settings,
) -> Vec<&'a Kavuah> {
    kavuah_list
        .iter()
        .filter(|k| !k.active && !k.ignored && k.setting_entry.date() < entry.date())
        .filter(|k| k.is_entry_in_pattern(entry, entries, settings))
        .collect()
}
