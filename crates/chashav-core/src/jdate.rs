//! Jewish calendar date arithmetic.
//!
//! The conversion algorithms follow the classic "Calendrical Calculations"
//! formulation (Dershowitz & Reingold). A date is anchored to its absolute
//! day ordinal - the number of days elapsed since the theoretical date
//! Sunday, December 31, 1 BCE - which is the same day numbering chrono uses
//! for `num_days_from_ce`, so conversion to and from the secular calendar is
//! a single integer hop.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// English month names, indexed by month number (Nissan = 1, Adar Sheini = 13).
const MONTH_NAMES: [&str; 14] = [
    "",
    "Nissan",
    "Iyar",
    "Sivan",
    "Tammuz",
    "Av",
    "Ellul",
    "Tishrei",
    "Cheshvan",
    "Kislev",
    "Teves",
    "Shvat",
    "Adar",
    "Adar Sheini",
];

/// A single day in the Jewish calendar.
///
/// Months are numbered as in the Torah: Nissan is 1 and Adar Sheini is 13.
/// Note that the year number changes at Tishrei (month 7), so ordering within
/// a year does not follow the month number; all comparisons go through the
/// absolute day ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JewishDate {
    year: i32,
    month: u8,
    day: u8,
    abs: i32,
}

impl JewishDate {
    /// Creates a date from a Jewish year, month and day.
    ///
    /// Returns an error if the month does not exist in the given year or the
    /// day is out of range for that month.
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, CoreError> {
        if year < 1
            || month < 1
            || u32::from(month) > months_in_year(year)
            || day < 1
            || u32::from(day) > days_in_month(year, month)
        {
            return Err(CoreError::InvalidDate { year, month, day });
        }
        Ok(Self {
            year,
            month,
            day,
            abs: abs_from_ymd(year, month, day),
        })
    }

    /// Creates a date from an absolute day ordinal.
    #[must_use]
    pub fn from_abs(abs: i32) -> Self {
        // Start the year search a few years before the target date.
        let mut year = 3761 + abs / if abs > 0 { 366 } else { 300 };
        while abs >= abs_from_ymd(year + 1, 7, 1) {
            year += 1;
        }
        // Search forward for the month from either Tishrei or Nissan.
        let mut month: u8 = if abs < abs_from_ymd(year, 1, 1) { 7 } else { 1 };
        while abs > abs_from_ymd(year, month, days_in_month(year, month) as u8) {
            month += 1;
        }
        let day = (abs - abs_from_ymd(year, month, 1) + 1) as u8;
        Self {
            year,
            month,
            day,
            abs,
        }
    }

    /// The Jewish date at the start of the given secular day.
    #[must_use]
    pub fn from_secular(date: NaiveDate) -> Self {
        Self::from_abs(date.num_days_from_ce())
    }

    /// The current Jewish date per the system clock.
    #[must_use]
    pub fn today() -> Self {
        Self::from_secular(chrono::Local::now().date_naive())
    }

    /// The secular date that starts at midnight of this Jewish date.
    #[must_use]
    pub fn to_secular(self) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(self.abs)
            .unwrap_or(NaiveDate::MIN)
    }

    /// The absolute day ordinal (days since December 31, 1 BCE).
    #[must_use]
    pub const fn abs(self) -> i32 {
        self.abs
    }

    /// The number of years since creation.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// The Jewish month. Nissan is 1 and Adar Sheini is 13.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// The day of the Jewish month (1 - 30).
    #[must_use]
    pub const fn day(self) -> u8 {
        self.day
    }

    /// The day of the week. Sunday is 0 and Shabbos is 6.
    #[must_use]
    pub const fn day_of_week(self) -> u8 {
        (self.abs.rem_euclid(7)) as u8
    }

    /// The date the given number of days after this one (negative goes back).
    #[must_use]
    pub fn add_days(self, days: i32) -> Self {
        Self::from_abs(self.abs + days)
    }

    /// The date the given number of Jewish months after this one.
    ///
    /// If the current day is 30 and the destination month has only 29 days,
    /// the 29th of the month is returned.
    #[must_use]
    pub fn add_months(self, months: i32) -> Self {
        let mut year = self.year;
        let mut month = u32::from(self.month);
        let mut miy = months_in_year(year);

        for _ in 0..months.abs() {
            if months > 0 {
                month += 1;
                if month > miy {
                    month = 1;
                }
                if month == 7 {
                    year += 1;
                    miy = months_in_year(year);
                }
            } else {
                month -= 1;
                if month == 0 {
                    month = miy;
                }
                if month == 6 {
                    year -= 1;
                    miy = months_in_year(year);
                }
            }
        }
        let mut day = self.day;
        if day == 30 && days_in_month(year, month as u8) == 29 {
            day = 29;
        }
        // The clamping above keeps the components in range.
        Self::from_ymd(year, month as u8, day).unwrap_or_else(|_| Self::from_abs(self.abs))
    }

    /// The date the given number of Jewish years after this one, clamping
    /// month 13 and day 30 where the destination year comes up short.
    #[must_use]
    pub fn add_years(self, years: i32) -> Self {
        let year = self.year + years;
        let mut month = self.month;
        let mut day = self.day;

        if month == 13 && !is_leap_year(year) {
            month = 12;
        } else if month == 8 && day == 30 && !is_long_cheshvan(year) {
            month = 9;
            day = 1;
        } else if month == 9 && day == 30 && is_short_kislev(year) {
            month = 10;
            day = 1;
        }
        if day == 30 && days_in_month(year, month) == 29 {
            day = 29;
        }
        Self::from_ymd(year, month, day).unwrap_or_else(|_| Self::from_abs(self.abs))
    }

    /// Days separating this date and the given one; negative if `other` is
    /// earlier.
    #[must_use]
    pub const fn diff_days(self, other: Self) -> i32 {
        other.abs - self.abs
    }

    /// Whole Jewish months separating this date and the given one, ignoring
    /// the day of the month: the 29th of one month to the 1st of the next is
    /// a difference of one. Negative if `other` is earlier.
    #[must_use]
    pub fn diff_months(self, other: Self) -> i32 {
        let mut month = u32::from(other.month);
        let mut year = other.year;
        let mut months = 0;

        while !(year == self.year && month == u32::from(self.month)) {
            if self.abs > other.abs {
                months -= 1;
                month += 1;
                if month > months_in_year(year) {
                    month = 1;
                } else if month == 7 {
                    year += 1;
                }
            } else {
                months += 1;
                if month == 1 {
                    month = months_in_year(year);
                } else {
                    month -= 1;
                    if month == 6 {
                        year -= 1;
                    }
                }
            }
        }
        months
    }

    /// The English month name, e.g. "Nissan".
    #[must_use]
    pub fn month_name(self) -> &'static str {
        MONTH_NAMES[usize::from(self.month)]
    }
}

impl Ord for JewishDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.abs.cmp(&other.abs)
    }
}

impl PartialOrd for JewishDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for JewishDate {
    /// Formats as "Nissan 10, 5780".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}", self.month_name(), self.day, self.year)
    }
}

/// Does the given Jewish year have 13 months?
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (7 * year + 1).rem_euclid(19) < 7
}

/// The number of months in the given Jewish year.
#[must_use]
pub const fn months_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 13 } else { 12 }
}

/// The number of days in the given Jewish month. Nissan is 1.
#[must_use]
pub const fn days_in_month(year: i32, month: u8) -> u32 {
    match month {
        // Nissan, Sivan, Av, Tishrei and Shvat always have 30 days
        1 | 3 | 5 | 7 | 11 => 30,
        // Iyar, Tammuz, Ellul, Teves and Adar Sheini always have 29 days
        2 | 4 | 6 | 10 | 13 => 29,
        8 => {
            if is_long_cheshvan(year) {
                30
            } else {
                29
            }
        }
        9 => {
            if is_short_kislev(year) {
                29
            } else {
                30
            }
        }
        // Adar has 29 days unless it is Adar Rishon of a leap year
        12 => {
            if is_leap_year(year) {
                30
            } else {
                29
            }
        }
        _ => 0,
    }
}

/// The number of days in the given Jewish year.
#[must_use]
pub const fn days_in_year(year: i32) -> i64 {
    elapsed_days(year + 1) - elapsed_days(year)
}

/// Does Cheshvan of the given year have 30 days?
#[must_use]
pub const fn is_long_cheshvan(year: i32) -> bool {
    days_in_year(year) % 10 == 5
}

/// Does Kislev of the given year have 29 days?
#[must_use]
pub const fn is_short_kislev(year: i32) -> bool {
    days_in_year(year) % 10 == 3
}

/// Elapsed days from the epoch of creation until Rosh Hashana of the given
/// year, including the molad postponement rules.
const fn elapsed_days(year: i32) -> i64 {
    let y = (year - 1) as i64;
    // Months in complete 19-year cycles plus this partial cycle, with the
    // leap months interleaved per the 7-in-19 rule.
    let months = 235 * (y / 19) + 12 * (y % 19) + (7 * (y % 19) + 1) / 19;
    let parts = 204 + 793 * (months % 1080);
    let hours = 5 + 12 * months + 793 * (months / 1080) + parts / 1080;
    let conj_day = 1 + 29 * months + hours / 24;
    let conj_parts = 1080 * (hours % 24) + parts % 1080;

    // Postpone Rosh Hashana a day when the molad falls at or after midday,
    // or on the afternoons that would force an impossible year length.
    let mut alt_day = conj_day;
    if conj_parts >= 19440
        || (conj_day % 7 == 2 && conj_parts >= 9924 && !is_leap_year(year))
        || (conj_day % 7 == 1 && conj_parts >= 16789 && is_leap_year(year - 1))
    {
        alt_day += 1;
    }
    // Lo ADU Rosh: never Sunday, Wednesday or Friday.
    if matches!(alt_day % 7, 0 | 3 | 5) {
        alt_day += 1;
    }
    alt_day
}

/// The absolute day ordinal of the given Jewish date.
fn abs_from_ymd(year: i32, month: u8, day: u8) -> i32 {
    let mut day_in_year = i64::from(day);
    if month < 7 {
        // Before Tishrei: add the months from Tishrei through year end, then
        // from Nissan up to the given month.
        let mut m = 7;
        while m <= months_in_year(year) as u8 {
            day_in_year += i64::from(days_in_month(year, m));
            m += 1;
        }
        m = 1;
        while m < month {
            day_in_year += i64::from(days_in_month(year, m));
            m += 1;
        }
    } else {
        let mut m = 7;
        while m < month {
            day_in_year += i64::from(days_in_month(year, m));
            m += 1;
        }
    }
    (day_in_year + elapsed_days(year) - 1_373_429) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_secular_anchor() {
        // Rosh Hashana 5780 was Monday, September 30, 2019.
        let rh = JewishDate::from_ymd(5780, 7, 1).unwrap();
        assert_eq!(rh.abs(), 737_332);
        assert_eq!(rh.day_of_week(), 1);
        assert_eq!(
            rh.to_secular(),
            NaiveDate::from_ymd_opt(2019, 9, 30).unwrap()
        );
    }

    #[test]
    fn secular_round_trip() {
        let secular = NaiveDate::from_ymd_opt(2020, 3, 26).unwrap();
        let jd = JewishDate::from_secular(secular);
        assert_eq!((jd.year(), jd.month(), jd.day()), (5780, 1, 1));
        assert_eq!(jd.to_secular(), secular);
    }

    #[test]
    fn abs_round_trip() {
        for (y, m, d) in [(5780, 1, 10), (5780, 7, 1), (5779, 13, 29), (5784, 9, 30)] {
            let jd = JewishDate::from_ymd(y, m, d).unwrap();
            assert_eq!(JewishDate::from_abs(jd.abs()), jd);
        }
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(5779));
        assert!(!is_leap_year(5780));
        assert!(is_leap_year(5782));
        assert_eq!(months_in_year(5779), 13);
        assert_eq!(months_in_year(5780), 12);
    }

    #[test]
    fn year_5780_is_complete() {
        assert_eq!(days_in_year(5780), 355);
        assert!(is_long_cheshvan(5780));
        assert!(!is_short_kislev(5780));
    }

    #[test]
    fn from_ymd_rejects_out_of_range() {
        assert!(JewishDate::from_ymd(5780, 13, 1).is_err());
        assert!(JewishDate::from_ymd(5779, 13, 1).is_ok());
        assert!(JewishDate::from_ymd(5780, 2, 30).is_err());
        assert!(JewishDate::from_ymd(5780, 0, 1).is_err());
        assert!(JewishDate::from_ymd(5780, 1, 0).is_err());
    }

    #[test]
    fn add_days_crosses_year_boundary() {
        let erev = JewishDate::from_ymd(5780, 6, 29).unwrap();
        let rh = erev.add_days(1);
        assert_eq!((rh.year(), rh.month(), rh.day()), (5781, 7, 1));
        assert_eq!(rh.add_days(-1), erev);
    }

    #[test]
    fn add_months_clamps_day_thirty() {
        // Nissan has 30 days, Iyar only 29.
        let jd = JewishDate::from_ymd(5780, 1, 30).unwrap();
        let next = jd.add_months(1);
        assert_eq!((next.month(), next.day()), (2, 29));
    }

    #[test]
    fn add_months_increments_year_at_tishrei() {
        let ellul = JewishDate::from_ymd(5780, 6, 10).unwrap();
        let tishrei = ellul.add_months(1);
        assert_eq!((tishrei.year(), tishrei.month()), (5781, 7));
        let back = tishrei.add_months(-1);
        assert_eq!((back.year(), back.month()), (5780, 6));
    }

    #[test]
    fn diff_months_ignores_day_of_month() {
        let a = JewishDate::from_ymd(5780, 6, 29).unwrap();
        let b = JewishDate::from_ymd(5781, 7, 1).unwrap();
        assert_eq!(a.diff_months(b), 1);
        assert_eq!(b.diff_months(a), -1);
        assert_eq!(a.diff_months(a), 0);
    }

    #[test]
    fn diff_days_is_signed() {
        let a = JewishDate::from_ymd(5780, 1, 10).unwrap();
        let b = a.add_days(30);
        assert_eq!(a.diff_days(b), 30);
        assert_eq!(b.diff_days(a), -30);
    }

    #[test]
    fn ordering_follows_abs_not_month_number() {
        // Tishrei (month 7) of a year precedes Nissan (month 1) of that year.
        let tishrei = JewishDate::from_ymd(5780, 7, 1).unwrap();
        let nissan = JewishDate::from_ymd(5780, 1, 1).unwrap();
        assert!(tishrei < nissan);
    }

    #[test]
    fn display_format() {
        let jd = JewishDate::from_ymd(5780, 1, 10).unwrap();
        assert_eq!(jd.to_string(), "Nissan 10, 5780");
    }
}
