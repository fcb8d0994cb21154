//! The half-day unit of observation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::jdate::JewishDate;

/// Which half of the Jewish day an onah covers.
///
/// The Jewish day begins at nightfall, so `Night` sorts before `Day` on the
/// same calendar date. The canonical entry ordering everywhere in this crate
/// relies on that.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NightDay {
    Night,
    Day,
}

impl NightDay {
    /// The other half of the day.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Night => Self::Day,
            Self::Day => Self::Night,
        }
    }

    /// String representation for display and database storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::Day => "day",
        }
    }
}

impl fmt::Display for NightDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either the night-time or the day-time of a single Jewish date.
///
/// Immutable value; equality means the same calendar date and the same half
/// of the day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Onah {
    pub jdate: JewishDate,
    pub night_day: NightDay,
}

impl Onah {
    #[must_use]
    pub const fn new(jdate: JewishDate, night_day: NightDay) -> Self {
        Self { jdate, night_day }
    }

    /// The onah directly before this one.
    #[must_use]
    pub fn previous(self) -> Self {
        match self.night_day {
            NightDay::Day => Self::new(self.jdate, NightDay::Night),
            NightDay::Night => Self::new(self.jdate.add_days(-1), NightDay::Day),
        }
    }

    /// The onah directly after this one.
    #[must_use]
    pub fn next(self) -> Self {
        match self.night_day {
            NightDay::Night => Self::new(self.jdate, NightDay::Day),
            NightDay::Day => Self::new(self.jdate.add_days(1), NightDay::Night),
        }
    }

    /// The onah the given number of half-day steps away; negative steps go
    /// backward.
    #[must_use]
    pub fn add_onahs(self, count: i32) -> Self {
        if count == 0 {
            return self;
        }
        // Whole days first - each day is two onahs - then one residual
        // half-step at most.
        let full_days = count / 2;
        let mut onah = Self::new(self.jdate.add_days(full_days), self.night_day);
        let residual = count - full_days * 2;
        if residual > 0 {
            onah = onah.next();
        } else if residual < 0 {
            onah = onah.previous();
        }
        onah
    }
}

impl fmt::Display for Onah {
    /// Formats as "the night of Nissan 10, 5780".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the {} of {}", self.night_day, self.jdate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onah(month: u8, day: u8, night_day: NightDay) -> Onah {
        Onah::new(JewishDate::from_ymd(5780, month, day).unwrap(), night_day)
    }

    #[test]
    fn night_sorts_before_day() {
        assert!(onah(1, 10, NightDay::Night) < onah(1, 10, NightDay::Day));
    }

    #[test]
    fn next_and_previous_are_inverses() {
        let o = onah(1, 10, NightDay::Night);
        assert_eq!(o.next().previous(), o);
        assert_eq!(o.previous().next(), o);
    }

    #[test]
    fn next_crosses_into_the_following_night() {
        let day = onah(1, 10, NightDay::Day);
        let next = day.next();
        assert_eq!(next.night_day, NightDay::Night);
        assert_eq!(next.jdate.day(), 11);
    }

    #[test]
    fn previous_from_night_lands_on_prior_day() {
        let night = onah(1, 10, NightDay::Night);
        let prev = night.previous();
        assert_eq!(prev.night_day, NightDay::Day);
        assert_eq!(prev.jdate.day(), 9);
    }

    #[test]
    fn add_onahs_by_whole_days() {
        let o = onah(1, 10, NightDay::Night);
        let moved = o.add_onahs(4);
        assert_eq!(moved.jdate.day(), 12);
        assert_eq!(moved.night_day, NightDay::Night);
    }

    #[test]
    fn add_onahs_with_residual_half_step() {
        let o = onah(1, 10, NightDay::Night);
        let moved = o.add_onahs(5);
        assert_eq!(moved.jdate.day(), 12);
        assert_eq!(moved.night_day, NightDay::Day);
    }

    #[test]
    fn add_onahs_negative_steps_back() {
        let o = onah(1, 10, NightDay::Day);
        assert_eq!(o.add_onahs(-1), onah(1, 10, NightDay::Night));
        assert_eq!(o.add_onahs(-2), onah(1, 9, NightDay::Day));
        assert_eq!(o.add_onahs(0), o);
    }
}
