//! The flagged-date output value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::jdate::JewishDate;
use crate::onah::{NightDay, Onah};

/// A single reason a single onah requires precaution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemFlag {
    pub jdate: JewishDate,
    pub night_day: NightDay,
    pub description: String,
}

impl ProblemFlag {
    /// Creates a flag. The description must be non-empty.
    pub fn new(
        jdate: JewishDate,
        night_day: NightDay,
        description: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let description = description.into();
        if description.is_empty() {
            return Err(CoreError::Empty {
                field: "problem flag description",
            });
        }
        Ok(Self {
            jdate,
            night_day,
            description,
        })
    }

    /// The onah this flag is attached to.
    #[must_use]
    pub const fn onah(&self) -> Onah {
        Onah::new(self.jdate, self.night_day)
    }

    /// Structural equality: same date, same half-day, same description.
    #[must_use]
    pub fn is_same_prob(&self, other: &Self) -> bool {
        self == other
    }
}

impl fmt::Display for ProblemFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// All the problems of a single onah.
///
/// Multiple flags landing on one onah are merged into one of these; a given
/// onah never appears twice in a synthesized list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemOnah {
    pub onah: Onah,
    pub flags: Vec<ProblemFlag>,
}

impl ProblemOnah {
    #[must_use]
    pub const fn new(onah: Onah) -> Self {
        Self {
            onah,
            flags: Vec::new(),
        }
    }

    /// Is the given problem on the same onah with at least all of this one's
    /// flags?
    #[must_use]
    pub fn is_same_prob(&self, other: &Self) -> bool {
        self.onah == other.onah
            && self
                .flags
                .iter()
                .all(|f| other.flags.iter().any(|of| of.is_same_prob(f)))
    }

    /// Sorts a problem list into canonical order: ascending date, night
    /// before day.
    pub fn sort_prob_list(probs: &mut [Self]) {
        probs.sort_by_key(|p| p.onah);
    }

    /// The problems pertaining to the given calendar date (either onah).
    #[must_use]
    pub fn probs_for_date(jdate: JewishDate, probs: &[Self]) -> Vec<Self> {
        probs
            .iter()
            .filter(|p| p.onah.jdate == jdate)
            .cloned()
            .collect()
    }
}

impl fmt::Display for ProblemOnah {
    /// Each flag on its own line, prefixed with a marker.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The {} of {} is:", self.onah.night_day, self.onah.jdate)?;
        for flag in &self.flags {
            write!(f, "\n  > {flag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u8) -> JewishDate {
        JewishDate::from_ymd(5780, 1, day).unwrap()
    }

    #[test]
    fn flag_rejects_empty_description() {
        assert!(ProblemFlag::new(date(10), NightDay::Night, "").is_err());
        assert!(ProblemFlag::new(date(10), NightDay::Night, "Thirtieth Day").is_ok());
    }

    #[test]
    fn subset_style_is_same_prob() {
        let flag = |desc: &str| ProblemFlag::new(date(10), NightDay::Night, desc).unwrap();
        let mut a = ProblemOnah::new(Onah::new(date(10), NightDay::Night));
        a.flags.push(flag("Thirtieth Day"));
        let mut b = a.clone();
        b.flags.push(flag("Haflaga"));

        // a's flags are a subset of b's, but not the reverse.
        assert!(a.is_same_prob(&b));
        assert!(!b.is_same_prob(&a));
    }

    #[test]
    fn sort_is_canonical() {
        let mut probs = vec![
            ProblemOnah::new(Onah::new(date(12), NightDay::Night)),
            ProblemOnah::new(Onah::new(date(10), NightDay::Day)),
            ProblemOnah::new(Onah::new(date(10), NightDay::Night)),
        ];
        ProblemOnah::sort_prob_list(&mut probs);
        assert_eq!(probs[0].onah, Onah::new(date(10), NightDay::Night));
        assert_eq!(probs[1].onah, Onah::new(date(10), NightDay::Day));
        assert_eq!(probs[2].onah, Onah::new(date(12), NightDay::Night));
    }

    #[test]
    fn probs_for_date_filters_by_exact_date() {
        let probs = vec![
            ProblemOnah::new(Onah::new(date(10), NightDay::Night)),
            ProblemOnah::new(Onah::new(date(10), NightDay::Day)),
            ProblemOnah::new(Onah::new(date(12), NightDay::Night)),
        ];
        assert_eq!(ProblemOnah::probs_for_date(date(10), &probs).len(), 2);
        assert_eq!(ProblemOnah::probs_for_date(date(11), &probs).len(), 0);
    }
}
