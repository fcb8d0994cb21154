//! Core domain logic for the cycle-observation tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Jewish calendar arithmetic (`jdate`)
//! - The half-day observation unit and records (`onah`, `entry`, `entry_list`)
//! - Recurring-pattern detection, validation and projection (`kavuah`)
//! - Synthesis of the flagged problem-onah list (`flagging`, `problem`)
//!
//! Everything here is synchronous and side-effect-free. The caller owns the
//! entry and kavuah collections and sequences recomputation explicitly:
//! mutate, then [`EntryList::calculate_haflagas`], then detection and
//! [`EntryList::problem_onahs`].

use thiserror::Error;

pub mod entry;
pub mod entry_list;
pub mod flagging;
pub mod jdate;
pub mod kavuah;
pub mod onah;
pub mod problem;
pub mod settings;

pub use entry::Entry;
pub use entry_list::EntryList;
pub use flagging::FlaggedDatesGenerator;
pub use jdate::JewishDate;
pub use kavuah::{Kavuah, KavuahSuggestion, KavuahType};
pub use onah::{NightDay, Onah};
pub use problem::{ProblemFlag, ProblemOnah};
pub use settings::Settings;

/// Construction-time validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The date components do not name an existing Jewish day.
    #[error("invalid Jewish date: year {year}, month {month}, day {day}")]
    InvalidDate { year: i32, month: u8, day: u8 },

    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The special number is outside the domain of the kavuah type.
    #[error("special number {value} is not valid for a {kind} kavuah")]
    InvalidSpecialNumber {
        kind: &'static str,
        value: i32,
    },

    /// An unknown numeric kavuah type code was read from storage.
    #[error("unknown kavuah type code: {0}")]
    UnknownTypeCode(i64),
}
