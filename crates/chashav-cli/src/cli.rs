//! Command-line argument definitions.

use std::path::PathBuf;

use chashav_core::NightDay;
use clap::{Parser, Subcommand, ValueEnum};

/// Halachic cycle tracker.
///
/// Records entries on half-day onahs, detects recurring kavuah patterns and
/// lists the flagged dates that require precaution.
#[derive(Debug, Parser)]
#[command(name = "chashav", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a new entry.
    Add {
        /// The date as `year-month-day` on the Jewish calendar (month 1 is
        /// Nissan), or on the secular calendar with `--secular`.
        date: String,

        /// Which half of the day the entry is on.
        #[arg(value_enum)]
        period: Period,

        /// Interpret the date as a secular calendar date.
        #[arg(long)]
        secular: bool,

        /// Exclude the entry from flagged-date generation.
        #[arg(long)]
        ignore_flagged: bool,

        /// Exclude the entry from kavuah pattern detection.
        #[arg(long)]
        ignore_kavuah: bool,

        /// Free-form note attached to the entry.
        #[arg(long)]
        comments: Option<String>,
    },

    /// List all entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove the entry at the given list index.
    Remove {
        /// Index as shown by `list`.
        index: usize,
    },

    /// Inspect kavuahs.
    Kavuahs {
        #[command(subcommand)]
        action: KavuahsAction,
    },

    /// Show the synthesized flagged dates.
    Flags {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Kavuah subcommands.
#[derive(Debug, Subcommand)]
pub enum KavuahsAction {
    /// List the stored kavuahs.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show kavuah candidates detected from the current entries.
    Suggest,
}

/// The half of the Jewish day an entry is recorded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    Night,
    Day,
}

impl From<Period> for NightDay {
    fn from(period: Period) -> Self {
        match period {
            Period::Night => Self::Night,
            Period::Day => Self::Day,
        }
    }
}
