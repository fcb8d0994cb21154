//! Halachic policy switches consumed by detection and flag synthesis.

use serde::{Deserialize, Serialize};

/// The configurable halachic behavior of the engine.
///
/// Defaults follow common practice; every switch is persisted by the storage
/// layer and surfaced to the user for their posek's ruling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Flag the onah preceding each flagged onah (Ohr Zeruah).
    pub show_ohr_zeruah: bool,
    /// Flag the 31st day in addition to the 30th.
    pub keep_thirty_one: bool,
    /// Onah Beinonis flags cover the whole day, not only the entry's onah.
    pub onah_beinunis_24_hours: bool,
    /// How many months ahead kavuah projections are flagged.
    pub number_months_ahead_to_warn: u32,
    /// The Ta"z: keep flagging day 30/31 and any haflaga that was not
    /// surpassed afterwards, even past intervening entries.
    pub keep_longer_haflagah: bool,
    /// Continue incrementing Dilug Yom Hachodesh kavuahs into another month.
    pub dilug_chodesh_past_ends: bool,
    /// Detect the Shulchan Aruch Harav's haflaga-of-onahs kavuah.
    pub haflaga_of_onahs: bool,
    /// Allow kavuah patterns across entries with differing night/day onahs.
    pub kavuah_diff_onahs: bool,
    /// Run kavuah detection automatically when an entry is added.
    pub calc_kavuahs_on_new_entry: bool,
    /// Include ignored kavuahs in listings.
    pub show_ignored_kavuahs: bool,
    /// Only project flags forward of the latest entry.
    pub no_probs_after_entry: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_ohr_zeruah: true,
            keep_thirty_one: true,
            onah_beinunis_24_hours: true,
            number_months_ahead_to_warn: 12,
            keep_longer_haflagah: false,
            dilug_chodesh_past_ends: true,
            haflaga_of_onahs: false,
            kavuah_diff_onahs: false,
            calc_kavuahs_on_new_entry: true,
            show_ignored_kavuahs: false,
            no_probs_after_entry: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_common_practice() {
        let s = Settings::default();
        assert!(s.keep_thirty_one);
        assert!(s.onah_beinunis_24_hours);
        assert!(!s.keep_longer_haflagah);
        assert!(!s.kavuah_diff_onahs);
        assert_eq!(s.number_months_ahead_to_warn, 12);
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"keep_thirty_one": false}"#).unwrap();
        assert!(!s.keep_thirty_one);
        assert!(s.onah_beinunis_24_hours);
    }
}
