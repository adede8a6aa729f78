//! Profile builders shared by the matching unit tests.

use crate::core::panel::{multi_copy_count, MarkerPanel};
use crate::core::profile::StrProfile;
use crate::core::types::PanelSize;

/// A profile with a call for every marker of `panel`.
///
/// Single-copy markers read `14`; two-copy loci `11-14`; DYS464 `15-15-16-17`.
pub fn full_profile(kit: &str, panel: PanelSize) -> StrProfile {
    MarkerPanel::for_size(panel)
        .markers()
        .iter()
        .fold(StrProfile::new(kit), |profile, marker| {
            let value = match multi_copy_count(marker) {
                None => "14",
                Some(4) => "15-15-16-17",
                Some(_) => "11-14",
            };
            profile.with_marker(*marker, value)
        })
}

pub fn with_value(profile: StrProfile, marker: &str, value: &str) -> StrProfile {
    profile.with_marker(marker, value)
}
