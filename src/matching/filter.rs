use crate::core::panel::MarkerPanel;
use crate::core::profile::StrProfile;
use crate::core::types::PanelSize;

/// Cheap admissibility check run before [`compare`](crate::matching::distance::compare).
///
/// Rejects the query itself (same kit number), then counts the candidate's
/// present panel markers and stops as soon as the panel threshold is reached.
/// Only the candidate side is inspected, so every candidate the full
/// calculator would accept passes here too.
#[must_use]
pub fn is_candidate_viable(candidate: &StrProfile, query: &StrProfile, panel_size: PanelSize) -> bool {
    if candidate.kit_number == query.kit_number {
        return false;
    }

    let panel = MarkerPanel::for_size(panel_size);
    let required = panel.min_valid_markers();

    let mut valid = 0usize;
    for marker in panel.markers() {
        if candidate.has_marker(marker) {
            valid += 1;
            if valid >= required {
                return true;
            }
        }
    }

    false
}
