use crate::core::panel::{is_multi_copy, MarkerPanel};
use crate::core::profile::StrProfile;
use crate::core::types::{CalculationMode, PanelSize};

/// Separators between the alleles of a multi-copy value
const ALLELE_SEPARATORS: [char; 3] = ['-', ',', '/'];

/// Most alleles a multi-copy value may carry and still be compared
const MAX_ALLELES: usize = 8;

/// Safely convert usize to f64 for percentage calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Outcome of comparing two profiles over one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceResult {
    /// Sum of per-marker mutation steps over compared markers
    pub distance: u32,

    /// Markers with a usable value on both sides
    pub compared_markers: usize,

    /// Compared markers with zero difference
    pub identical_markers: usize,

    /// `compared_markers` reached the panel's minimum-valid-marker threshold
    pub has_all_required_markers: bool,
}

impl DistanceResult {
    /// Identical markers as a percentage of compared markers (0 when nothing was compared)
    #[must_use]
    pub fn percent_identical(&self) -> f64 {
        if self.compared_markers == 0 {
            0.0
        } else {
            count_to_f64(self.identical_markers) / count_to_f64(self.compared_markers) * 100.0
        }
    }
}

/// Genetic distance between a query and a candidate over a panel.
///
/// Only the panel's markers are visited. A marker is compared when both
/// profiles carry a present value that parses as alleles; anything else just
/// shrinks `compared_markers`, so this never fails.
#[must_use]
pub fn compare(
    query: &StrProfile,
    candidate: &StrProfile,
    panel_size: PanelSize,
    mode: CalculationMode,
) -> DistanceResult {
    let panel = MarkerPanel::for_size(panel_size);

    let mut distance = 0u32;
    let mut compared_markers = 0usize;
    let mut identical_markers = 0usize;

    for &marker in panel.markers() {
        let (Some(query_value), Some(candidate_value)) =
            (query.marker_value(marker), candidate.marker_value(marker))
        else {
            continue;
        };

        let Some(steps) = marker_difference(&query_value, &candidate_value, marker, mode) else {
            continue;
        };

        compared_markers += 1;
        distance = distance.saturating_add(steps);
        if steps == 0 {
            identical_markers += 1;
        }
    }

    DistanceResult {
        distance,
        compared_markers,
        identical_markers,
        has_all_required_markers: compared_markers >= panel.min_valid_markers(),
    }
}

/// Mutation steps between two values of the same marker.
///
/// Returns `None` when either value does not parse, when a single-copy
/// marker carries more than one allele, or when a multi-copy value carries
/// more than `MAX_ALLELES`.
#[must_use]
pub fn marker_difference(
    value_a: &str,
    value_b: &str,
    marker: &str,
    mode: CalculationMode,
) -> Option<u32> {
    let mut alleles_a = parse_alleles(value_a)?;
    let mut alleles_b = parse_alleles(value_b)?;

    if !is_multi_copy(marker) {
        if alleles_a.len() != 1 || alleles_b.len() != 1 {
            return None;
        }
        return Some(allele_steps(alleles_a[0], alleles_b[0]));
    }
    if alleles_a.len() > MAX_ALLELES || alleles_b.len() > MAX_ALLELES {
        return None;
    }

    alleles_a.sort_unstable();
    alleles_b.sort_unstable();

    match mode {
        CalculationMode::Standard => Some(u32::from(alleles_a != alleles_b)),
        CalculationMode::Extended => Some(min_pairing_steps(&alleles_a, &alleles_b)),
    }
}

/// Parse an allele such as `13` or `17.2` into tenths of a repeat
fn parse_allele(s: &str) -> Option<u32> {
    let s = s.trim();
    let (whole, fraction) = match s.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (s, None),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: u32 = whole.parse().ok()?;

    let tenths = match fraction {
        None => 0,
        Some(f) if f.len() == 1 && f.bytes().all(|b| b.is_ascii_digit()) => f.parse().ok()?,
        Some(_) => return None,
    };

    whole.checked_mul(10)?.checked_add(tenths)
}

/// Parse a possibly composite value into its alleles
fn parse_alleles(value: &str) -> Option<Vec<u32>> {
    value.split(ALLELE_SEPARATORS).map(parse_allele).collect()
}

/// Whole mutation steps between two alleles; partial repeats round up
fn allele_steps(a: u32, b: u32) -> u32 {
    a.abs_diff(b).div_ceil(10)
}

/// Minimum steps over all pairings of two allele sets.
///
/// Every allele of the shorter set is assigned to a distinct allele of the
/// longer one; every copy left unassigned adds one step. Partial repeats are
/// rounded per pair, so sorted order is not always the cheapest.
fn min_pairing_steps(a: &[u32], b: &[u32]) -> u32 {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let unmatched = u32::try_from(long.len() - short.len()).unwrap_or(u32::MAX);

    // best[mask] = cheapest assignment of the first popcount(mask) short
    // alleles onto the long alleles whose bits are set in mask
    let mut best = vec![u32::MAX; 1 << long.len()];
    best[0] = 0;
    let mut cheapest = u32::MAX;

    for mask in 0..best.len() {
        let cost = best[mask];
        if cost == u32::MAX {
            continue;
        }
        let assigned = mask.count_ones() as usize;
        let Some(&allele) = short.get(assigned) else {
            cheapest = cheapest.min(cost);
            continue;
        };
        for (j, &other) in long.iter().enumerate() {
            let bit = 1 << j;
            if mask & bit == 0 {
                let slot = &mut best[mask | bit];
                *slot = (*slot).min(cost.saturating_add(allele_steps(allele, other)));
            }
        }
    }

    cheapest.saturating_add(unmatched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::testutil::{full_profile, with_value};

    #[test]
    fn test_identical_profiles_have_zero_distance() {
        for panel in PanelSize::ALL {
            let query = full_profile("Q", panel);
            let candidate = full_profile("C", panel);
            let result = compare(&query, &candidate, panel, CalculationMode::Standard);
            let expected = MarkerPanel::for_size(panel).len();

            assert_eq!(result.distance, 0);
            assert_eq!(result.compared_markers, expected);
            assert_eq!(result.identical_markers, expected);
            assert!(result.has_all_required_markers);
            assert!((result.percent_identical() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_single_step_difference_on_y12() {
        let query = full_profile("Q", PanelSize::Y12);
        let candidate = with_value(full_profile("C", PanelSize::Y12), "DYS390", "15");

        let result = compare(&query, &candidate, PanelSize::Y12, CalculationMode::Standard);
        assert_eq!(result.distance, 1);
        assert_eq!(result.compared_markers, 12);
        assert_eq!(result.identical_markers, 11);
        assert!(result.has_all_required_markers);
    }

    #[test]
    fn test_single_copy_difference_is_not_capped() {
        let query = full_profile("Q", PanelSize::Y12);
        let candidate = with_value(full_profile("C", PanelSize::Y12), "DYS19", "18");

        let result = compare(&query, &candidate, PanelSize::Y12, CalculationMode::Standard);
        assert_eq!(result.distance, 4);
    }

    #[test]
    fn test_placeholders_and_malformed_values_shrink_compared() {
        let query = full_profile("Q", PanelSize::Y12);
        let candidate = full_profile("C", PanelSize::Y12);
        let candidate = with_value(candidate, "DYS393", "0");
        let candidate = with_value(candidate, "DYS390", "-");
        let candidate = with_value(candidate, "DYS19", "abc");

        let result = compare(&query, &candidate, PanelSize::Y12, CalculationMode::Standard);
        assert_eq!(result.compared_markers, 9);
        assert_eq!(result.distance, 0);
        assert!(!result.has_all_required_markers);
    }

    #[test]
    fn test_markers_outside_panel_are_ignored() {
        let query = full_profile("Q", PanelSize::Y37);
        let candidate = with_value(full_profile("C", PanelSize::Y37), "DYS459", "12-14");

        let y12 = compare(&query, &candidate, PanelSize::Y12, CalculationMode::Standard);
        assert_eq!(y12.distance, 0);
        let y37 = compare(&query, &candidate, PanelSize::Y37, CalculationMode::Standard);
        assert!(y37.distance > 0);
    }

    #[test]
    fn test_multi_copy_order_does_not_matter() {
        for mode in [CalculationMode::Standard, CalculationMode::Extended] {
            assert_eq!(marker_difference("11-14", "14-11", "DYS385", mode), Some(0));
            assert_eq!(marker_difference("11,14", "11-14", "DYS385", mode), Some(0));
        }
    }

    #[test]
    fn test_multi_copy_weighting_by_mode() {
        assert_eq!(
            marker_difference("11-14", "12-16", "DYS385", CalculationMode::Standard),
            Some(1)
        );
        assert_eq!(
            marker_difference("11-14", "12-16", "DYS385", CalculationMode::Extended),
            Some(3)
        );
        // Best pairing crosses the written order
        assert_eq!(
            marker_difference("14-11", "11-15", "DYS385", CalculationMode::Extended),
            Some(1)
        );
    }

    #[test]
    fn test_multi_copy_with_different_copy_counts() {
        assert_eq!(
            marker_difference("15-15-16-17", "15-16-17", "DYS464", CalculationMode::Extended),
            Some(1)
        );
        assert_eq!(
            marker_difference("15-15-16-17", "15-16-17", "DYS464", CalculationMode::Standard),
            Some(1)
        );
        assert_eq!(
            marker_difference("15-15-16-17", "15-16", "DYS464", CalculationMode::Extended),
            Some(2)
        );
    }

    #[test]
    fn test_microvariant_pairing_takes_the_true_minimum() {
        // Sorted pairing costs 1 + 1; pairing 10 with 10.2 and 10.1 with 10.1 costs 1
        assert_eq!(
            marker_difference("10-10.1", "10.1-10.2", "DYS385", CalculationMode::Extended),
            Some(1)
        );
        assert_eq!(
            marker_difference("10.1-10.2", "10-10.1", "DYS385", CalculationMode::Extended),
            Some(1)
        );
    }

    #[test]
    fn test_oversized_multi_copy_value_is_not_compared() {
        let many = vec!["12"; MAX_ALLELES + 1].join("-");
        assert_eq!(
            marker_difference(&many, "12-12", "DYS464", CalculationMode::Extended),
            None
        );
    }

    #[test]
    fn test_single_copy_marker_rejects_composite_value() {
        assert_eq!(
            marker_difference("13-14", "13", "DYS393", CalculationMode::Extended),
            None
        );
    }

    #[test]
    fn test_microvariants_round_up_to_whole_steps() {
        assert_eq!(parse_allele("17.2"), Some(172));
        assert_eq!(parse_allele("17"), Some(170));
        assert_eq!(parse_allele("17."), None);
        assert_eq!(parse_allele("17.25"), None);
        assert_eq!(parse_allele("-3"), None);

        assert_eq!(
            marker_difference("17.2", "17", "DYS458", CalculationMode::Standard),
            Some(1)
        );
        assert_eq!(
            marker_difference("17.2", "19", "DYS458", CalculationMode::Standard),
            Some(2)
        );
    }

    #[test]
    fn test_threshold_boundary() {
        let panel = MarkerPanel::for_size(PanelSize::Y12);
        let query = full_profile("Q", PanelSize::Y12);

        // Drop markers from the candidate until exactly `threshold` remain
        let drop = panel.len() - panel.min_valid_markers();
        let mut candidate = full_profile("C", PanelSize::Y12);
        for marker in &panel.markers()[..drop] {
            candidate.markers.remove(*marker);
        }
        let at = compare(&query, &candidate, PanelSize::Y12, CalculationMode::Standard);
        assert_eq!(at.compared_markers, panel.min_valid_markers());
        assert!(at.has_all_required_markers);

        candidate.markers.remove(panel.markers()[drop]);
        let below = compare(&query, &candidate, PanelSize::Y12, CalculationMode::Standard);
        assert_eq!(below.compared_markers, panel.min_valid_markers() - 1);
        assert!(!below.has_all_required_markers);
    }

    #[test]
    fn test_percent_identical_without_comparisons() {
        let result = compare(
            &StrProfile::new("Q"),
            &StrProfile::new("C"),
            PanelSize::Y12,
            CalculationMode::Standard,
        );
        assert_eq!(result.compared_markers, 0);
        assert!(result.percent_identical().abs() < f64::EPSILON);
    }
}
