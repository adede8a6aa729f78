//! Marker panel registry.
//!
//! Panels are prefixes of one ordered marker list: the 12-marker panel is its
//! first 12 names, the 37-marker panel its first 37, and so on. Multi-copy
//! loci (DYS385, DYS464, ...) occupy a single name and carry a composite value
//! such as `"11-14"`. The list holds 108 names, so the 111-marker panel uses
//! all of them.

use crate::core::types::PanelSize;

/// Marker order shared by every panel
const MARKER_ORDER: [&str; 108] = [
    // Y12
    "DYS393", "DYS390", "DYS19", "DYS391", "DYS385", "DYS426", "DYS388", "DYS439", "DYS389i",
    "DYS392", "DYS389ii", "DYS458",
    // Y37
    "DYS459", "DYS455", "DYS454", "DYS447", "DYS437", "DYS448", "DYS449", "DYS464", "DYS460",
    "Y-GATA-H4", "YCAII", "DYS456", "DYS607", "DYS576", "DYS570", "CDY", "DYS442", "DYS438",
    "DYS531", "DYS578", "DYF395S1", "DYS590", "DYS537", "DYS641", "DYS472",
    // Y67
    "DYF406S1", "DYS511", "DYS425", "DYS413", "DYS557", "DYS594", "DYS436", "DYS490", "DYS534",
    "DYS450", "DYS444", "DYS481", "DYS520", "DYS446", "DYS617", "DYS568", "DYS487", "DYS572",
    "DYS640", "DYS492", "DYS565", "DYS710", "DYS485", "DYS632", "DYS495", "DYS540", "DYS714",
    "DYS716", "DYS717", "DYS505",
    // Y111
    "DYS556", "DYS549", "DYS589", "DYS522", "DYS494", "DYS533", "DYS636", "DYS575", "DYS638",
    "DYS462", "DYS452", "DYS445", "Y-GATA-A10", "DYS463", "DYS441", "Y-GGAAT-1B07", "DYS525",
    "DYS712", "DYS593", "DYS650", "DYS532", "DYS715", "DYS504", "DYS513", "DYS561", "DYS552",
    "DYS726", "DYS635", "DYS587", "DYS643", "DYS497", "DYS510", "DYS434", "DYS461", "DYS435",
    "DYS596", "DYF404S1", "DYF387S1", "DYS627", "DYS527", "DYS518",
];

/// Multi-copy (palindromic) loci and the number of copies normally reported
const MULTI_COPY_MARKERS: [(&str, usize); 9] = [
    ("DYS385", 2),
    ("DYS459", 2),
    ("DYS464", 4),
    ("YCAII", 2),
    ("CDY", 2),
    ("DYF395S1", 2),
    ("DYS413", 2),
    ("DYF387S1", 2),
    ("DYF404S1", 2),
];

/// A fixed, ordered set of markers compared together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPanel {
    pub size: PanelSize,
    markers: &'static [&'static str],
    min_valid_markers: usize,
}

impl MarkerPanel {
    /// Look up the panel for a size
    #[must_use]
    pub fn for_size(size: PanelSize) -> Self {
        let (len, min_valid_markers) = match size {
            PanelSize::Y12 => (12, 10),
            PanelSize::Y37 => (37, 28),
            PanelSize::Y67 => (67, 55),
            PanelSize::Y111 => (MARKER_ORDER.len(), 97),
        };
        Self {
            size,
            markers: &MARKER_ORDER[..len],
            min_valid_markers,
        }
    }

    /// Marker names in display order
    #[must_use]
    pub fn markers(&self) -> &'static [&'static str] {
        self.markers
    }

    /// Candidates with fewer valid markers than this are never reported
    #[must_use]
    pub fn min_valid_markers(&self) -> usize {
        self.min_valid_markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    #[must_use]
    pub fn contains(&self, marker: &str) -> bool {
        self.markers.contains(&marker)
    }
}

/// Expected copy count for a multi-copy locus, `None` for single-copy markers
#[must_use]
pub fn multi_copy_count(marker: &str) -> Option<usize> {
    MULTI_COPY_MARKERS
        .iter()
        .find(|(name, _)| *name == marker)
        .map(|(_, copies)| *copies)
}

/// Whether the locus has more than one paralogous copy
#[must_use]
pub fn is_multi_copy(marker: &str) -> bool {
    multi_copy_count(marker).is_some()
}
