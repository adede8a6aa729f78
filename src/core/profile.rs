use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::panel::multi_copy_count;

/// Copy suffixes used when a multi-copy locus is stored one copy per key
const COPY_SUFFIXES: [char; 4] = ['a', 'b', 'c', 'd'];

/// A Y-STR profile: a kit and its marker calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrProfile {
    /// Unique, case-sensitive kit identifier
    pub kit_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub haplogroup: Option<String>,

    /// Marker name -> allele value. Multi-copy loci hold a composite value ("11-14").
    #[serde(default)]
    pub markers: BTreeMap<String, String>,
}

impl StrProfile {
    pub fn new(kit_number: impl Into<String>) -> Self {
        Self {
            kit_number: kit_number.into(),
            name: None,
            country: None,
            haplogroup: None,
            markers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>, value: impl Into<String>) -> Self {
        self.markers.insert(marker.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_haplogroup(mut self, haplogroup: impl Into<String>) -> Self {
        self.haplogroup = Some(haplogroup.into());
        self
    }

    /// The present value for a marker, trimmed.
    ///
    /// A multi-copy locus missing under its own name is assembled from
    /// per-copy keys (`DYS385a`, `DYS385b`, ...) when those are present.
    #[must_use]
    pub fn marker_value(&self, marker: &str) -> Option<Cow<'_, str>> {
        if let Some(value) = self.markers.get(marker).map(|v| v.trim()) {
            if is_present_value(value) {
                return Some(Cow::Borrowed(value));
            }
        }

        let copies = multi_copy_count(marker)?;
        let parts: Vec<&str> = COPY_SUFFIXES
            .iter()
            .take(copies)
            .filter_map(|suffix| self.markers.get(&format!("{marker}{suffix}")))
            .map(|v| v.trim())
            .filter(|v| is_present_value(v))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(Cow::Owned(parts.join("-")))
        }
    }

    /// Whether the marker has a present value on this profile
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.marker_value(marker).is_some()
    }
}

/// A value counts as a call unless it is empty or one of the placeholders `0` and `-`
#[must_use]
pub fn is_present_value(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value == "-")
}
