use serde::{Deserialize, Serialize};

/// Supported marker panel sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PanelSize {
    Y12,
    Y37,
    Y67,
    Y111,
}

impl PanelSize {
    /// All panel sizes, smallest first
    pub const ALL: [PanelSize; 4] = [Self::Y12, Self::Y37, Self::Y67, Self::Y111];

    /// Nominal marker count of the panel (12, 37, 67 or 111)
    #[must_use]
    pub fn marker_count(self) -> u32 {
        match self {
            Self::Y12 => 12,
            Self::Y37 => 37,
            Self::Y67 => 67,
            Self::Y111 => 111,
        }
    }

    /// Default maximum genetic distance offered for this panel by the CLI
    #[must_use]
    pub fn default_max_distance(self) -> u32 {
        match self {
            Self::Y12 => 5,
            Self::Y37 => 25,
            Self::Y67 => 35,
            Self::Y111 => 50,
        }
    }
}

/// Error returned when a number is not one of the supported panel sizes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported panel size {0} (expected 12, 37, 67 or 111)")]
pub struct UnsupportedPanelSize(pub u32);

impl TryFrom<u32> for PanelSize {
    type Error = UnsupportedPanelSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            12 => Ok(Self::Y12),
            37 => Ok(Self::Y37),
            67 => Ok(Self::Y67),
            111 => Ok(Self::Y111),
            other => Err(UnsupportedPanelSize(other)),
        }
    }
}

impl From<PanelSize> for u32 {
    fn from(panel: PanelSize) -> Self {
        panel.marker_count()
    }
}

impl std::str::FromStr for PanelSize {
    type Err = UnsupportedPanelSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .trim()
            .trim_start_matches(['Y', 'y'])
            .parse()
            .map_err(|_| UnsupportedPanelSize(0))?;
        Self::try_from(value)
    }
}

impl std::fmt::Display for PanelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Y{}", self.marker_count())
    }
}

/// How per-marker differences are weighted for multi-copy loci
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// Any difference at a multi-copy locus counts as one step
    Standard,
    /// Multi-copy loci count every step of the best allele pairing
    Extended,
}

impl std::fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Extended => write!(f, "extended"),
        }
    }
}
