//! Typed messages exchanged with the batch orchestrator.
//!
//! On the wire each message is a JSON object tagged by `type`:
//!
//! ```json
//! {"type": "init", "query": {...}, "panelSize": 37, "maxDistance": 4,
//!  "maxMatches": 100, "calculationMode": "standard", "expectedTotal": 25000}
//! {"type": "processBatch", "candidates": [...]}
//! {"type": "finalize"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::profile::StrProfile;
use crate::core::types::{CalculationMode, PanelSize};
use crate::matching::engine::{MatchResult, SearchConfig};

/// Category of an engine failure, as reported in `error` messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotInitialized,
    MissingParameters,
    InvalidMessage,
    CalculationFailure,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No active search session; send init first")]
    NotInitialized,

    #[error("Missing init parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Calculation failed: {0}")]
    CalculationFailure(String),
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::MissingParameters(_) => ErrorKind::MissingParameters,
            Self::InvalidMessage(_) => ErrorKind::InvalidMessage,
            Self::CalculationFailure(_) => ErrorKind::CalculationFailure,
        }
    }
}

/// Payload of an `init` message. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<StrProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_size: Option<PanelSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_matches: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_mode: Option<CalculationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_total: Option<usize>,
}

impl InitRequest {
    /// A complete request for `query` under `config`
    #[must_use]
    pub fn new(query: StrProfile, config: SearchConfig) -> Self {
        Self {
            query: Some(query),
            panel_size: Some(config.panel_size),
            max_distance: Some(config.max_distance),
            max_matches: Some(config.max_matches),
            calculation_mode: Some(config.calculation_mode),
            expected_total: Some(config.expected_total),
        }
    }

    /// Split into the query and its search configuration.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingParameters` naming every absent field.
    pub fn into_parts(self) -> Result<(StrProfile, SearchConfig), EngineError> {
        let mut missing = Vec::new();
        if self.query.is_none() {
            missing.push("query");
        }
        if self.panel_size.is_none() {
            missing.push("panelSize");
        }
        if self.max_distance.is_none() {
            missing.push("maxDistance");
        }
        if self.max_matches.is_none() {
            missing.push("maxMatches");
        }
        if self.calculation_mode.is_none() {
            missing.push("calculationMode");
        }
        if self.expected_total.is_none() {
            missing.push("expectedTotal");
        }

        match (
            self.query,
            self.panel_size,
            self.max_distance,
            self.max_matches,
            self.calculation_mode,
            self.expected_total,
        ) {
            (
                Some(query),
                Some(panel_size),
                Some(max_distance),
                Some(max_matches),
                Some(calculation_mode),
                Some(expected_total),
            ) => Ok((
                query,
                SearchConfig {
                    panel_size,
                    max_distance,
                    max_matches,
                    calculation_mode,
                    expected_total,
                },
            )),
            _ => Err(EngineError::MissingParameters(missing)),
        }
    }
}

/// Messages accepted by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    Init(InitRequest),
    ProcessBatch { candidates: Vec<StrProfile> },
    Finalize,
}

impl InboundMessage {
    /// Decode a JSON message.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidMessage` for unknown message types and
    /// payloads that do not have the expected shape.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        serde_json::from_str(text).map_err(|e| EngineError::InvalidMessage(e.to_string()))
    }
}

/// Messages emitted by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    Progress {
        processed_count: usize,
        found_count: usize,
        /// Share of the expected total processed so far, 0-100
        percent: u8,
    },
    BatchAccepted {
        matches: Vec<MatchResult>,
        processed_count_so_far: usize,
    },
    Complete {
        matches: Vec<MatchResult>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl OutboundMessage {
    /// Encode as a single JSON line
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<EngineError> for OutboundMessage {
    fn from(error: EngineError) -> Self {
        Self::Error {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
