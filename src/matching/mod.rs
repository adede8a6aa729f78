//! Genetic-distance matching engine.
//!
//! - [`distance`]: per-panel distance between two profiles
//! - [`filter`]: cheap pre-check that skips under-genotyped candidates
//! - [`engine`]: the batch orchestrator (`init` → `processBatch`* → `finalize`)
//! - [`aggregate`]: ranking, truncation and merging of match lists
//! - [`protocol`]: typed inbound/outbound messages and engine errors
//! - [`worker`]: tokio channel transport for the protocol
//! - [`partition`]: parallel search over disjoint candidate partitions
//!
//! ## Distance
//!
//! For every panel marker called on both sides:
//!
//! - **single-copy**: absolute repeat difference
//! - **multi-copy**, `standard` mode: 1 if the allele sets differ
//! - **multi-copy**, `extended` mode: steps of the best allele pairing
//!
//! Candidates below the panel's minimum marker count are never reported.
//!
//! ## Example
//!
//! ```rust
//! use ystr_matcher::{BatchOrchestrator, CalculationMode, PanelSize, SearchConfig, StrProfile};
//! use ystr_matcher::matching::protocol::OutboundMessage;
//!
//! let query = StrProfile::new("Q1").with_marker("DYS393", "13");
//! let config = SearchConfig {
//!     panel_size: PanelSize::Y12,
//!     max_distance: 2,
//!     max_matches: 10,
//!     calculation_mode: CalculationMode::Standard,
//!     expected_total: 0,
//! };
//!
//! let mut engine = BatchOrchestrator::new();
//! let mut messages: Vec<OutboundMessage> = Vec::new();
//! engine.init(query, config, &mut messages).unwrap();
//! engine.process_batch(&[], &mut messages).unwrap();
//! let matches = engine.finalize(&mut messages).unwrap();
//! assert!(matches.is_empty());
//! ```

pub mod aggregate;
pub mod distance;
pub mod engine;
pub mod filter;
pub mod partition;
pub mod protocol;
pub mod worker;

#[cfg(test)]
mod testutil;

pub use protocol::{EngineError, ErrorKind, InboundMessage, OutboundMessage};
