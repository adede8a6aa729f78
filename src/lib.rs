//! # ystr-matcher
//!
//! A library for finding genetic-distance matches between Y-STR profiles.
//!
//! Genealogical Y-DNA testing reports repeat counts for a fixed panel of
//! short tandem repeat markers. Two men who share a recent paternal ancestor
//! carry nearly identical values; the number of mutation steps separating
//! their profiles is the *genetic distance*.
//!
//! `ystr-matcher` compares a query profile against a database of kits on one
//! of the standard panels (12, 37, 67 or 111 markers) and reports the closest
//! matches.
//!
//! ## Features
//!
//! - **Batch processing**: candidates stream through an `init` →
//!   `processBatch`* → `finalize` session with progress reports
//! - **Two scoring modes**: binary or stepwise weighting of multi-copy markers
//! - **Quick filter**: under-genotyped candidates are skipped before scoring
//! - **Deterministic ranking**: distance, then kit number
//! - **Parallel search**: disjoint partitions merged into the same result
//! - **Async worker**: the session protocol over tokio channels
//!
//! ## Example
//!
//! ```rust,no_run
//! use ystr_matcher::{BatchOrchestrator, CalculationMode, PanelSize, SearchConfig};
//! use ystr_matcher::matching::protocol::OutboundMessage;
//! use ystr_matcher::parsing::profiles::load_profiles;
//! use std::path::Path;
//!
//! let database = load_profiles(Path::new("ftdna.csv")).unwrap();
//! let query = database[0].clone();
//!
//! let config = SearchConfig {
//!     panel_size: PanelSize::Y37,
//!     max_distance: 4,
//!     max_matches: 20,
//!     calculation_mode: CalculationMode::Standard,
//!     expected_total: database.len(),
//! };
//!
//! let mut engine = BatchOrchestrator::new();
//! let mut messages: Vec<OutboundMessage> = Vec::new();
//! engine.init(query, config, &mut messages).unwrap();
//! for batch in database.chunks(1000) {
//!     engine.process_batch(batch, &mut messages).unwrap();
//! }
//!
//! for m in engine.finalize(&mut messages).unwrap() {
//!     println!("{}: GD {}", m.profile.kit_number, m.distance);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Profiles, marker panels and configuration enums
//! - [`matching`]: Distance calculation, batch engine and transports
//! - [`parsing`]: Loaders for profile databases
//! - [`cli`]: Command-line interface implementation
//! - [`utils`]: Input validation

pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::panel::MarkerPanel;
pub use core::profile::StrProfile;
pub use core::types::*;
pub use matching::distance::DistanceResult;
pub use matching::engine::{BatchOrchestrator, MatchResult, MessageSink, SearchConfig, SessionState};
pub use matching::protocol::{EngineError, ErrorKind, InboundMessage, OutboundMessage};
