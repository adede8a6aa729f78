use std::iter::Peekable;
use std::slice::Chunks;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::profile::StrProfile;
use crate::core::types::{CalculationMode, PanelSize};
use crate::matching::aggregate::rank_matches;
use crate::matching::distance::compare;
use crate::matching::filter::is_candidate_viable;
use crate::matching::protocol::{EngineError, InboundMessage, InitRequest, OutboundMessage};

/// Candidates processed between two progress reports inside a batch
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// A candidate that passed the distance and marker-count limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// The matched candidate
    pub profile: StrProfile,

    /// Genetic distance to the query
    pub distance: u32,

    /// Markers usable on both sides
    pub compared_markers: usize,

    /// Compared markers with no difference
    pub identical_markers: usize,

    /// `identical_markers / compared_markers` as a percentage
    pub percent_identical: f64,

    /// Compared markers reached the panel threshold
    pub has_all_required_markers: bool,
}

/// Configuration of one search session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    pub panel_size: PanelSize,
    /// Largest distance still reported
    pub max_distance: u32,
    /// Length of the final ranked list
    pub max_matches: usize,
    pub calculation_mode: CalculationMode,
    /// Number of candidates the caller intends to send, used for progress
    pub expected_total: usize,
}

/// Where the orchestrator stands in the init / processBatch / finalize protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Processing,
}

/// Destination for outbound messages
pub trait MessageSink {
    fn send(&mut self, message: OutboundMessage);
}

impl MessageSink for Vec<OutboundMessage> {
    fn send(&mut self, message: OutboundMessage) {
        self.push(message);
    }
}

/// State of the one in-flight search: query, configuration and accumulated matches
#[derive(Debug)]
pub struct BatchSession {
    query: StrProfile,
    config: SearchConfig,
    accumulated: Vec<MatchResult>,
    processed_count: usize,
    state: SessionState,
}

impl BatchSession {
    fn new(query: StrProfile, config: SearchConfig) -> Self {
        Self {
            query,
            config,
            accumulated: Vec::new(),
            processed_count: 0,
            state: SessionState::Ready,
        }
    }

    /// Filter and score one candidate against the query
    fn evaluate(&self, candidate: &StrProfile) -> Option<MatchResult> {
        let config = &self.config;
        if !is_candidate_viable(candidate, &self.query, config.panel_size) {
            return None;
        }

        let result = compare(
            &self.query,
            candidate,
            config.panel_size,
            config.calculation_mode,
        );
        if !result.has_all_required_markers || result.distance > config.max_distance {
            return None;
        }

        Some(MatchResult {
            profile: candidate.clone(),
            distance: result.distance,
            compared_markers: result.compared_markers,
            identical_markers: result.identical_markers,
            percent_identical: result.percent_identical(),
            has_all_required_markers: result.has_all_required_markers,
        })
    }

    /// Start scoring a batch in chunks of `interval` candidates
    fn start_batch<'a>(&'a mut self, candidates: &'a [StrProfile], interval: usize) -> BatchRun<'a> {
        self.state = SessionState::Processing;
        BatchRun {
            session: self,
            chunks: candidates.chunks(interval).peekable(),
            accepted: Vec::new(),
        }
    }

    /// Process a slice of candidates, keeping and returning the accepted ones
    fn process_chunk(&mut self, chunk: &[StrProfile]) -> Vec<MatchResult> {
        let accepted: Vec<MatchResult> = chunk.iter().filter_map(|c| self.evaluate(c)).collect();
        self.processed_count += chunk.len();
        self.accumulated.extend(accepted.iter().cloned());
        accepted
    }

    fn progress(&self) -> OutboundMessage {
        let percent = if self.config.expected_total == 0 {
            0
        } else {
            let pct = self.processed_count.saturating_mul(100) / self.config.expected_total;
            u8::try_from(pct.min(100)).unwrap_or(100)
        };
        OutboundMessage::Progress {
            processed_count: self.processed_count,
            found_count: self.accumulated.len(),
            percent,
        }
    }

    fn batch_accepted(&self, matches: Vec<MatchResult>) -> OutboundMessage {
        debug!(
            accepted = matches.len(),
            processed = self.processed_count,
            found = self.accumulated.len(),
            "Batch processed"
        );
        OutboundMessage::BatchAccepted {
            matches,
            processed_count_so_far: self.processed_count,
        }
    }
}

/// One batch being scored chunk by chunk, shared by the blocking and async
/// batch paths
pub(crate) struct BatchRun<'a> {
    session: &'a mut BatchSession,
    chunks: Peekable<Chunks<'a, StrProfile>>,
    accepted: Vec<MatchResult>,
}

impl BatchRun<'_> {
    /// Score the next chunk. Returns a progress report while candidates
    /// remain, `None` once the batch is exhausted.
    pub(crate) fn advance(&mut self) -> Option<OutboundMessage> {
        let chunk = self.chunks.next()?;
        let accepted = self.session.process_chunk(chunk);
        self.accepted.extend(accepted);
        if self.chunks.peek().is_some() {
            Some(self.session.progress())
        } else {
            None
        }
    }

    /// Score whatever is left and build the `batchAccepted` message along
    /// with the batch's accepted matches.
    pub(crate) fn finish(mut self) -> (OutboundMessage, Vec<MatchResult>) {
        while self.advance().is_some() {}
        let message = self.session.batch_accepted(self.accepted.clone());
        (message, self.accepted)
    }
}

/// Drives one search session through init, batches and finalize.
///
/// Only one session is active at a time; a new `init` discards the old one.
/// Independent searches use independent orchestrators.
#[derive(Debug)]
pub struct BatchOrchestrator {
    session: Option<BatchSession>,
    progress_interval: usize,
}

impl Default for BatchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_progress_interval(DEFAULT_PROGRESS_INTERVAL)
    }

    /// Report progress every `interval` candidates within a batch
    #[must_use]
    pub fn with_progress_interval(interval: usize) -> Self {
        Self {
            session: None,
            progress_interval: interval.max(1),
        }
    }

    #[must_use]
    pub fn progress_interval(&self) -> usize {
        self.progress_interval
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Uninitialized, |s| s.state)
    }

    /// Begin a batch on the active session
    pub(crate) fn start_batch<'a>(
        &'a mut self,
        candidates: &'a [StrProfile],
    ) -> Result<BatchRun<'a>, EngineError> {
        let interval = self.progress_interval;
        let session = self.session.as_mut().ok_or(EngineError::NotInitialized)?;
        Ok(session.start_batch(candidates, interval))
    }

    /// Start a new session, discarding any session in flight.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingParameters` if the query has no kit number;
    /// the current session is then left untouched.
    pub fn init(
        &mut self,
        query: StrProfile,
        config: SearchConfig,
        sink: &mut impl MessageSink,
    ) -> Result<(), EngineError> {
        if query.kit_number.trim().is_empty() {
            return Err(EngineError::MissingParameters(vec!["query.kitNumber"]));
        }

        if let Some(previous) = &self.session {
            warn!(
                kit = %previous.query.kit_number,
                processed = previous.processed_count,
                "Discarding unfinished search session"
            );
        }

        info!(
            kit = %query.kit_number,
            panel = %config.panel_size,
            mode = %config.calculation_mode,
            max_distance = config.max_distance,
            max_matches = config.max_matches,
            expected_total = config.expected_total,
            "Search session initialized"
        );

        let session = BatchSession::new(query, config);
        sink.send(session.progress());
        self.session = Some(session);
        Ok(())
    }

    /// Score a batch of candidates, emitting progress every interval and a
    /// `batchAccepted` message at the end. Returns the batch's accepted matches.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotInitialized` if no session is active.
    pub fn process_batch(
        &mut self,
        candidates: &[StrProfile],
        sink: &mut impl MessageSink,
    ) -> Result<Vec<MatchResult>, EngineError> {
        let mut run = self.start_batch(candidates)?;
        while let Some(progress) = run.advance() {
            sink.send(progress);
        }

        let (message, accepted) = run.finish();
        sink.send(message);
        Ok(accepted)
    }

    /// Rank the accumulated matches, emit `complete`, and end the session.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotInitialized` if no session is active.
    pub fn finalize(&mut self, sink: &mut impl MessageSink) -> Result<Vec<MatchResult>, EngineError> {
        let session = self.session.take().ok_or(EngineError::NotInitialized)?;
        let found = session.accumulated.len();
        let ranked = rank_matches(session.accumulated, session.config.max_matches);

        info!(
            kit = %session.query.kit_number,
            processed = session.processed_count,
            found,
            returned = ranked.len(),
            "Search session complete"
        );

        sink.send(OutboundMessage::Complete {
            matches: ranked.clone(),
        });
        Ok(ranked)
    }

    /// Apply one inbound message. Failures are reported to `sink` as `error`
    /// messages and leave the session as it was.
    pub fn handle(&mut self, message: InboundMessage, sink: &mut impl MessageSink) {
        let outcome = match message {
            InboundMessage::Init(request) => self.handle_init(request, sink),
            InboundMessage::ProcessBatch { candidates } => {
                self.process_batch(&candidates, sink).map(drop)
            }
            InboundMessage::Finalize => self.finalize(sink).map(drop),
        };

        if let Err(error) = outcome {
            warn!(kind = ?error.kind(), "{error}");
            sink.send(error.into());
        }
    }

    /// Decode and apply one JSON message
    pub fn handle_json(&mut self, text: &str, sink: &mut impl MessageSink) {
        match InboundMessage::from_json(text) {
            Ok(message) => self.handle(message, sink),
            Err(error) => {
                warn!(kind = ?error.kind(), "{error}");
                sink.send(error.into());
            }
        }
    }

    fn handle_init(
        &mut self,
        request: InitRequest,
        sink: &mut impl MessageSink,
    ) -> Result<(), EngineError> {
        let (query, config) = request.into_parts()?;
        self.init(query, config, sink)
    }
}
