use rayon::prelude::*;
use tracing::debug;

use crate::core::profile::StrProfile;
use crate::matching::aggregate::merge_ranked;
use crate::matching::engine::{BatchOrchestrator, MatchResult, SearchConfig};
use crate::matching::protocol::{EngineError, OutboundMessage};

/// Search disjoint partitions of `candidates` in parallel and merge the results.
///
/// Each partition runs its own session on the rayon pool, finalized with the
/// same `max_matches`; the merged list equals a single session over all
/// candidates.
///
/// # Errors
///
/// Returns `EngineError::MissingParameters` if the query has no kit number.
pub fn search_partitioned(
    query: &StrProfile,
    config: SearchConfig,
    candidates: &[StrProfile],
    partitions: usize,
) -> Result<Vec<MatchResult>, EngineError> {
    let partitions = partitions.max(1);
    let partition_len = candidates.len().div_ceil(partitions).max(1);

    debug!(
        candidates = candidates.len(),
        partitions,
        partition_len,
        "Starting partitioned search"
    );

    let ranked: Vec<Vec<MatchResult>> = candidates
        .par_chunks(partition_len)
        .map(|partition| search_partition(query, config, partition))
        .collect::<Result<_, _>>()?;

    Ok(merge_ranked(ranked, config.max_matches))
}

fn search_partition(
    query: &StrProfile,
    config: SearchConfig,
    partition: &[StrProfile],
) -> Result<Vec<MatchResult>, EngineError> {
    let mut engine = BatchOrchestrator::new();
    let mut sink: Vec<OutboundMessage> = Vec::new();
    let config = SearchConfig {
        expected_total: partition.len(),
        ..config
    };

    engine.init(query.clone(), config, &mut sink)?;
    engine.process_batch(partition, &mut sink)?;
    engine.finalize(&mut sink)
}
