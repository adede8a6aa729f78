//! Async transport for the batch protocol.
//!
//! A worker is a tokio task owning one [`BatchOrchestrator`]. Callers send
//! [`InboundMessage`]s over a channel and read [`OutboundMessage`]s from
//! another. Long batches give the scheduler a turn at every progress report.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::profile::StrProfile;
use crate::matching::engine::{BatchOrchestrator, MessageSink};
use crate::matching::protocol::{InboundMessage, OutboundMessage};

/// Pending inbound messages a worker buffers before senders wait
const INBOUND_CAPACITY: usize = 16;

/// Forwards outbound messages to the worker's output channel
struct ChannelSink(mpsc::UnboundedSender<OutboundMessage>);

impl MessageSink for ChannelSink {
    fn send(&mut self, message: OutboundMessage) {
        // A dropped receiver means the host stopped listening; the session
        // keeps its state until the inbound side closes too.
        let _ = self.0.send(message);
    }
}

/// Channels and task handle of a running worker
pub struct WorkerHandle {
    pub inbound: mpsc::Sender<InboundMessage>,
    pub outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    pub task: JoinHandle<()>,
}

/// Spawn a worker on the current tokio runtime.
///
/// The worker runs until every inbound sender is dropped.
#[must_use]
pub fn spawn(orchestrator: BatchOrchestrator) -> WorkerHandle {
    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(orchestrator, inbound_rx, outbound_tx));

    WorkerHandle {
        inbound: inbound_tx,
        outbound: outbound_rx,
        task,
    }
}

/// Serve messages from `inbound` until the channel closes
pub async fn run(
    mut orchestrator: BatchOrchestrator,
    mut inbound: mpsc::Receiver<InboundMessage>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
) {
    let mut outbound = ChannelSink(outbound);
    while let Some(message) = inbound.recv().await {
        match message {
            InboundMessage::ProcessBatch { candidates } => {
                process_batch_cooperatively(&mut orchestrator, &candidates, &mut outbound).await;
            }
            other => orchestrator.handle(other, &mut outbound),
        }
    }
    debug!("Worker inbound channel closed");
}

/// Same contract as [`BatchOrchestrator::process_batch`], yielding to the
/// runtime after every progress report.
async fn process_batch_cooperatively(
    orchestrator: &mut BatchOrchestrator,
    candidates: &[StrProfile],
    outbound: &mut ChannelSink,
) {
    let mut run = match orchestrator.start_batch(candidates) {
        Ok(run) => run,
        Err(error) => {
            warn!(kind = ?error.kind(), "{error}");
            outbound.send(error.into());
            return;
        }
    };

    while let Some(progress) = run.advance() {
        outbound.send(progress);
        tokio::task::yield_now().await;
    }

    let (message, _) = run.finish();
    outbound.send(message);
}
