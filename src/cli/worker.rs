use std::io::{BufRead, Write};

use clap::Args;
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::matching::engine::{BatchOrchestrator, MessageSink, DEFAULT_PROGRESS_INTERVAL};
use crate::matching::protocol::OutboundMessage;

#[derive(Args)]
pub struct WorkerArgs {
    /// Candidates between progress messages
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    pub progress_interval: usize,
}

/// Writes each outbound message as one JSON line, remembering the first
/// write failure.
struct JsonLineSink<W: Write> {
    out: W,
    failure: Option<anyhow::Error>,
}

impl<W: Write> JsonLineSink<W> {
    fn new(out: W) -> Self {
        Self { out, failure: None }
    }

    fn write_line(&mut self, message: &OutboundMessage) -> anyhow::Result<()> {
        let line = message.to_json()?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }

    fn check(&mut self) -> anyhow::Result<()> {
        match self.failure.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<W: Write> MessageSink for JsonLineSink<W> {
    fn send(&mut self, message: OutboundMessage) {
        if self.failure.is_some() {
            return;
        }
        if let Err(error) = self.write_line(&message) {
            self.failure = Some(error);
        }
    }
}

/// Serve the protocol: one inbound JSON message per stdin line, one
/// outbound JSON message per stdout line. Ends at end of input.
pub fn run(args: WorkerArgs, _format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(
        stdin.lock(),
        stdout.lock(),
        BatchOrchestrator::with_progress_interval(args.progress_interval),
    )
}

fn serve<R: BufRead, W: Write>(
    input: R,
    output: W,
    mut orchestrator: BatchOrchestrator,
) -> anyhow::Result<()> {
    let mut sink = JsonLineSink::new(output);
    let mut messages = 0usize;

    info!("Worker ready");
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        messages += 1;
        orchestrator.handle_json(&line, &mut sink);
        sink.check()?;
    }
    debug!(messages, "Worker input closed");

    Ok(())
}
