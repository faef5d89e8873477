//! Background collision worker
//!
//! Runs one generation at a time: compute the next collision, publish it,
//! repeat. A new state on the input channel starts the next generation right
//! away; whatever the old one still had buffered is left for the consumer to
//! discard.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError, TrySendError};
use std::time::Duration;

use crate::sim::{GameState, Hooks, SimContext, StateChange, advance};

use super::ring::SenderRing;

/// Messages from the consumer to the worker
#[derive(Debug)]
pub enum Command {
    /// Start a new generation from this state
    Restart { state: GameState, generation: u64 },
    Stop,
}

/// The generation being computed
struct Run {
    state: GameState,
    generation: u64,
    /// Computed but not yet accepted by a full channel
    pending: Option<StateChange>,
    /// No further collision exists
    stalled: bool,
}

impl Run {
    /// Whether there is work to do without new input
    fn is_busy(&self) -> bool {
        self.pending.is_some() || !(self.stalled || self.state.is_end)
    }
}

enum Poll {
    Command(Command),
    Nothing,
    Closed,
}

pub struct Worker {
    input: Receiver<Command>,
    outputs: SenderRing,
    hooks: Hooks,
    ctx: SimContext,
    retry: Duration,
}

impl Worker {
    pub fn new(input: Receiver<Command>, outputs: SenderRing, hooks: Hooks, ctx: SimContext, retry: Duration) -> Self {
        Self {
            input,
            outputs,
            hooks,
            ctx,
            retry,
        }
    }

    /// Idle until input arrives, then compute and publish until stopped.
    ///
    /// Returns when told to stop or when the consumer has gone away.
    pub fn run(self) {
        let mut run: Option<Run> = None;
        loop {
            match self.poll(run.as_ref()) {
                Poll::Command(Command::Restart { state, generation }) => {
                    log::info!(
                        "worker: generation {generation} from t = {:.4} ({} balls)",
                        state.time,
                        state.balls.len()
                    );
                    run = Some(Run {
                        state,
                        generation,
                        pending: None,
                        stalled: false,
                    });
                    continue;
                }
                Poll::Command(Command::Stop) | Poll::Closed => break,
                Poll::Nothing => {}
            }
            let Some(current) = run.as_mut() else {
                continue;
            };
            if current.pending.is_none() {
                self.compute(current);
            }
            if !self.publish(current) {
                break;
            }
        }
        log::info!("worker: stopped");
    }

    /// Block when idle, wait briefly when a publish is held back, peek otherwise
    fn poll(&self, run: Option<&Run>) -> Poll {
        match run {
            Some(r) if r.is_busy() && r.pending.is_some() => match self.input.recv_timeout(self.retry) {
                Ok(cmd) => Poll::Command(cmd),
                Err(RecvTimeoutError::Timeout) => Poll::Nothing,
                Err(RecvTimeoutError::Disconnected) => Poll::Closed,
            },
            Some(r) if r.is_busy() => match self.input.try_recv() {
                Ok(cmd) => Poll::Command(cmd),
                Err(TryRecvError::Empty) => Poll::Nothing,
                Err(TryRecvError::Disconnected) => Poll::Closed,
            },
            _ => match self.input.recv() {
                Ok(cmd) => Poll::Command(cmd),
                Err(_) => Poll::Closed,
            },
        }
    }

    fn compute(&self, run: &mut Run) {
        if run.stalled || run.state.is_end {
            return;
        }
        match advance(&mut run.state, &self.hooks, &self.ctx, run.generation) {
            Some(change) => {
                if change.is_end {
                    log::info!("worker: generation {} ended at t = {:.4}", run.generation, change.change_t);
                }
                run.pending = Some(change);
            }
            None => {
                log::info!(
                    "worker: generation {} found no further collision after t = {:.4}",
                    run.generation,
                    run.state.time
                );
                run.stalled = true;
            }
        }
    }

    /// Try to hand the pending change to the generation's channel.
    ///
    /// Returns `false` once the consumer has dropped its receivers.
    fn publish(&self, run: &mut Run) -> bool {
        let Some(change) = run.pending.take() else {
            return true;
        };
        match self.outputs.for_generation(run.generation).try_send(change) {
            Ok(()) => true,
            Err(TrySendError::Full(change)) => {
                log::debug!("worker: generation {} channel full, holding t = {:.4}", run.generation, change.change_t);
                run.pending = Some(change);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}
