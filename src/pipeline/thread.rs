//! Consumer side of the collision pipeline

use std::collections::VecDeque;
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::consts::PUBLISH_RETRY_MS;
use crate::error::{EngineError, EngineResult};
use crate::settings::EngineSettings;
use crate::sim::{GameState, Hooks, SimContext, StateChange};

use super::ring::{ReceiverRing, channel_ring};
use super::worker::{Command, Worker};

/// Owns the collision worker and a local copy of the game state.
///
/// The render loop calls [`check_coll`](Self::check_coll) once per frame with
/// the current simulation time; state edits go through
/// [`restart`](Self::restart). Neither ever blocks on the worker.
pub struct CollThread {
    state: GameState,
    generation: u64,
    input: Sender<Command>,
    outputs: ReceiverRing,
    /// Head of the current channel, taken but not yet due
    next: Option<StateChange>,
    /// Slots of earlier generations still to be emptied
    abandoned: VecDeque<usize>,
    max_pops: usize,
    worker_lost: bool,
    handle: Option<JoinHandle<()>>,
}

impl CollThread {
    /// Spawn the worker and start generation 0 from `state`
    pub fn new(state: GameState, settings: &EngineSettings, hooks: Hooks) -> EngineResult<Self> {
        settings.validate()?;
        let (tx, rx) = mpsc::channel();
        let (senders, receivers) = channel_ring(settings.num_channels, settings.channel_capacity);
        let worker = Worker::new(
            rx,
            senders,
            hooks,
            SimContext::from_settings(settings),
            Duration::from_millis(PUBLISH_RETRY_MS),
        );
        let handle = std::thread::Builder::new()
            .name("coll-worker".into())
            .spawn(move || worker.run())?;

        tx.send(Command::Restart {
            state: state.clone(),
            generation: 0,
        })
        .map_err(|_| EngineError::pipeline("worker exited before the first state"))?;

        Ok(Self {
            state,
            generation: 0,
            input: tx,
            outputs: receivers,
            next: None,
            abandoned: VecDeque::new(),
            max_pops: settings.max_pops_per_check,
            worker_lost: false,
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply the changes due by `now`, at most `max_pops_per_check` of them.
    ///
    /// Returns the updated state and the number of changes applied, or `None`
    /// if nothing was due. A count at the limit means the caller is lagging.
    pub fn check_coll(&mut self, now: f64) -> Option<(&GameState, usize)> {
        self.drain_abandoned_slot();
        let applied = self.apply_due(now, self.max_pops);
        (applied > 0).then_some((&self.state, applied))
    }

    /// Like [`check_coll`](Self::check_coll) without the per-call limit
    pub fn check_coll_all(&mut self, now: f64) -> Option<(&GameState, usize)> {
        self.drain_abandoned_slot();
        let applied = self.apply_due(now, usize::MAX);
        (applied > 0).then_some((&self.state, applied))
    }

    /// Start a new generation from `state`, with every ball re-based at `now`.
    ///
    /// Changes of earlier generations are never applied after this returns.
    pub fn restart(&mut self, mut state: GameState, now: f64) -> EngineResult<()> {
        state.rebase(now);
        let old_slot = self.outputs.slot_of(self.generation);
        self.generation += 1;
        let slot = self.outputs.slot_of(self.generation);
        self.abandoned.retain(|s| *s != slot);
        if old_slot != slot {
            self.abandoned.push_back(old_slot);
        }
        let dropped = self.outputs.drain(slot);
        if dropped > 0 {
            log::debug!("restart: dropped {dropped} stale changes from slot {slot}");
        }
        self.next = None;
        self.state = state.clone();
        self.input
            .send(Command::Restart {
                state,
                generation: self.generation,
            })
            .map_err(|_| EngineError::pipeline("collision worker is gone"))
    }

    /// Stop the worker and wait for it
    pub fn stop(&mut self) -> EngineResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        // the worker may already have exited on its own
        let _ = self.input.send(Command::Stop);
        handle
            .join()
            .map_err(|_| EngineError::pipeline("collision worker panicked"))
    }

    fn apply_due(&mut self, now: f64, limit: usize) -> usize {
        let mut applied = 0;
        while applied < limit && !self.state.is_end {
            match self.peek() {
                Some(change) if change.change_t <= now => {}
                _ => break,
            }
            if let Some(change) = self.next.take() {
                change.apply_to(&mut self.state);
                applied += 1;
            }
        }
        applied
    }

    /// Next change of the current generation, if the worker has produced one
    fn peek(&mut self) -> Option<&StateChange> {
        while self.next.is_none() {
            match self.outputs.for_generation(self.generation).try_recv() {
                Ok(change) if change.generation == self.generation => self.next = Some(change),
                Ok(change) => log::debug!("discarding change of generation {}", change.generation),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    if !self.worker_lost {
                        log::warn!("collision worker disconnected");
                        self.worker_lost = true;
                    }
                    return None;
                }
            }
        }
        self.next.as_ref()
    }

    fn drain_abandoned_slot(&mut self) {
        if let Some(slot) = self.abandoned.pop_front() {
            let dropped = self.outputs.drain(slot);
            if dropped > 0 {
                log::debug!("drained {dropped} changes from abandoned slot {slot}");
            }
        }
    }
}

impl Drop for CollThread {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("{e}");
        }
    }
}
