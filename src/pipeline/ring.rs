//! Fixed ring of bounded output channels
//!
//! Generation `g` publishes on slot `g % len`. The worker holds the sending
//! halves, the consumer the receiving halves; both pick the slot from the
//! generation number, so they never have to agree on a rotation count.

use std::sync::mpsc::{self, Receiver, SyncSender};

use crate::sim::StateChange;

/// Worker side of the ring
#[derive(Debug)]
pub struct SenderRing {
    slots: Vec<SyncSender<StateChange>>,
}

/// Consumer side of the ring
#[derive(Debug)]
pub struct ReceiverRing {
    slots: Vec<Receiver<StateChange>>,
}

/// `len` channels, each buffering at most `capacity` changes
pub fn channel_ring(len: usize, capacity: usize) -> (SenderRing, ReceiverRing) {
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..len).map(|_| mpsc::sync_channel(capacity)).unzip();
    (SenderRing { slots: senders }, ReceiverRing { slots: receivers })
}

fn slot_of(generation: u64, len: usize) -> usize {
    (generation % len as u64) as usize
}

impl SenderRing {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn for_generation(&self, generation: u64) -> &SyncSender<StateChange> {
        &self.slots[slot_of(generation, self.slots.len())]
    }
}

impl ReceiverRing {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_of(&self, generation: u64) -> usize {
        slot_of(generation, self.slots.len())
    }

    pub fn for_generation(&self, generation: u64) -> &Receiver<StateChange> {
        &self.slots[self.slot_of(generation)]
    }

    /// Discard everything buffered in `slot`; returns how many changes were dropped
    pub fn drain(&self, slot: usize) -> usize {
        self.slots[slot].try_iter().count()
    }
}
