//! Background precomputation of collisions
//!
//! A worker thread runs the collision step ahead of the render clock and
//! publishes every step as a [`StateChange`](crate::sim::StateChange). Each
//! restart opens a new generation on the next channel of a fixed ring; the
//! consumer only reads the current generation's channel and drops the rest.

mod ring;
mod thread;
mod worker;

pub use ring::{ReceiverRing, SenderRing, channel_ring};
pub use thread::CollThread;
pub use worker::{Command, Worker};
