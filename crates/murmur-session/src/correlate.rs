//! Matching acknowledgements to the requests they answer.
//!
//! The wire protocol has no request ids: an acknowledgement says only which
//! opcode it answers. That assumption lives behind the [`Correlator`]
//! trait so a protocol revision with real correlation ids can swap in a
//! different implementation without touching the session.

use std::collections::HashMap;

use murmur_protocol::Command;

/// Whether an acknowledgement answered a request we sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// It matched an outstanding request.
    Matched,
    /// Nothing of that kind was outstanding.
    Unsolicited,
}

/// Tracks outstanding requests for one connection.
///
/// The session calls these under its state lock, so implementations need
/// no synchronization of their own.
pub trait Correlator: Send + 'static {
    /// A request of this kind is about to be written to the socket.
    fn request_sent(&mut self, command: Command);

    /// The write for a request recorded by [`request_sent`] failed, so no
    /// acknowledgement will come for it.
    ///
    /// [`request_sent`]: Self::request_sent
    fn request_failed(&mut self, command: Command);

    /// An acknowledgement for this kind of request arrived.
    fn response_received(&mut self, command: Command) -> Correlation;

    /// Number of requests of this kind still awaiting an acknowledgement.
    fn outstanding(&self, command: Command) -> u32;

    /// Forgets everything. Called when a new connection starts.
    fn reset(&mut self);
}

/// The default [`Correlator`]: matches by echoed opcode alone.
///
/// Keeps a counter per command. TCP keeps acknowledgements in order, so a
/// counter is all the bookkeeping an id-less protocol can support.
#[derive(Debug, Default)]
pub struct OpcodeCorrelator {
    outstanding: HashMap<Command, u32>,
}

impl OpcodeCorrelator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Correlator for OpcodeCorrelator {
    fn request_sent(&mut self, command: Command) {
        *self.outstanding.entry(command).or_insert(0) += 1;
    }

    fn request_failed(&mut self, command: Command) {
        if let Some(count) = self.outstanding.get_mut(&command) {
            *count = count.saturating_sub(1);
        }
    }

    fn response_received(&mut self, command: Command) -> Correlation {
        match self.outstanding.get_mut(&command) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Correlation::Matched
            }
            _ => Correlation::Unsolicited,
        }
    }

    fn outstanding(&self, command: Command) -> u32 {
        self.outstanding.get(&command).copied().unwrap_or(0)
    }

    fn reset(&mut self) {
        self.outstanding.clear();
    }
}
