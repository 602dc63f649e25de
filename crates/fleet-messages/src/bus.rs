//! Per-recipient inboxes with deterministic delivery ordering.
//!
//! Within a tick, messages are appended to the recipient's inbox as they're
//! emitted. Draining an inbox sorts by `(sender ascending, emission index
//! ascending)` — not insertion order — so delivery is reproducible
//! regardless of which order callers happened to emit in.

use rustc_hash::FxHashMap;

use fleet_core::VehicleId;

use crate::message::Message;

/// Who a message is addressed to or from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Vehicle(VehicleId),
    Orchestrator,
}

impl Endpoint {
    /// Sort key for the ascending-sender ordering rule. The orchestrator is
    /// the sole sender of `Assignment`/`AssignmentDecision`, so its key only
    /// matters relative to itself (stable, doesn't need to interleave with
    /// vehicle ids).
    fn sort_key(self) -> u32 {
        match self {
            Endpoint::Vehicle(id) => id.0,
            Endpoint::Orchestrator => u32::MAX,
        }
    }
}

struct Envelope {
    sender: Endpoint,
    emission_index: u64,
    message: Message,
}

/// Deterministic, single-tick message bus.
#[derive(Default)]
pub struct MessageBus {
    inboxes: FxHashMap<Endpoint, Vec<Envelope>>,
    next_emission: u64,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` to `recipient`'s inbox.
    pub fn send(&mut self, sender: Endpoint, recipient: Endpoint, message: Message) {
        let emission_index = self.next_emission;
        self.next_emission += 1;
        self.inboxes.entry(recipient).or_default().push(Envelope {
            sender,
            emission_index,
            message,
        });
    }

    /// Drain and return `recipient`'s inbox, ordered by `(sender_id
    /// ascending, emission_index ascending)`.
    pub fn drain(&mut self, recipient: Endpoint) -> Vec<Message> {
        let Some(mut envelopes) = self.inboxes.remove(&recipient) else {
            return Vec::new();
        };
        envelopes.sort_by_key(|e| (e.sender.sort_key(), e.emission_index));
        envelopes.into_iter().map(|e| e.message).collect()
    }

    /// Inspect `recipient`'s pending inbox without draining it, in arbitrary
    /// order. Used only for metrics collection — callers that need delivery
    /// order must use `drain`.
    pub fn peek(&self, recipient: Endpoint) -> impl Iterator<Item = &Message> + '_ {
        self.inboxes
            .get(&recipient)
            .into_iter()
            .flatten()
            .map(|e| &e.message)
    }

    /// Clear every inbox and reset the emission counter. Called between ticks
    /// once all inboxes have been drained, so nothing buffers across ticks
    /// except the orchestrator's own negotiation deferral queue.
    pub fn reset(&mut self) {
        self.inboxes.clear();
        self.next_emission = 0;
    }
}
