//! Hooks a caller (CLI, test, output writer) can use to watch a run without
//! the stepping model needing to know anything about what's watching.
//!
//! All methods default to no-ops, so an observer only overrides the hooks it
//! cares about.

use fleet_core::Tick;

use crate::snapshot::Snapshot;

pub trait SimObserver {
    /// Called once, before any tick runs.
    fn on_start(&mut self, _snapshot: &Snapshot) {}

    /// Called after every tick completes, with that tick's snapshot.
    fn on_tick(&mut self, _tick: Tick, _snapshot: &Snapshot) {}

    /// Called when the deadlock escape hatch fires (spec §7).
    fn on_deadlock(&mut self, _tick: Tick) {}

    /// Called once the run terminates, with the final snapshot.
    fn on_finish(&mut self, _snapshot: &Snapshot) {}
}

/// An observer that does nothing — the default when no one is watching.
#[derive(Default)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
