//! `PhaseHandoff` - an elect-last-finisher countdown.
//!
//! Every participant calls [`PhaseHandoff::arrive`] when it is done with the
//! current phase. The arrival that drives the countdown to zero is elected
//! *finisher*: it runs the phase bookkeeping closure, re-arms the countdown and
//! releases everybody else by bumping an epoch word. Followers wait for the
//! epoch to move, either parked on the address ([`HandoffPolicy::Block`]) or
//! polling it ([`HandoffPolicy::Spin`]).
//!
//! Memory ordering: every arrival decrements with `AcqRel`, so the finisher
//! observes all writes made by participants before they arrived; the epoch bump
//! is a `Release` paired with the followers' `Acquire` load, so followers
//! observe everything the finisher wrote.

use core::sync::atomic::{AtomicBool, Ordering};

use crossbeam_utils::{Backoff, CachePadded};
use serde::{Deserialize, Serialize};

use super::{wait_on_u32, wake_all_u32};
use crate::concurrency::atomic::{GhostAtomicU32, GhostAtomicUsize};
use crate::GhostToken;

/// How followers wait for the elected finisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffPolicy {
    /// Park on the epoch address until woken. Low CPU use, higher wake latency.
    #[default]
    Block,
    /// Poll the epoch with exponential backoff. Low latency, burns CPU.
    Spin,
}

impl HandoffPolicy {
    /// Both policies, for benchmarking and tests.
    pub const ALL: [HandoffPolicy; 2] = [HandoffPolicy::Block, HandoffPolicy::Spin];

    /// Short lowercase name (`block` / `spin`).
    pub fn name(self) -> &'static str {
        match self {
            HandoffPolicy::Block => "block",
            HandoffPolicy::Spin => "spin",
        }
    }
}

impl core::str::FromStr for HandoffPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(HandoffPolicy::Block),
            "spin" => Ok(HandoffPolicy::Spin),
            other => Err(format!("unknown handoff policy `{other}` (expected `block` or `spin`)")),
        }
    }
}

/// Outcome of an arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// This arrival drove the countdown to zero and ran the bookkeeping.
    Finisher,
    /// This arrival waited for the finisher.
    Follower,
}

/// Returned when a participant panicked; the phase protocol cannot continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("phase handoff poisoned by a panicking worker")]
pub struct Poisoned;

/// Elect-last-finisher countdown shared by a fixed set of participants.
pub struct PhaseHandoff<'brand> {
    parties: usize,
    policy: HandoffPolicy,
    remaining: CachePadded<GhostAtomicUsize<'brand>>,
    epoch: CachePadded<GhostAtomicU32<'brand>>,
    poisoned: AtomicBool,
}

impl<'brand> PhaseHandoff<'brand> {
    /// Creates a handoff for `parties` participants.
    ///
    /// # Panics
    /// Panics if `parties == 0`.
    pub fn new(_token: &GhostToken<'brand>, parties: usize, policy: HandoffPolicy) -> Self {
        assert!(parties != 0, "parties must be > 0");
        Self {
            parties,
            policy,
            remaining: CachePadded::new(GhostAtomicUsize::new(parties)),
            epoch: CachePadded::new(GhostAtomicU32::new(0)),
            poisoned: AtomicBool::new(false),
        }
    }

    /// Returns `true` once a participant has poisoned the handoff.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Arrives at the handoff.
    ///
    /// The last arrival runs `finish` and then releases the others; every other
    /// arrival returns only after `finish` has completed. `finish` is dropped
    /// unused by followers.
    pub fn arrive<F: FnOnce()>(&self, finish: F) -> Result<Role, Poisoned> {
        // The epoch must be sampled before decrementing: once we decrement, the
        // finisher may bump it at any moment.
        let seen = self.epoch.load(Ordering::Acquire);
        if self.is_poisoned() {
            return Err(Poisoned);
        }

        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            finish();
            self.remaining.store(self.parties, Ordering::Relaxed);
            self.epoch.fetch_add(1, Ordering::Release);
            if self.policy == HandoffPolicy::Block {
                wake_all_u32(self.epoch.as_atomic());
            }
            return Ok(Role::Finisher);
        }

        self.wait_past(seen);
        if self.is_poisoned() {
            return Err(Poisoned);
        }
        Ok(Role::Follower)
    }

    /// Marks the handoff unusable and releases every waiter.
    pub fn poison(&self) {
        self.poisoned.store(true, Ordering::Release);
        self.epoch.fetch_add(1, Ordering::Release);
        wake_all_u32(self.epoch.as_atomic());
    }

    /// Returns a guard that poisons the handoff if dropped during a panic.
    pub fn panic_guard(&self) -> PanicGuard<'_, 'brand> {
        PanicGuard { handoff: self }
    }

    fn wait_past(&self, seen: u32) {
        match self.policy {
            HandoffPolicy::Block => {
                while self.epoch.load(Ordering::Acquire) == seen {
                    wait_on_u32(self.epoch.as_atomic(), seen);
                }
            }
            HandoffPolicy::Spin => {
                let backoff = Backoff::new();
                while self.epoch.load(Ordering::Acquire) == seen {
                    backoff.snooze();
                }
            }
        }
    }
}

/// Poisons its [`PhaseHandoff`] when dropped while the thread is panicking,
/// so a failed worker cannot leave its peers parked forever.
pub struct PanicGuard<'a, 'brand> {
    handoff: &'a PhaseHandoff<'brand>,
}

impl Drop for PanicGuard<'_, '_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.handoff.poison();
        }
    }
}
