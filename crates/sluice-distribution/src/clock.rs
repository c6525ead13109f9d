//! Time collaborator.
//!
//! The engine never reads the wall clock directly; every operation samples a
//! `TimeSource` once and clamps the instant to the distribution window. The
//! unit is opaque to the engine: wall-clock seconds for the primary variant,
//! a block counter for the secondary one.

use std::sync::atomic::{AtomicI64, Ordering};

pub trait TimeSource: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall-clock seconds since the Unix epoch.
#[derive(Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A manually advanced counter. Serves as the block-count variant in
/// production and as the deterministic clock in tests.
#[derive(Debug)]
pub struct StepClock {
    current: AtomicI64,
}

impl StepClock {
    pub fn starting_at(instant: i64) -> Self {
        Self {
            current: AtomicI64::new(instant),
        }
    }

    pub fn set(&self, instant: i64) {
        self.current.store(instant, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: i64) {
        self.current.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TimeSource for StepClock {
    fn now(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }
}
