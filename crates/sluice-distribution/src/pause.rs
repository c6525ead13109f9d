//! Pause collaborator.
//!
//! A single global switch consulted by `stake`. Withdrawals and claims are
//! never pause-gated: participants can always exit.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub trait PauseProbe: Send + Sync {
    fn is_staking_paused(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct PauseFlag {
    paused: AtomicBool,
}

impl PauseFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        warn!("⏸️ Staking globally paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        warn!("▶️ Staking resumed");
    }
}

impl PauseProbe for PauseFlag {
    fn is_staking_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}
