//! Composition root for distribution instances.
//!
//! The factory wires the shared collaborators (assets, clock, pause switch)
//! into each new `Distribution`, hands every instance a derived account
//! address for holding funds, and keeps a registry for lookup. Proxy and
//! upgrade mechanics stay outside the engine; a distribution is agnostic to
//! how it was instantiated.

use crate::assets::AssetLedger;
use crate::clock::TimeSource;
use crate::distribution::Distribution;
use crate::pause::{PauseFlag, PauseProbe};
use sluice_types::AccountAddress;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub struct DistributionFactory {
    assets: Arc<dyn AssetLedger>,
    clock: Arc<dyn TimeSource>,
    pause: Arc<PauseFlag>,
    next_id: AtomicU64,
    registry: RwLock<Vec<Arc<Distribution>>>,
}

impl DistributionFactory {
    pub fn new(assets: Arc<dyn AssetLedger>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            assets,
            clock,
            pause: Arc::new(PauseFlag::new()),
            next_id: AtomicU64::new(0),
            registry: RwLock::new(Vec::new()),
        }
    }

    /// Mint an uninitialized distribution owned by `owner`. The returned
    /// instance's `address()` is where reward funding must be pushed before
    /// `initialize`.
    pub async fn create_distribution(&self, owner: AccountAddress) -> Arc<Distribution> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let address = AccountAddress::derive(&owner, id);
        let pause: Arc<dyn PauseProbe> = self.pause.clone();

        let distribution = Arc::new(Distribution::new(
            id,
            owner,
            address,
            self.assets.clone(),
            self.clock.clone(),
            pause,
        ));

        let mut registry = self.registry.write().await;
        registry.push(distribution.clone());

        info!(
            distribution = id,
            owner = %owner,
            address = %address,
            "📝 Distribution created"
        );
        distribution
    }

    pub async fn get(&self, id: u64) -> Option<Arc<Distribution>> {
        let registry = self.registry.read().await;
        registry.iter().find(|d| d.id() == id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Global staking pause, consulted by every distribution's `stake`.
    pub fn pause_staking(&self) {
        self.pause.pause();
    }

    pub fn resume_staking(&self) {
        self.pause.resume();
    }
}
