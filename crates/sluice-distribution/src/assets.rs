//! Funding collaborator boundary.
//!
//! The engine expects standard fungible-token semantics from the outside
//! world: balances, transfers, and a fixed decimal count per token. Errors at
//! this seam are untyped (`anyhow`) and mapped to the stable `Collaborator`
//! code inside the engine.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sluice_types::{AccountAddress, TokenAmount};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

type HoldingMap = HashMap<(AccountAddress, AccountAddress), TokenAmount>;

#[async_trait]
pub trait AssetLedger: Send + Sync {
    async fn balance_of(&self, token: AccountAddress, holder: AccountAddress)
        -> Result<TokenAmount>;
    async fn decimals(&self, token: AccountAddress) -> Result<u32>;
    async fn transfer(
        &self,
        token: AccountAddress,
        from: AccountAddress,
        to: AccountAddress,
        amount: TokenAmount,
    ) -> Result<()>;

    /// Multi-transfer operations bracket their interaction phase so a
    /// mid-batch collaborator failure leaves no partial effect.
    async fn begin_transaction(&self) -> Result<()>;
    async fn commit_transaction(&self) -> Result<()>;
    async fn rollback_transaction(&self) -> Result<()>;
}

/// In-memory asset ledger used by tests and the demo factory wiring.
pub struct MemoryAssets {
    holdings: Arc<RwLock<HoldingMap>>,
    decimals: Arc<RwLock<HashMap<AccountAddress, u32>>>,
    backup: Arc<RwLock<Option<HoldingMap>>>,
}

impl Default for MemoryAssets {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self {
            holdings: Arc::new(RwLock::new(HashMap::new())),
            decimals: Arc::new(RwLock::new(HashMap::new())),
            backup: Arc::new(RwLock::new(None)),
        }
    }

    /// Declare a token and its decimal count. Unknown tokens are rejected by
    /// every other call.
    pub async fn register_token(&self, token: AccountAddress, decimals: u32) {
        let mut registry = self.decimals.write().await;
        registry.insert(token, decimals);
        debug!(token = %token, decimals, "Token registered");
    }

    /// Test/faucet entry point: create balance out of thin air.
    pub async fn mint(&self, token: AccountAddress, to: AccountAddress, amount: TokenAmount) {
        let mut holdings = self.holdings.write().await;
        let entry = holdings.entry((token, to)).or_insert(TokenAmount::ZERO);
        *entry = entry.saturating_add(amount);
        info!(token = %token, to = %to, amount = %amount, "💰 Minted");
    }
}

#[async_trait]
impl AssetLedger for MemoryAssets {
    async fn balance_of(
        &self,
        token: AccountAddress,
        holder: AccountAddress,
    ) -> Result<TokenAmount> {
        let holdings = self.holdings.read().await;
        Ok(holdings
            .get(&(token, holder))
            .copied()
            .unwrap_or(TokenAmount::ZERO))
    }

    async fn decimals(&self, token: AccountAddress) -> Result<u32> {
        let registry = self.decimals.read().await;
        match registry.get(&token) {
            Some(decimals) => Ok(*decimals),
            None => bail!("Unknown token: {}", token),
        }
    }

    async fn transfer(
        &self,
        token: AccountAddress,
        from: AccountAddress,
        to: AccountAddress,
        amount: TokenAmount,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let mut holdings = self.holdings.write().await;

        let from_balance = holdings
            .get(&(token, from))
            .copied()
            .unwrap_or(TokenAmount::ZERO);
        if from_balance < amount {
            bail!(
                "Insufficient balance of {} for {}: has {}, needs {}",
                token,
                from,
                from_balance,
                amount
            );
        }

        let to_balance = holdings
            .get(&(token, to))
            .copied()
            .unwrap_or(TokenAmount::ZERO);
        let new_to_balance = match to_balance.checked_add(amount) {
            Some(balance) => balance,
            None => bail!("Balance overflow for recipient {}", to),
        };

        let new_from_balance = from_balance.saturating_sub(amount);
        if new_from_balance.is_zero() {
            holdings.remove(&(token, from));
        } else {
            holdings.insert((token, from), new_from_balance);
        }
        holdings.insert((token, to), new_to_balance);

        info!(
            token = %token,
            from = %from,
            to = %to,
            amount = %amount,
            "💸 Asset transfer"
        );
        Ok(())
    }

    async fn begin_transaction(&self) -> Result<()> {
        let holdings = self.holdings.read().await;
        let mut backup = self.backup.write().await;
        *backup = Some(holdings.clone());
        debug!(
            holdings_count = holdings.len(),
            "📝 Asset transaction began (snapshot created)"
        );
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        let mut backup = self.backup.write().await;
        *backup = None;
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<()> {
        let mut backup = self.backup.write().await;
        if let Some(snapshot) = backup.take() {
            let mut holdings = self.holdings.write().await;
            *holdings = snapshot;
            info!("❌ Asset transaction rolled back (snapshot restored)");
        }
        Ok(())
    }
}
