//! Per-participant stake and reward checkpoints.
//!
//! A position snapshots the global reward index per reward token. Earned
//! balances grow by `stake × (index − snapshot)` at every checkpoint, using
//! the stake held *before* the mutation that triggered the checkpoint. The
//! snapshot is then overwritten with the global value; it is never reset to
//! zero, and the global index is never wound back, so stale-snapshot
//! underflow cannot occur.

use crate::accumulator;
use crate::ledger::RewardLedger;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sluice_types::{DistributionError, Result, TokenAmount};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakerPosition {
    /// Indexed against the distribution's canonical stakable token list.
    staked: Vec<TokenAmount>,
    total_staked: TokenAmount,
    /// Indexed against the canonical reward token list.
    consolidated_accumulators: Vec<U256>,
    earned: Vec<TokenAmount>,
}

impl StakerPosition {
    pub fn new(stakable_count: usize, reward_count: usize) -> Self {
        Self {
            staked: vec![TokenAmount::ZERO; stakable_count],
            total_staked: TokenAmount::ZERO,
            consolidated_accumulators: vec![U256::zero(); reward_count],
            earned: vec![TokenAmount::ZERO; reward_count],
        }
    }

    pub fn staked(&self) -> &[TokenAmount] {
        &self.staked
    }

    pub fn staked_for(&self, stakable_index: usize) -> TokenAmount {
        self.staked[stakable_index]
    }

    pub fn total_staked(&self) -> TokenAmount {
        self.total_staked
    }

    pub fn earned(&self) -> &[TokenAmount] {
        &self.earned
    }

    pub fn earned_for(&self, reward_index: usize) -> TokenAmount {
        self.earned[reward_index]
    }

    /// Credit rewards accrued since the last checkpoint and move the
    /// snapshots up to each ledger's current index. Must run before any
    /// stake mutation; the credit uses the pre-mutation stake.
    pub fn checkpoint(&mut self, ledgers: &[RewardLedger]) -> Result<()> {
        for (index, ledger) in ledgers.iter().enumerate() {
            let current = ledger.accumulator();
            let snapshot = self.consolidated_accumulators[index];

            let delta = current
                .checked_sub(snapshot)
                .ok_or(DistributionError::Overflow("checkpoint regression"))?;

            if !delta.is_zero() && !self.total_staked.is_zero() {
                let credit = accumulator::reward_from_delta(self.total_staked, delta)?;
                self.earned[index] = self.earned[index]
                    .checked_add(credit)
                    .ok_or(DistributionError::Overflow("earned balance"))?;
            }

            self.consolidated_accumulators[index] = current;
        }
        Ok(())
    }

    /// What `earned` would hold after a checkpoint at `now`, without
    /// mutating anything. `global_staked` is the distribution-wide total the
    /// ledgers would consolidate against.
    pub fn projected_earned(
        &self,
        ledgers: &[RewardLedger],
        now: i64,
        global_staked: TokenAmount,
    ) -> Result<Vec<TokenAmount>> {
        let mut projected = Vec::with_capacity(ledgers.len());

        for (index, ledger) in ledgers.iter().enumerate() {
            let current = ledger.projected_accumulator(now, global_staked)?;
            let snapshot = self.consolidated_accumulators[index];

            let delta = current
                .checked_sub(snapshot)
                .ok_or(DistributionError::Overflow("checkpoint regression"))?;

            let mut amount = self.earned[index];
            if !delta.is_zero() && !self.total_staked.is_zero() {
                let credit = accumulator::reward_from_delta(self.total_staked, delta)?;
                amount = amount
                    .checked_add(credit)
                    .ok_or(DistributionError::Overflow("earned balance"))?;
            }
            projected.push(amount);
        }

        Ok(projected)
    }

    pub fn add_stake(&mut self, stakable_index: usize, amount: TokenAmount) -> Result<()> {
        self.staked[stakable_index] = self.staked[stakable_index]
            .checked_add(amount)
            .ok_or(DistributionError::Overflow("staked balance"))?;
        self.total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(DistributionError::Overflow("total staked balance"))?;
        Ok(())
    }

    pub fn remove_stake(&mut self, stakable_index: usize, amount: TokenAmount) -> Result<()> {
        self.staked[stakable_index] = self.staked[stakable_index]
            .checked_sub(amount)
            .ok_or(DistributionError::Overflow("staked balance underflow"))?;
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(DistributionError::Overflow("total staked underflow"))?;
        Ok(())
    }

    pub fn deduct_earned(&mut self, reward_index: usize, amount: TokenAmount) -> Result<()> {
        self.earned[reward_index] = self.earned[reward_index]
            .checked_sub(amount)
            .ok_or(DistributionError::Overflow("earned balance underflow"))?;
        Ok(())
    }
}
