//! Per-reward-token accrual state.
//!
//! Each ledger advances a reward-per-staked-token index over consolidation
//! intervals. Intervals with zero total stake are banked as idle time
//! instead; the unassigned amount owed to the owner is always derived from
//! the cumulative idle duration, so truncation never compounds across
//! consolidations.

use crate::accumulator;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sluice_types::{AccountAddress, DistributionError, Result, TokenAmount};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardLedger {
    token: AccountAddress,
    total_amount: TokenAmount,
    starting_time: i64,
    ending_time: i64,
    per_staked_token_accumulator: U256,
    last_consolidation_time: i64,
    /// Cumulative in-window time with zero total stake.
    idle_duration: i64,
    recovered_amount: TokenAmount,
}

impl RewardLedger {
    pub fn new(
        token: AccountAddress,
        total_amount: TokenAmount,
        starting_time: i64,
        ending_time: i64,
    ) -> Self {
        Self {
            token,
            total_amount,
            starting_time,
            ending_time,
            per_staked_token_accumulator: U256::zero(),
            last_consolidation_time: starting_time,
            idle_duration: 0,
            recovered_amount: TokenAmount::ZERO,
        }
    }

    pub fn token(&self) -> AccountAddress {
        self.token
    }

    pub fn total_amount(&self) -> TokenAmount {
        self.total_amount
    }

    pub fn recovered_amount(&self) -> TokenAmount {
        self.recovered_amount
    }

    pub fn last_consolidation_time(&self) -> i64 {
        self.last_consolidation_time
    }

    pub fn accumulator(&self) -> U256 {
        self.per_staked_token_accumulator
    }

    fn duration(&self) -> i64 {
        self.ending_time - self.starting_time
    }

    /// The accrual interval `[last_consolidation, min(now, end))`, or `None`
    /// when there is nothing to advance. Instants before the window start
    /// clamp to zero-length intervals because the ledger is seeded at
    /// `starting_time`.
    fn pending_interval(&self, now: i64) -> Option<i64> {
        let effective_now = now.min(self.ending_time);
        if effective_now <= self.last_consolidation_time {
            return None;
        }
        Some(effective_now - self.last_consolidation_time)
    }

    /// Advance the index (or the idle counter) up to `min(now, end)`.
    /// Idempotent: a second call at the same instant is a no-op.
    pub fn consolidate(&mut self, now: i64, total_staked: TokenAmount) -> Result<()> {
        let elapsed = match self.pending_interval(now) {
            Some(elapsed) => elapsed,
            None => return Ok(()),
        };

        if total_staked.is_zero() {
            self.idle_duration += elapsed;
        } else {
            let delta = accumulator::accumulator_delta(
                elapsed,
                self.total_amount,
                self.duration(),
                total_staked,
            )?;
            self.per_staked_token_accumulator = self
                .per_staked_token_accumulator
                .checked_add(delta)
                .ok_or(DistributionError::Overflow("reward accumulator"))?;
        }

        self.last_consolidation_time = now.min(self.ending_time);
        debug!(
            token = %self.token,
            elapsed,
            total_staked = %total_staked,
            consolidated_to = self.last_consolidation_time,
            "Ledger consolidated"
        );
        Ok(())
    }

    /// The index value a consolidation at `now` would produce, without
    /// mutating. Read-only accessors are built on this.
    pub fn projected_accumulator(&self, now: i64, total_staked: TokenAmount) -> Result<U256> {
        let elapsed = match self.pending_interval(now) {
            Some(elapsed) => elapsed,
            None => return Ok(self.per_staked_token_accumulator),
        };

        if total_staked.is_zero() {
            return Ok(self.per_staked_token_accumulator);
        }

        let delta = accumulator::accumulator_delta(
            elapsed,
            self.total_amount,
            self.duration(),
            total_staked,
        )?;
        self.per_staked_token_accumulator
            .checked_add(delta)
            .ok_or(DistributionError::Overflow("reward accumulator"))
    }

    /// Unassigned reward banked by past consolidations and not yet
    /// recovered.
    pub fn unassigned_amount(&self) -> Result<TokenAmount> {
        let owed =
            accumulator::prorated_amount(self.total_amount, self.idle_duration, self.duration())?;
        Ok(owed.saturating_sub(self.recovered_amount))
    }

    /// Unassigned reward a consolidation at `now` would leave recoverable,
    /// without mutating.
    pub fn recoverable_amount(&self, now: i64, total_staked: TokenAmount) -> Result<TokenAmount> {
        let mut idle = self.idle_duration;
        if total_staked.is_zero() {
            if let Some(elapsed) = self.pending_interval(now) {
                idle += elapsed;
            }
        }

        let owed = accumulator::prorated_amount(self.total_amount, idle, self.duration())?;
        Ok(owed.saturating_sub(self.recovered_amount))
    }

    /// Drain the unassigned pool. The caller consolidates first and performs
    /// the payout transfer.
    pub fn recover(&mut self) -> Result<TokenAmount> {
        let amount = self.unassigned_amount()?;
        self.recovered_amount = self.recovered_amount.saturating_add(amount);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> RewardLedger {
        // 10_000_000 base units over a 100-second window.
        RewardLedger::new(
            AccountAddress::from_bytes([1; 32]),
            TokenAmount::from_base_units(10_000_000),
            1_000,
            1_100,
        )
    }

    #[test]
    fn test_noop_before_start_and_backwards() {
        let mut l = ledger();

        l.consolidate(900, TokenAmount::from_base_units(10)).unwrap();
        assert_eq!(l.accumulator(), U256::zero());
        assert_eq!(l.last_consolidation_time(), 1_000);
    }

    #[test]
    fn test_consolidation_is_idempotent_at_equal_instant() {
        let mut l = ledger();
        let stake = TokenAmount::from_base_units(10);

        l.consolidate(1_050, stake).unwrap();
        let first = l.accumulator();
        l.consolidate(1_050, stake).unwrap();

        assert_eq!(l.accumulator(), first);
    }

    #[test]
    fn test_zero_stake_routes_to_idle_not_accumulator() {
        let mut l = ledger();

        l.consolidate(1_030, TokenAmount::ZERO).unwrap();
        assert_eq!(l.accumulator(), U256::zero());
        assert_eq!(
            l.unassigned_amount().unwrap(),
            TokenAmount::from_base_units(3_000_000)
        );
    }

    #[test]
    fn test_clamped_at_ending_time() {
        let mut l = ledger();
        let stake = TokenAmount::from_base_units(10);

        l.consolidate(5_000, stake).unwrap();
        assert_eq!(l.last_consolidation_time(), 1_100);

        let at_end = l.accumulator();
        l.consolidate(9_000, stake).unwrap();
        assert_eq!(l.accumulator(), at_end);
    }

    #[test]
    fn test_projection_matches_consolidation_and_does_not_mutate() {
        let mut l = ledger();
        let stake = TokenAmount::from_base_units(7);

        let projected = l.projected_accumulator(1_040, stake).unwrap();
        assert_eq!(l.accumulator(), U256::zero());

        l.consolidate(1_040, stake).unwrap();
        assert_eq!(l.accumulator(), projected);
    }

    #[test]
    fn test_recover_drains_idle_accrual_exactly() {
        let mut l = ledger();

        // Whole window idle.
        l.consolidate(1_100, TokenAmount::ZERO).unwrap();
        let recovered = l.recover().unwrap();

        assert_eq!(recovered, TokenAmount::from_base_units(10_000_000));
        assert_eq!(l.unassigned_amount().unwrap(), TokenAmount::ZERO);
        assert_eq!(l.recover().unwrap(), TokenAmount::ZERO);
    }

    #[test]
    fn test_split_idle_intervals_lose_no_dust() {
        // 10 units over 3 seconds: per-interval proration would truncate,
        // cumulative idle accounting must not.
        let mut l = RewardLedger::new(
            AccountAddress::from_bytes([2; 32]),
            TokenAmount::from_base_units(10),
            0,
            3,
        );

        l.consolidate(1, TokenAmount::ZERO).unwrap();
        l.consolidate(2, TokenAmount::ZERO).unwrap();
        l.consolidate(3, TokenAmount::ZERO).unwrap();

        assert_eq!(l.recover().unwrap(), TokenAmount::from_base_units(10));
    }

    #[test]
    fn test_recoverable_amount_simulates_trailing_idle() {
        let mut l = ledger();
        let stake = TokenAmount::from_base_units(10);

        // Staked for the first half, empty afterwards.
        l.consolidate(1_050, stake).unwrap();

        let recoverable = l.recoverable_amount(1_100, TokenAmount::ZERO).unwrap();
        assert_eq!(recoverable, TokenAmount::from_base_units(5_000_000));
        // Simulation did not bank anything.
        assert_eq!(l.unassigned_amount().unwrap(), TokenAmount::ZERO);
    }
}
