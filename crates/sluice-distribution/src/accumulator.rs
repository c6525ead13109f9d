//! Fixed-point accumulator arithmetic.
//!
//! Reward accrual is tracked through a monotonically increasing
//! reward-per-staked-token index in 128.128 fixed point. A participant's
//! reward for an interval is `stake × (index_now − index_at_checkpoint)`,
//! scaled back down. All intermediates are 256-bit so no multiplication can
//! silently wrap before the final scale-down division.

use primitive_types::U256;
use sluice_types::{DistributionError, Result, TokenAmount};

/// Fixed-point scale factor: 2^128.
pub const SCALE: U256 = U256([0, 0, 1, 0]);

/// Incremental index value for an interval of `elapsed` time units during
/// which `total_staked` tokens shared the reward stream.
///
/// `Δacc = elapsed × reward_amount × SCALE / (duration × total_staked)`
///
/// The caller must route zero-stake intervals to the unassigned pool
/// instead; a zero denominator here is rejected, never divided by.
pub fn accumulator_delta(
    elapsed: i64,
    reward_amount: TokenAmount,
    duration: i64,
    total_staked: TokenAmount,
) -> Result<U256> {
    if duration <= 0 || total_staked.is_zero() {
        return Err(DistributionError::DivisionByZero("accumulator denominator"));
    }

    let numerator = U256::from(reward_amount.to_base_units())
        .checked_mul(SCALE)
        .and_then(|x| x.checked_mul(U256::from(elapsed as u64)))
        .ok_or(DistributionError::Overflow("accumulator numerator"))?;

    let denominator = U256::from(duration as u64)
        .checked_mul(U256::from(total_staked.to_base_units()))
        .ok_or(DistributionError::Overflow("accumulator denominator"))?;

    numerator
        .checked_div(denominator)
        .ok_or(DistributionError::DivisionByZero("accumulator denominator"))
}

/// Scale an index delta back into base units for a given stake.
pub fn reward_from_delta(stake: TokenAmount, delta: U256) -> Result<TokenAmount> {
    let scaled = U256::from(stake.to_base_units())
        .checked_mul(delta)
        .ok_or(DistributionError::Overflow("earned reward"))?;

    let units = scaled / SCALE;
    if units.bits() > 128 {
        return Err(DistributionError::Overflow("earned reward width"));
    }
    Ok(TokenAmount::from_base_units(units.as_u128()))
}

/// The portion of `amount` corresponding to `elapsed` out of `duration`.
/// Computed from cumulative counters by the ledger so truncation never
/// compounds across consolidations.
pub fn prorated_amount(amount: TokenAmount, elapsed: i64, duration: i64) -> Result<TokenAmount> {
    if duration <= 0 {
        return Err(DistributionError::DivisionByZero("proration denominator"));
    }
    if elapsed <= 0 {
        return Ok(TokenAmount::ZERO);
    }

    let scaled = U256::from(amount.to_base_units())
        .checked_mul(U256::from(elapsed as u64))
        .ok_or(DistributionError::Overflow("proration numerator"))?;

    let units = scaled / U256::from(duration as u64);
    if units.bits() > 128 {
        return Err(DistributionError::Overflow("proration width"));
    }
    Ok(TokenAmount::from_base_units(units.as_u128()))
}
