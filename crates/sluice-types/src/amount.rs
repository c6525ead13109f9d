use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Largest decimal count a collaborator token may declare. Anything above
/// this would push the fixed-point intermediates past their headroom.
pub const MAX_TOKEN_DECIMALS: u32 = 18;

/// An asset quantity in the token's smallest denomination (base units).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Whole tokens scaled by the token's decimal count.
    pub fn from_whole(whole: u128, decimals: u32) -> Self {
        Self(whole * 10u128.pow(decimals))
    }

    pub fn to_base_units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Absolute difference, used by tests asserting bounded truncation.
    pub fn abs_diff(&self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }
}

impl Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc.saturating_add(x))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
