use crate::address::AccountAddress;
use crate::amount::TokenAmount;
use thiserror::Error;

/// Engine error taxonomy. Every public operation rejects with exactly one of
/// these codes before any collaborator transfer is attempted; collaborator
/// failures propagate through `Collaborator`.
#[derive(Error, Debug, Clone)]
pub enum DistributionError {
    // Lifecycle violations
    #[error("Distribution already initialized")]
    AlreadyInitialized,

    #[error("Distribution not initialized")]
    NotInitialized,

    #[error("Distribution was canceled")]
    Canceled,

    #[error("Distribution has not started yet")]
    NotStarted,

    #[error("Distribution already started")]
    AlreadyStarted,

    #[error("Withdrawals are locked until the distribution ends")]
    LockedUntilEnd,

    #[error("Staking is globally paused")]
    StakingPaused,

    #[error("Caller is not the distribution owner")]
    NotOwner,

    #[error("Invalid distribution window: start {start}, end {end}")]
    InvalidWindow { start: i64, end: i64 },

    // Consistency violations
    #[error("{0} token list is empty")]
    EmptyTokenList(&'static str),

    #[error("Array length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Reward amount for {token} must be non-zero")]
    ZeroRewardAmount { token: AccountAddress },

    #[error("Placeholder address is not a valid token or recipient")]
    PlaceholderAddress,

    #[error("Token {token} declares {decimals} decimals, maximum is {max}")]
    DecimalsTooHigh {
        token: AccountAddress,
        decimals: u32,
        max: u32,
    },

    #[error("Staking cap exceeded: cap {cap}, attempted total {attempted}")]
    StakingCapExceeded {
        cap: TokenAmount,
        attempted: TokenAmount,
    },

    #[error("Insufficient staked balance for {token}: staked {staked}, requested {requested}")]
    InsufficientStake {
        token: AccountAddress,
        staked: TokenAmount,
        requested: TokenAmount,
    },

    #[error("Claim exceeds earned balance for {token}: earned {earned}, requested {requested}")]
    ClaimExceedsEarned {
        token: AccountAddress,
        earned: TokenAmount,
        requested: TokenAmount,
    },

    #[error("Funding shortfall for {token}: declared {declared}, held {held}")]
    FundingShortfall {
        token: AccountAddress,
        declared: TokenAmount,
        held: TokenAmount,
    },

    #[error("Unknown reward token {0}")]
    UnknownRewardToken(AccountAddress),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // Arithmetic violations
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    // Collaborator failures, propagated as-is
    #[error("Collaborator failure: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, DistributionError>;
