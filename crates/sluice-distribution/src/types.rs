use serde::{Deserialize, Serialize};
use sluice_types::{AccountAddress, TokenAmount};

/// Stored lifecycle states. Active and Ended are derived from the clock, not
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Canceled,
}

/// Everything fixed at `initialize` time. The reward and stakable token
/// orderings are canonical: every later amount array is positional against
/// these lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    pub reward_tokens: Vec<AccountAddress>,
    pub reward_amounts: Vec<TokenAmount>,
    pub stakable_tokens: Vec<AccountAddress>,
    pub starting_time: i64,
    pub ending_time: i64,
    pub locked: bool,
    /// Zero means unlimited.
    pub staking_cap: TokenAmount,
}

impl DistributionConfig {
    pub fn duration(&self) -> i64 {
        self.ending_time - self.starting_time
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionEvent {
    pub timestamp: i64,
    pub kind: DistributionEventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DistributionEventKind {
    Initialized {
        reward_tokens: Vec<AccountAddress>,
        reward_amounts: Vec<TokenAmount>,
        starting_time: i64,
        ending_time: i64,
    },
    Staked {
        staker: AccountAddress,
        amounts: Vec<TokenAmount>,
    },
    Withdrawn {
        staker: AccountAddress,
        amounts: Vec<TokenAmount>,
    },
    RewardsClaimed {
        staker: AccountAddress,
        recipient: AccountAddress,
        amounts: Vec<TokenAmount>,
    },
    UnassignedRecovered {
        recipient: AccountAddress,
        amounts: Vec<TokenAmount>,
    },
    Canceled {
        refunds: Vec<TokenAmount>,
    },
}

/// Point-in-time accounting snapshot for one reward token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardTokenMetrics {
    pub token: AccountAddress,
    pub funded: TokenAmount,
    pub claimed: TokenAmount,
    pub recovered: TokenAmount,
    /// Earned but not yet claimed, as of each participant's last checkpoint.
    pub outstanding_earned: TokenAmount,
    /// Accrued during zero-stake intervals and not yet recovered, as of the
    /// last consolidation.
    pub outstanding_unassigned: TokenAmount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionMetrics {
    pub lifecycle: LifecycleState,
    pub total_staked: TokenAmount,
    pub participant_count: usize,
    pub rewards: Vec<RewardTokenMetrics>,
}
