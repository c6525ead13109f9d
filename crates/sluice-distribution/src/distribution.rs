//! The distribution state machine.
//!
//! Every mutating operation follows the same backbone: take the state write
//! lock, validate preconditions, consolidate every reward ledger up to
//! `min(now, ending_time)`, checkpoint the caller's position, apply the
//! operation's own effect, and only then issue collaborator transfers. A
//! collaborator failure restores the pre-operation snapshot, so each
//! operation is all-or-nothing.

use crate::assets::AssetLedger;
use crate::clock::TimeSource;
use crate::ledger::RewardLedger;
use crate::pause::PauseProbe;
use crate::position::StakerPosition;
use crate::types::{
    DistributionConfig, DistributionEvent, DistributionEventKind, DistributionMetrics,
    LifecycleState, RewardTokenMetrics,
};
use sluice_types::{
    AccountAddress, DistributionError, Result, TokenAmount, MAX_TOKEN_DECIMALS,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

const EVENT_HISTORY_LIMIT: usize = 10_000;

type Transfer = (AccountAddress, AccountAddress, AccountAddress, TokenAmount);

#[derive(Debug, Clone)]
struct DistributionState {
    lifecycle: LifecycleState,
    config: Option<DistributionConfig>,
    ledgers: Vec<RewardLedger>,
    positions: HashMap<AccountAddress, StakerPosition>,
    total_staked: TokenAmount,
    /// Per reward token, cumulative amount paid out through claims.
    claimed: Vec<TokenAmount>,
    events: Vec<DistributionEvent>,
}

pub struct Distribution {
    id: u64,
    address: AccountAddress,
    owner: AccountAddress,
    state: RwLock<DistributionState>,
    assets: Arc<dyn AssetLedger>,
    clock: Arc<dyn TimeSource>,
    pause: Arc<dyn PauseProbe>,
}

impl Distribution {
    pub fn new(
        id: u64,
        owner: AccountAddress,
        address: AccountAddress,
        assets: Arc<dyn AssetLedger>,
        clock: Arc<dyn TimeSource>,
        pause: Arc<dyn PauseProbe>,
    ) -> Self {
        Self {
            id,
            address,
            owner,
            state: RwLock::new(DistributionState {
                lifecycle: LifecycleState::Uninitialized,
                config: None,
                ledgers: Vec::new(),
                positions: HashMap::new(),
                total_staked: TokenAmount::ZERO,
                claimed: Vec::new(),
                events: Vec::new(),
            }),
            assets,
            clock,
            pause,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> AccountAddress {
        self.owner
    }

    /// The account under which this distribution holds collaborator
    /// balances. Reward funding must land here before `initialize`.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    // ---------------------------------------------------------------
    // Mutating operations
    // ---------------------------------------------------------------

    /// One-time setup. Reward funding follows the push-before-call pattern:
    /// the collaborator balance of every reward token held under
    /// `self.address()` must already cover the declared amount.
    pub async fn initialize(&self, config: DistributionConfig) -> Result<()> {
        let mut state = self.state.write().await;
        match state.lifecycle {
            LifecycleState::Initialized => return Err(DistributionError::AlreadyInitialized),
            LifecycleState::Canceled => return Err(DistributionError::Canceled),
            LifecycleState::Uninitialized => {}
        }

        let now = self.clock.now();
        if config.ending_time <= config.starting_time {
            return Err(DistributionError::InvalidWindow {
                start: config.starting_time,
                end: config.ending_time,
            });
        }
        if config.starting_time <= now {
            return Err(DistributionError::AlreadyStarted);
        }
        if config.reward_tokens.is_empty() {
            return Err(DistributionError::EmptyTokenList("reward"));
        }
        if config.stakable_tokens.is_empty() {
            return Err(DistributionError::EmptyTokenList("stakable"));
        }
        if config.reward_amounts.len() != config.reward_tokens.len() {
            return Err(DistributionError::LengthMismatch {
                expected: config.reward_tokens.len(),
                got: config.reward_amounts.len(),
            });
        }

        for (token, amount) in config.reward_tokens.iter().zip(&config.reward_amounts) {
            if token.is_placeholder() {
                return Err(DistributionError::PlaceholderAddress);
            }
            if amount.is_zero() {
                return Err(DistributionError::ZeroRewardAmount { token: *token });
            }
        }
        for token in &config.stakable_tokens {
            if token.is_placeholder() {
                return Err(DistributionError::PlaceholderAddress);
            }
        }

        for token in config.reward_tokens.iter().chain(&config.stakable_tokens) {
            let decimals = self
                .assets
                .decimals(*token)
                .await
                .map_err(collaborator_error)?;
            if decimals > MAX_TOKEN_DECIMALS {
                return Err(DistributionError::DecimalsTooHigh {
                    token: *token,
                    decimals,
                    max: MAX_TOKEN_DECIMALS,
                });
            }
        }

        // Funding check, aggregated in case a reward token appears twice.
        let mut required: HashMap<AccountAddress, TokenAmount> = HashMap::new();
        for (token, amount) in config.reward_tokens.iter().zip(&config.reward_amounts) {
            let entry = required.entry(*token).or_insert(TokenAmount::ZERO);
            *entry = entry
                .checked_add(*amount)
                .ok_or(DistributionError::Overflow("declared reward funding"))?;
        }
        for (token, declared) in &required {
            let held = self
                .assets
                .balance_of(*token, self.address)
                .await
                .map_err(collaborator_error)?;
            if held < *declared {
                return Err(DistributionError::FundingShortfall {
                    token: *token,
                    declared: *declared,
                    held,
                });
            }
        }

        state.ledgers = config
            .reward_tokens
            .iter()
            .zip(&config.reward_amounts)
            .map(|(token, amount)| {
                RewardLedger::new(*token, *amount, config.starting_time, config.ending_time)
            })
            .collect();
        state.claimed = vec![TokenAmount::ZERO; config.reward_tokens.len()];
        state.lifecycle = LifecycleState::Initialized;

        record_event(
            &mut state,
            now,
            DistributionEventKind::Initialized {
                reward_tokens: config.reward_tokens.clone(),
                reward_amounts: config.reward_amounts.clone(),
                starting_time: config.starting_time,
                ending_time: config.ending_time,
            },
        );

        info!(
            distribution = self.id,
            reward_tokens = config.reward_tokens.len(),
            starting_time = config.starting_time,
            ending_time = config.ending_time,
            locked = config.locked,
            "✅ Distribution initialized"
        );
        state.config = Some(config);
        Ok(())
    }

    /// Owner-only, strictly pre-start. Refunds the full funding of every
    /// reward token and moves the distribution to its terminal state.
    pub async fn cancel(&self, caller: AccountAddress) -> Result<Vec<TokenAmount>> {
        let mut state = self.state.write().await;
        let config = live_config(&state)?.clone();

        if caller != self.owner {
            return Err(DistributionError::NotOwner);
        }
        let now = self.clock.now();
        if now >= config.starting_time {
            return Err(DistributionError::AlreadyStarted);
        }

        let refunds: Vec<TokenAmount> =
            state.ledgers.iter().map(|l| l.total_amount()).collect();

        let snapshot = state.clone();
        state.lifecycle = LifecycleState::Canceled;
        record_event(
            &mut state,
            now,
            DistributionEventKind::Canceled {
                refunds: refunds.clone(),
            },
        );

        let transfers: Vec<Transfer> = config
            .reward_tokens
            .iter()
            .zip(&refunds)
            .map(|(token, amount)| (*token, self.address, self.owner, *amount))
            .collect();
        if let Err(e) = self.transfer_batch(transfers).await {
            *state = snapshot;
            return Err(e);
        }

        info!(distribution = self.id, "❌ Distribution canceled, funding refunded");
        Ok(refunds)
    }

    /// Lock stakable tokens. An all-zero request is a valid no-op whose only
    /// effect is checkpointing the caller's earned rewards.
    pub async fn stake(&self, caller: AccountAddress, amounts: &[TokenAmount]) -> Result<()> {
        let mut state = self.state.write().await;
        let config = live_config(&state)?.clone();
        let now = self.clock.now();

        if now < config.starting_time {
            return Err(DistributionError::NotStarted);
        }
        if self.pause.is_staking_paused() {
            return Err(DistributionError::StakingPaused);
        }
        if amounts.len() != config.stakable_tokens.len() {
            return Err(DistributionError::LengthMismatch {
                expected: config.stakable_tokens.len(),
                got: amounts.len(),
            });
        }

        let mut staked_total = TokenAmount::ZERO;
        for amount in amounts {
            staked_total = staked_total
                .checked_add(*amount)
                .ok_or(DistributionError::Overflow("stake request total"))?;
        }
        let new_total = state
            .total_staked
            .checked_add(staked_total)
            .ok_or(DistributionError::Overflow("total staked"))?;
        if !config.staking_cap.is_zero() && new_total > config.staking_cap {
            return Err(DistributionError::StakingCapExceeded {
                cap: config.staking_cap,
                attempted: new_total,
            });
        }

        let snapshot = state.clone();
        if let Err(e) = apply_stake(&mut state, &config, caller, amounts, now) {
            *state = snapshot;
            return Err(e);
        }

        let transfers: Vec<Transfer> = config
            .stakable_tokens
            .iter()
            .zip(amounts)
            .map(|(token, amount)| (*token, caller, self.address, *amount))
            .collect();
        if let Err(e) = self.transfer_batch(transfers).await {
            *state = snapshot;
            return Err(e);
        }

        info!(
            distribution = self.id,
            staker = %caller,
            amount = %staked_total,
            total_staked = %state.total_staked,
            "🔒 Stake deposited"
        );
        Ok(())
    }

    /// Release stakable tokens. Rejected while `locked` until the window
    /// ends.
    pub async fn withdraw(&self, caller: AccountAddress, amounts: &[TokenAmount]) -> Result<()> {
        let mut state = self.state.write().await;
        let config = live_config(&state)?.clone();
        let now = self.clock.now();

        if amounts.len() != config.stakable_tokens.len() {
            return Err(DistributionError::LengthMismatch {
                expected: config.stakable_tokens.len(),
                got: amounts.len(),
            });
        }
        if config.locked && now < config.ending_time {
            return Err(DistributionError::LockedUntilEnd);
        }

        let snapshot = state.clone();
        if let Err(e) = apply_withdraw(&mut state, &config, caller, amounts, now) {
            *state = snapshot;
            return Err(e);
        }

        let transfers: Vec<Transfer> = config
            .stakable_tokens
            .iter()
            .zip(amounts)
            .map(|(token, amount)| (*token, self.address, caller, *amount))
            .collect();
        if let Err(e) = self.transfer_batch(transfers).await {
            *state = snapshot;
            return Err(e);
        }

        info!(
            distribution = self.id,
            staker = %caller,
            total_staked = %state.total_staked,
            "🔓 Stake withdrawn"
        );
        Ok(())
    }

    /// Pay out up to the caller's earned balance, token by token, to
    /// `recipient`.
    pub async fn claim(
        &self,
        caller: AccountAddress,
        amounts: &[TokenAmount],
        recipient: AccountAddress,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let config = live_config(&state)?.clone();
        let now = self.clock.now();

        if recipient.is_placeholder() {
            return Err(DistributionError::PlaceholderAddress);
        }
        if amounts.len() != config.reward_tokens.len() {
            return Err(DistributionError::LengthMismatch {
                expected: config.reward_tokens.len(),
                got: amounts.len(),
            });
        }

        let snapshot = state.clone();
        if let Err(e) = apply_claim(&mut state, &config, caller, amounts, recipient, now) {
            *state = snapshot;
            return Err(e);
        }

        let transfers: Vec<Transfer> = config
            .reward_tokens
            .iter()
            .zip(amounts)
            .map(|(token, amount)| (*token, self.address, recipient, *amount))
            .collect();
        if let Err(e) = self.transfer_batch(transfers).await {
            *state = snapshot;
            return Err(e);
        }

        info!(
            distribution = self.id,
            staker = %caller,
            recipient = %recipient,
            "💰 Rewards claimed"
        );
        Ok(())
    }

    /// Claim the full earned balance of every reward token.
    pub async fn claim_all(
        &self,
        caller: AccountAddress,
        recipient: AccountAddress,
    ) -> Result<Vec<TokenAmount>> {
        let mut state = self.state.write().await;
        let config = live_config(&state)?.clone();
        let now = self.clock.now();

        if recipient.is_placeholder() {
            return Err(DistributionError::PlaceholderAddress);
        }

        let snapshot = state.clone();
        let amounts = match apply_claim_all(&mut state, &config, caller, recipient, now) {
            Ok(amounts) => amounts,
            Err(e) => {
                *state = snapshot;
                return Err(e);
            }
        };

        let transfers: Vec<Transfer> = config
            .reward_tokens
            .iter()
            .zip(&amounts)
            .map(|(token, amount)| (*token, self.address, recipient, *amount))
            .collect();
        if let Err(e) = self.transfer_batch(transfers).await {
            *state = snapshot;
            return Err(e);
        }

        info!(
            distribution = self.id,
            staker = %caller,
            recipient = %recipient,
            "💰 All rewards claimed"
        );
        Ok(amounts)
    }

    /// Pay reward that accrued during zero-stake intervals to the owner.
    /// Callable by anyone once the distribution has started.
    pub async fn recover_unassigned_rewards(&self) -> Result<Vec<TokenAmount>> {
        let mut state = self.state.write().await;
        let config = live_config(&state)?.clone();
        let now = self.clock.now();

        if now < config.starting_time {
            return Err(DistributionError::NotStarted);
        }

        let snapshot = state.clone();
        let amounts = match apply_recover(&mut state, self.owner, now) {
            Ok(amounts) => amounts,
            Err(e) => {
                *state = snapshot;
                return Err(e);
            }
        };

        let transfers: Vec<Transfer> = config
            .reward_tokens
            .iter()
            .zip(&amounts)
            .map(|(token, amount)| (*token, self.address, self.owner, *amount))
            .collect();
        if let Err(e) = self.transfer_batch(transfers).await {
            *state = snapshot;
            return Err(e);
        }

        info!(
            distribution = self.id,
            owner = %self.owner,
            "🧹 Unassigned rewards recovered"
        );
        Ok(amounts)
    }

    // ---------------------------------------------------------------
    // Read-only queries (pure: consolidation is simulated, never applied)
    // ---------------------------------------------------------------

    pub async fn lifecycle(&self) -> LifecycleState {
        self.state.read().await.lifecycle
    }

    pub async fn is_active(&self) -> bool {
        let state = self.state.read().await;
        match (&state.lifecycle, &state.config) {
            (LifecycleState::Initialized, Some(config)) => {
                let now = self.clock.now();
                now >= config.starting_time && now < config.ending_time
            }
            _ => false,
        }
    }

    pub async fn is_ended(&self) -> bool {
        let state = self.state.read().await;
        match (&state.lifecycle, &state.config) {
            (LifecycleState::Initialized, Some(config)) => self.clock.now() >= config.ending_time,
            _ => false,
        }
    }

    pub async fn reward_tokens(&self) -> Vec<AccountAddress> {
        let state = self.state.read().await;
        state
            .config
            .as_ref()
            .map(|c| c.reward_tokens.clone())
            .unwrap_or_default()
    }

    pub async fn reward_amounts(&self) -> Vec<TokenAmount> {
        let state = self.state.read().await;
        state
            .config
            .as_ref()
            .map(|c| c.reward_amounts.clone())
            .unwrap_or_default()
    }

    pub async fn stakable_tokens(&self) -> Vec<AccountAddress> {
        let state = self.state.read().await;
        state
            .config
            .as_ref()
            .map(|c| c.stakable_tokens.clone())
            .unwrap_or_default()
    }

    pub async fn staking_window(&self) -> Option<(i64, i64)> {
        let state = self.state.read().await;
        state
            .config
            .as_ref()
            .map(|c| (c.starting_time, c.ending_time))
    }

    pub async fn total_staked_tokens_amount(&self) -> TokenAmount {
        self.state.read().await.total_staked
    }

    /// Per-stakable-token balances for one participant, positional against
    /// the canonical stakable token list.
    pub async fn staked_tokens_of(&self, participant: AccountAddress) -> Vec<TokenAmount> {
        let state = self.state.read().await;
        let stakable_count = state
            .config
            .as_ref()
            .map(|c| c.stakable_tokens.len())
            .unwrap_or(0);
        state
            .positions
            .get(&participant)
            .map(|p| p.staked().to_vec())
            .unwrap_or_else(|| vec![TokenAmount::ZERO; stakable_count])
    }

    /// Earned rewards including accrual since the last checkpoint,
    /// positional against the canonical reward token list.
    pub async fn earned_rewards_of(&self, participant: AccountAddress) -> Result<Vec<TokenAmount>> {
        let state = self.state.read().await;
        let now = self.clock.now();

        match state.positions.get(&participant) {
            Some(position) => {
                position.projected_earned(&state.ledgers, now, state.total_staked)
            }
            None => Ok(vec![TokenAmount::ZERO; state.ledgers.len()]),
        }
    }

    /// Unassigned reward a recovery at `now` would pay for `token`.
    pub async fn recoverable_unassigned_reward(
        &self,
        token: AccountAddress,
    ) -> Result<TokenAmount> {
        let state = self.state.read().await;
        let now = self.clock.now();

        let ledger = state
            .ledgers
            .iter()
            .find(|l| l.token() == token)
            .ok_or(DistributionError::UnknownRewardToken(token))?;
        ledger.recoverable_amount(now, state.total_staked)
    }

    /// Accounting snapshot as of each ledger's and position's last
    /// consolidation.
    pub async fn get_metrics(&self) -> Result<DistributionMetrics> {
        let state = self.state.read().await;

        let mut rewards = Vec::with_capacity(state.ledgers.len());
        for (index, ledger) in state.ledgers.iter().enumerate() {
            let mut outstanding_earned = TokenAmount::ZERO;
            for position in state.positions.values() {
                outstanding_earned = outstanding_earned.saturating_add(position.earned_for(index));
            }

            rewards.push(RewardTokenMetrics {
                token: ledger.token(),
                funded: ledger.total_amount(),
                claimed: state.claimed[index],
                recovered: ledger.recovered_amount(),
                outstanding_earned,
                outstanding_unassigned: ledger.unassigned_amount()?,
            });
        }

        Ok(DistributionMetrics {
            lifecycle: state.lifecycle,
            total_staked: state.total_staked,
            participant_count: state
                .positions
                .values()
                .filter(|p| !p.total_staked().is_zero())
                .count(),
            rewards,
        })
    }

    pub async fn recent_events(&self, limit: usize) -> Vec<DistributionEvent> {
        let state = self.state.read().await;
        let start = state.events.len().saturating_sub(limit);
        state.events[start..].to_vec()
    }

    // ---------------------------------------------------------------
    // Collaborator interaction
    // ---------------------------------------------------------------

    async fn transfer_batch(&self, transfers: Vec<Transfer>) -> Result<()> {
        self.assets
            .begin_transaction()
            .await
            .map_err(collaborator_error)?;

        for (token, from, to, amount) in transfers {
            if amount.is_zero() {
                continue;
            }
            if let Err(e) = self.assets.transfer(token, from, to, amount).await {
                let _ = self.assets.rollback_transaction().await;
                return Err(collaborator_error(e));
            }
        }

        self.assets
            .commit_transaction()
            .await
            .map_err(collaborator_error)
    }
}

fn collaborator_error(e: anyhow::Error) -> DistributionError {
    DistributionError::Collaborator(e.to_string())
}

/// Initialized-and-not-canceled gate shared by every post-setup operation.
fn live_config(state: &DistributionState) -> Result<&DistributionConfig> {
    match state.lifecycle {
        LifecycleState::Uninitialized => Err(DistributionError::NotInitialized),
        LifecycleState::Canceled => Err(DistributionError::Canceled),
        LifecycleState::Initialized => state
            .config
            .as_ref()
            .ok_or(DistributionError::NotInitialized),
    }
}

/// Advance every ledger to `min(now, ending_time)` against the current
/// total stake.
fn consolidate_all(state: &mut DistributionState, now: i64) -> Result<()> {
    let total_staked = state.total_staked;
    for ledger in &mut state.ledgers {
        ledger.consolidate(now, total_staked)?;
    }
    Ok(())
}

fn record_event(state: &mut DistributionState, timestamp: i64, kind: DistributionEventKind) {
    state.events.push(DistributionEvent { timestamp, kind });
    if state.events.len() > EVENT_HISTORY_LIMIT {
        state.events.drain(0..EVENT_HISTORY_LIMIT / 10);
    }
}

/// The consolidation protocol: every ledger advances to `min(now, end)`,
/// then the participant's position is checkpointed with its pre-mutation
/// stake. New positions snapshot the current index with zero stake, so a
/// late joiner never earns retroactively.
fn apply_stake(
    state: &mut DistributionState,
    config: &DistributionConfig,
    caller: AccountAddress,
    amounts: &[TokenAmount],
    now: i64,
) -> Result<()> {
    consolidate_all(state, now)?;

    let position = state.positions.entry(caller).or_insert_with(|| {
        StakerPosition::new(config.stakable_tokens.len(), config.reward_tokens.len())
    });
    position.checkpoint(&state.ledgers)?;

    let mut staked_total = TokenAmount::ZERO;
    for (index, amount) in amounts.iter().enumerate() {
        position.add_stake(index, *amount)?;
        staked_total = staked_total
            .checked_add(*amount)
            .ok_or(DistributionError::Overflow("stake request total"))?;
    }
    state.total_staked = state
        .total_staked
        .checked_add(staked_total)
        .ok_or(DistributionError::Overflow("total staked"))?;

    record_event(
        state,
        now,
        DistributionEventKind::Staked {
            staker: caller,
            amounts: amounts.to_vec(),
        },
    );
    Ok(())
}

fn apply_withdraw(
    state: &mut DistributionState,
    config: &DistributionConfig,
    caller: AccountAddress,
    amounts: &[TokenAmount],
    now: i64,
) -> Result<()> {
    consolidate_all(state, now)?;

    let position = state.positions.entry(caller).or_insert_with(|| {
        StakerPosition::new(config.stakable_tokens.len(), config.reward_tokens.len())
    });
    position.checkpoint(&state.ledgers)?;

    for (index, amount) in amounts.iter().enumerate() {
        let staked = position.staked_for(index);
        if *amount > staked {
            return Err(DistributionError::InsufficientStake {
                token: config.stakable_tokens[index],
                staked,
                requested: *amount,
            });
        }
    }

    let mut withdrawn_total = TokenAmount::ZERO;
    for (index, amount) in amounts.iter().enumerate() {
        position.remove_stake(index, *amount)?;
        withdrawn_total = withdrawn_total.saturating_add(*amount);
    }
    state.total_staked = state
        .total_staked
        .checked_sub(withdrawn_total)
        .ok_or(DistributionError::Overflow("total staked underflow"))?;

    record_event(
        state,
        now,
        DistributionEventKind::Withdrawn {
            staker: caller,
            amounts: amounts.to_vec(),
        },
    );
    Ok(())
}

fn apply_claim(
    state: &mut DistributionState,
    config: &DistributionConfig,
    caller: AccountAddress,
    amounts: &[TokenAmount],
    recipient: AccountAddress,
    now: i64,
) -> Result<()> {
    consolidate_all(state, now)?;

    let position = state.positions.entry(caller).or_insert_with(|| {
        StakerPosition::new(config.stakable_tokens.len(), config.reward_tokens.len())
    });
    position.checkpoint(&state.ledgers)?;

    for (index, amount) in amounts.iter().enumerate() {
        let earned = position.earned_for(index);
        if *amount > earned {
            return Err(DistributionError::ClaimExceedsEarned {
                token: config.reward_tokens[index],
                earned,
                requested: *amount,
            });
        }
    }

    for (index, amount) in amounts.iter().enumerate() {
        position.deduct_earned(index, *amount)?;
        state.claimed[index] = state.claimed[index]
            .checked_add(*amount)
            .ok_or(DistributionError::Overflow("claimed total"))?;
    }

    record_event(
        state,
        now,
        DistributionEventKind::RewardsClaimed {
            staker: caller,
            recipient,
            amounts: amounts.to_vec(),
        },
    );
    Ok(())
}

fn apply_claim_all(
    state: &mut DistributionState,
    config: &DistributionConfig,
    caller: AccountAddress,
    recipient: AccountAddress,
    now: i64,
) -> Result<Vec<TokenAmount>> {
    consolidate_all(state, now)?;

    let position = state.positions.entry(caller).or_insert_with(|| {
        StakerPosition::new(config.stakable_tokens.len(), config.reward_tokens.len())
    });
    position.checkpoint(&state.ledgers)?;
    let amounts = position.earned().to_vec();

    for (index, amount) in amounts.iter().enumerate() {
        position.deduct_earned(index, *amount)?;
        state.claimed[index] = state.claimed[index]
            .checked_add(*amount)
            .ok_or(DistributionError::Overflow("claimed total"))?;
    }

    record_event(
        state,
        now,
        DistributionEventKind::RewardsClaimed {
            staker: caller,
            recipient,
            amounts: amounts.clone(),
        },
    );
    Ok(amounts)
}

fn apply_recover(
    state: &mut DistributionState,
    owner: AccountAddress,
    now: i64,
) -> Result<Vec<TokenAmount>> {
    consolidate_all(state, now)?;

    let mut amounts = Vec::with_capacity(state.ledgers.len());
    for ledger in &mut state.ledgers {
        amounts.push(ledger.recover()?);
    }

    record_event(
        state,
        now,
        DistributionEventKind::UnassignedRecovered {
            recipient: owner,
            amounts: amounts.clone(),
        },
    );
    Ok(amounts)
}
