use proptest::prelude::*;
use sluice_distribution::{
    AccountAddress, Distribution, DistributionConfig, DistributionFactory, MemoryAssets,
    StepClock, TokenAmount,
};
use std::sync::Arc;

const STARTING_TIME: i64 = 100;
const ENDING_TIME: i64 = 1_100;
const FUNDED: u128 = 1_000_000_000;

fn addr(byte: u8) -> AccountAddress {
    AccountAddress::from_bytes([byte; 32])
}

fn units(n: u128) -> TokenAmount {
    TokenAmount::from_base_units(n)
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Stake(u128),
    Withdraw(u128),
    ClaimAll,
    Recover,
}

prop_compose! {
    fn arb_op()
        (kind in 0u8..4, amount in 1u128..=5_000) -> Op {
        match kind {
            0 => Op::Stake(amount),
            1 => Op::Withdraw(amount),
            2 => Op::ClaimAll,
            _ => Op::Recover,
        }
    }
}

prop_compose! {
    fn arb_step()
        (staker in 0usize..4, advance in 0i64..40, op in arb_op()) -> (usize, i64, Op) {
        (staker, advance, op)
    }
}

async fn build_campaign(
    assets: &Arc<MemoryAssets>,
    clock: &Arc<StepClock>,
    factory: &DistributionFactory,
    stakers: &[AccountAddress],
) -> Arc<Distribution> {
    let owner = addr(200);
    let reward = addr(210);
    let stakable = addr(211);

    assets.register_token(reward, 6).await;
    assets.register_token(stakable, 6).await;

    let distribution = factory.create_distribution(owner).await;
    assets.mint(reward, distribution.address(), units(FUNDED)).await;
    for staker in stakers {
        assets.mint(stakable, *staker, units(1_000_000)).await;
    }

    clock.set(0);
    distribution
        .initialize(DistributionConfig {
            reward_tokens: vec![reward],
            reward_amounts: vec![units(FUNDED)],
            stakable_tokens: vec![stakable],
            starting_time: STARTING_TIME,
            ending_time: ENDING_TIME,
            locked: false,
            staking_cap: TokenAmount::ZERO,
        })
        .await
        .unwrap();
    clock.set(STARTING_TIME);
    distribution
}

// Property: conservation holds under arbitrary interleavings of
// stake/withdraw/claim/recover across participants, within a truncation
// tolerance bounded by the number of checkpoint events.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_conservation_under_random_interleavings(
        steps in prop::collection::vec(arb_step(), 1..60)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let assets = Arc::new(MemoryAssets::new());
            let clock = Arc::new(StepClock::starting_at(0));
            let factory = DistributionFactory::new(assets.clone(), clock.clone());

            let stakers: Vec<AccountAddress> = (1..=4).map(addr).collect();
            let distribution = build_campaign(&assets, &clock, &factory, &stakers).await;
            let reward = distribution.reward_tokens().await[0];

            let step_count = steps.len();
            for (staker_index, advance, op) in steps {
                clock.advance(advance);
                let staker = stakers[staker_index];

                match op {
                    Op::Stake(amount) => {
                        distribution.stake(staker, &[units(amount)]).await.unwrap();
                    }
                    Op::Withdraw(amount) => {
                        let staked = distribution.staked_tokens_of(staker).await[0];
                        let amount = units(amount.min(staked.to_base_units()));
                        distribution.withdraw(staker, &[amount]).await.unwrap();
                    }
                    Op::ClaimAll => {
                        distribution.claim_all(staker, staker).await.unwrap();
                    }
                    Op::Recover => {
                        distribution.recover_unassigned_rewards().await.unwrap();
                    }
                }
            }

            // Settle everything after the end, then account for every unit
            // through the cumulative claim/recovery totals.
            clock.set(ENDING_TIME + 10);
            for staker in &stakers {
                distribution.claim_all(*staker, *staker).await.unwrap();
            }
            distribution.recover_unassigned_rewards().await.unwrap();

            let metrics = distribution.get_metrics().await.unwrap();
            let accounted = metrics.rewards[0]
                .claimed
                .saturating_add(metrics.rewards[0].recovered);

            let funded = units(FUNDED);
            prop_assert!(accounted <= funded);
            // One checkpoint per step plus the settlement round.
            let tolerance = units((step_count as u128 + stakers.len() as u128 + 2) * 2);
            prop_assert!(funded.abs_diff(accounted) <= tolerance);

            // Nothing left hanging.
            prop_assert_eq!(
                distribution.recoverable_unassigned_reward(reward).await.unwrap(),
                TokenAmount::ZERO
            );

            Ok(())
        })?;
    }
}

// Property: the global staked total always equals the sum over positions
// whatever the interleaving.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_staked_total_matches_positions(
        steps in prop::collection::vec(arb_step(), 1..40)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let assets = Arc::new(MemoryAssets::new());
            let clock = Arc::new(StepClock::starting_at(0));
            let factory = DistributionFactory::new(assets.clone(), clock.clone());

            let stakers: Vec<AccountAddress> = (1..=4).map(addr).collect();
            let distribution = build_campaign(&assets, &clock, &factory, &stakers).await;

            for (staker_index, advance, op) in steps {
                clock.advance(advance);
                let staker = stakers[staker_index];

                match op {
                    Op::Stake(amount) => {
                        distribution.stake(staker, &[units(amount)]).await.unwrap();
                    }
                    Op::Withdraw(amount) => {
                        let staked = distribution.staked_tokens_of(staker).await[0];
                        let amount = units(amount.min(staked.to_base_units()));
                        distribution.withdraw(staker, &[amount]).await.unwrap();
                    }
                    Op::ClaimAll => {
                        distribution.claim_all(staker, staker).await.unwrap();
                    }
                    Op::Recover => {
                        distribution.recover_unassigned_rewards().await.unwrap();
                    }
                }

                let mut sum = TokenAmount::ZERO;
                for staker in &stakers {
                    sum = sum.saturating_add(distribution.staked_tokens_of(*staker).await[0]);
                }
                prop_assert_eq!(sum, distribution.total_staked_tokens_amount().await);
            }

            Ok(())
        })?;
    }
}

// Property: a lone staker covering the whole window always drains the pot
// exactly, regardless of how often consolidation was triggered in between.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_repeated_consolidation_never_leaks_reward(
        checkpoints in prop::collection::vec(1i64..1_000, 0..20)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let assets = Arc::new(MemoryAssets::new());
            let clock = Arc::new(StepClock::starting_at(0));
            let factory = DistributionFactory::new(assets.clone(), clock.clone());

            let stakers = vec![addr(1)];
            let distribution = build_campaign(&assets, &clock, &factory, &stakers).await;
            let staker = stakers[0];

            distribution.stake(staker, &[units(777)]).await.unwrap();

            // Zero-amount stakes force checkpoints at arbitrary instants.
            let mut instants = checkpoints;
            instants.sort_unstable();
            for instant in instants {
                clock.set(STARTING_TIME + instant);
                distribution.stake(staker, &[TokenAmount::ZERO]).await.unwrap();
            }

            clock.set(ENDING_TIME);
            let claimed = distribution.claim_all(staker, staker).await.unwrap();

            // Up to one base unit may be truncated per checkpoint.
            let funded = units(FUNDED);
            prop_assert!(claimed[0] <= funded);
            prop_assert!(funded.abs_diff(claimed[0]) <= units(21));

            Ok(())
        })?;
    }
}
