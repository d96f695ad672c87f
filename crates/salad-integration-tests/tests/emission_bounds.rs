//! Integration test: emission is bounded by the window.
//!
//! Nothing is emitted before the window opens; after one full
//! distribution past its end nothing more is ever minted; the total
//! minted reward never exceeds `(end - start) * rate`; and blocks that
//! pass with an empty vault are deferred, not dropped.

use salad_bowl::{SaladBowl, ScheduleParams, SCALE};
use salad_token::{SaladReward, SaladToken, TokenLedger};
use salad_types::{AccountId, Amount, UNITS_PER_TOKEN};

fn params(rate: Amount, start: u64, end: u64) -> ScheduleParams {
    ScheduleParams {
        rate_per_block: rate,
        start_block: start,
        end_block: end,
    }
}

fn deploy_with_wallet(
    initial: ScheduleParams,
    wallet: &AccountId,
    funding: Amount,
) -> SaladBowl<SaladToken, SaladReward> {
    let owner = AccountId::from_index(0x01);
    let vault = AccountId::from_index(0xB0);
    let mut token = SaladToken::new(owner);
    let mut reward = SaladReward::new(owner);
    reward.set_salad_bowl(&owner, vault).expect("set bowl");
    token.mint(&owner, wallet, funding).expect("mint");
    token.approve(wallet, &vault, Amount::MAX);
    SaladBowl::new(vault, owner, token, reward, initial).expect("deploy bowl")
}

#[test]
fn no_reward_before_the_window_opens() {
    let wallet = AccountId::from_index(0x11);
    let mut bowl = deploy_with_wallet(params(1_000, 100, 200), &wallet, 1_000);

    bowl.deposit(&wallet, 1_000, 0).expect("deposit");
    for block in [10, 50, 99, 100] {
        assert_eq!(bowl.harvest(&wallet, block).expect("harvest"), 0);
        assert_eq!(bowl.reward_token().total_supply(), 0);
    }
    // First block inside the window pays.
    assert_eq!(bowl.harvest(&wallet, 101).expect("harvest"), 1_000);
}

#[test]
fn emission_stops_after_the_window_closes() {
    let wallet = AccountId::from_index(0x11);
    let mut bowl = deploy_with_wallet(params(1_000, 100, 200), &wallet, 1_000);

    bowl.deposit(&wallet, 1_000, 0).expect("deposit");
    // One harvest far past the end drains the full window.
    assert_eq!(bowl.harvest(&wallet, 10_000).expect("harvest"), 100_000);
    // Forever after: nothing.
    for block in [10_001, 50_000, u64::MAX] {
        assert_eq!(bowl.harvest(&wallet, block).expect("harvest"), 0);
    }
    assert_eq!(bowl.reward_token().total_supply(), 100_000);
}

#[test]
fn total_minted_never_exceeds_the_window_cap() {
    let wallet = AccountId::from_index(0x11);
    let stake = 7 * UNITS_PER_TOKEN;
    let rate = 1_000_000_000u128;
    let mut bowl = deploy_with_wallet(params(rate, 10, 5010), &wallet, stake);

    bowl.deposit(&wallet, stake, 10).expect("deposit");

    // Harvest at irregular intervals across and past the window.
    let mut minted = 0u128;
    let mut accruals = 0u128;
    for block in [11, 500, 501, 2000, 4999, 5010, 6000, 100_000] {
        let reward = bowl.harvest(&wallet, block).expect("harvest");
        if reward > 0 {
            accruals += 1;
        }
        minted += reward;
    }

    let cap = 5000 * rate;
    assert!(minted <= cap);
    // Dust per accrual batch is bounded by stake / SCALE.
    assert!(cap - minted <= accruals * (stake / SCALE + 1));
    assert_eq!(bowl.reward_token().total_supply(), minted);
}

#[test]
fn empty_vault_blocks_are_deferred_not_dropped() {
    let wallet = AccountId::from_index(0x11);
    let mut bowl = deploy_with_wallet(params(100, 0, 1_000), &wallet, 500);

    // Staked for the first 200 blocks, then fully out until 700.
    bowl.deposit(&wallet, 500, 0).expect("deposit");
    bowl.withdraw(&wallet, 500, 200).expect("withdraw");
    assert_eq!(bowl.total_staked(), 0);

    // Re-enter at 700: the 500 empty blocks are still pending.
    bowl.deposit(&wallet, 500, 700).expect("deposit");
    let reward = bowl.harvest(&wallet, 1_000).expect("harvest");

    // 200 staked blocks + the deferred 500 + the final 300: the whole window.
    assert_eq!(reward + bowl.pending_reward(&wallet, 1_000).expect("pending"), 100_000);
    assert_eq!(reward, 100_000);
}

#[test]
fn deferred_emission_goes_to_the_stake_present_at_accrual() {
    let early = AccountId::from_index(0x11);
    let late = AccountId::from_index(0x22);
    let owner = AccountId::from_index(0x01);
    let vault = AccountId::from_index(0xB0);
    let mut token = SaladToken::new(owner);
    let mut reward = SaladReward::new(owner);
    reward.set_salad_bowl(&owner, vault).expect("set bowl");
    for wallet in [&early, &late] {
        token.mint(&owner, wallet, 100).expect("mint");
        token.approve(wallet, &vault, 100);
    }
    let mut bowl =
        SaladBowl::new(vault, owner, token, reward, params(10, 0, 1_000)).expect("deploy bowl");

    // Early staker leaves at 100; the vault sits empty until 900.
    bowl.deposit(&early, 100, 0).expect("deposit");
    bowl.withdraw(&early, 100, 100).expect("withdraw");

    // The late staker alone receives the deferred 800 blocks.
    bowl.deposit(&late, 100, 900).expect("deposit");
    assert_eq!(bowl.harvest(&late, 1_000).expect("harvest"), 9_000);
    assert_eq!(bowl.harvest(&early, 1_000).expect("harvest"), 1_000);
}
