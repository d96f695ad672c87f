//! The vault state machine.
//!
//! [`SaladBowl`] owns the global accumulator, the emission schedule,
//! and the stake ledger, and is injected with the two token ledgers it
//! settles against. Every state-changing call runs the same prologue:
//! fold schedule emission into the accumulator, then checkpoint the
//! calling participant, and only then apply the requested mutation.
//!
//! Calls are the transaction boundary: a failure anywhere, including
//! inside an injected token ledger, restores the vault to the exact
//! state it held on entry.

use serde::{Deserialize, Serialize};

use salad_token::TokenLedger;
use salad_types::{AccountId, Amount, BlockNumber, VaultEvent};

use crate::fixed_point::{GlobalAccumulator, ScaledAmount};
use crate::ledger::{ParticipantPosition, StakeLedger};
use crate::schedule::{RewardSchedule, ScheduleParams};
use crate::{BowlError, Result};

/// Durable vault state: the schedule, the accumulator, and every
/// participant position. Token balances live with the injected ledgers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    /// The active emission window.
    pub schedule: RewardSchedule,
    /// Global reward-per-share state.
    pub global: GlobalAccumulator,
    /// All participant positions.
    pub stakes: StakeLedger,
}

/// The mutable unit one operation may touch; captured on entry and
/// written back wholesale if the operation fails.
struct OpSnapshot {
    schedule: RewardSchedule,
    global: GlobalAccumulator,
    participant: Option<(AccountId, Option<ParticipantPosition>)>,
}

/// The staking vault engine.
pub struct SaladBowl<D: TokenLedger, R: TokenLedger> {
    /// The vault's own account; deposited tokens are custodied here.
    address: AccountId,
    /// Holder of the schedule-update capability.
    controller: AccountId,
    schedule: RewardSchedule,
    global: GlobalAccumulator,
    stakes: StakeLedger,
    deposit_token: D,
    reward_token: R,
    events: Vec<VaultEvent>,
}

impl<D: TokenLedger, R: TokenLedger> SaladBowl<D, R> {
    /// Deploy the vault.
    ///
    /// # Errors
    ///
    /// - [`BowlError::InvalidWindow`] if the initial window is inverted
    pub fn new(
        address: AccountId,
        controller: AccountId,
        deposit_token: D,
        reward_token: R,
        params: ScheduleParams,
    ) -> Result<Self> {
        let schedule = RewardSchedule::new(params)?;
        tracing::info!(
            vault = %address,
            controller = %controller,
            rate = params.rate_per_block,
            start = params.start_block,
            end = params.end_block,
            "bowl: deployed"
        );
        Ok(Self {
            address,
            controller,
            schedule,
            global: GlobalAccumulator::new(),
            stakes: StakeLedger::new(),
            deposit_token,
            reward_token,
            events: Vec::new(),
        })
    }

    /// Stake `amount` deposit tokens for `participant`.
    ///
    /// The participant must have granted the vault a sufficient
    /// allowance beforehand.
    ///
    /// # Errors
    ///
    /// - [`BowlError::ZeroAmount`] on a zero deposit
    /// - [`BowlError::TransferFailed`] if the deposit token rejects the pull
    /// - [`BowlError::Overflow`] on arithmetic wrap
    pub fn deposit(
        &mut self,
        participant: &AccountId,
        amount: Amount,
        current_block: BlockNumber,
    ) -> Result<()> {
        if amount == 0 {
            return Err(BowlError::ZeroAmount);
        }
        let snapshot = self.snapshot(Some(participant));
        match self.try_deposit(participant, amount, current_block) {
            Ok(()) => {
                tracing::info!(account = %participant, amount, block = current_block, "bowl: deposit");
                self.events.push(VaultEvent::Deposited {
                    account: *participant,
                    amount,
                    block: current_block,
                });
                Ok(())
            }
            Err(e) => {
                self.restore(snapshot);
                Err(e)
            }
        }
    }

    fn try_deposit(
        &mut self,
        participant: &AccountId,
        amount: Amount,
        current_block: BlockNumber,
    ) -> Result<()> {
        let delta = i128::try_from(amount).map_err(|_| BowlError::Overflow)?;
        self.accrue_global(current_block)?;
        self.stakes
            .checkpoint(participant, self.global.acc_reward_per_share)?;
        let vault = self.address;
        self.deposit_token
            .transfer_from(&vault, participant, &vault, amount)
            .map_err(BowlError::TransferFailed)?;
        self.stakes
            .adjust_stake(participant, delta, &mut self.global.total_staked)
    }

    /// Return `amount` staked tokens to `participant`.
    ///
    /// Reward settled so far stays pending; withdrawal never harvests.
    ///
    /// # Errors
    ///
    /// - [`BowlError::InsufficientStake`] if `amount` exceeds the stake
    /// - [`BowlError::TransferFailed`] if the deposit token rejects the push
    /// - [`BowlError::Overflow`] on arithmetic wrap
    pub fn withdraw(
        &mut self,
        participant: &AccountId,
        amount: Amount,
        current_block: BlockNumber,
    ) -> Result<()> {
        let snapshot = self.snapshot(Some(participant));
        match self.try_withdraw(participant, amount, current_block) {
            Ok(()) => {
                tracing::info!(account = %participant, amount, block = current_block, "bowl: withdraw");
                self.events.push(VaultEvent::Withdrawn {
                    account: *participant,
                    amount,
                    block: current_block,
                });
                Ok(())
            }
            Err(e) => {
                self.restore(snapshot);
                Err(e)
            }
        }
    }

    fn try_withdraw(
        &mut self,
        participant: &AccountId,
        amount: Amount,
        current_block: BlockNumber,
    ) -> Result<()> {
        let delta = i128::try_from(amount).map_err(|_| BowlError::Overflow)?;
        self.accrue_global(current_block)?;
        self.stakes
            .checkpoint(participant, self.global.acc_reward_per_share)?;
        self.stakes
            .adjust_stake(participant, -delta, &mut self.global.total_staked)?;
        let vault = self.address;
        self.deposit_token
            .transfer(&vault, participant, amount)
            .map_err(BowlError::TransferFailed)
    }

    /// Mint `participant`'s settled reward to them.
    ///
    /// Returns the amount minted; zero pending reward is a no-op
    /// returning 0, not a failure.
    ///
    /// # Errors
    ///
    /// - [`BowlError::MintFailed`] if the reward token rejects the mint
    /// - [`BowlError::Overflow`] on arithmetic wrap
    pub fn harvest(
        &mut self,
        participant: &AccountId,
        current_block: BlockNumber,
    ) -> Result<Amount> {
        let snapshot = self.snapshot(Some(participant));
        match self.try_harvest(participant, current_block) {
            Ok(0) => {
                tracing::trace!(account = %participant, block = current_block, "bowl: nothing to harvest");
                Ok(0)
            }
            Ok(reward) => {
                tracing::info!(account = %participant, reward, block = current_block, "bowl: harvest");
                self.events.push(VaultEvent::Harvested {
                    account: *participant,
                    reward,
                    block: current_block,
                });
                Ok(reward)
            }
            Err(e) => {
                self.restore(snapshot);
                Err(e)
            }
        }
    }

    fn try_harvest(
        &mut self,
        participant: &AccountId,
        current_block: BlockNumber,
    ) -> Result<Amount> {
        self.accrue_global(current_block)?;
        self.stakes
            .checkpoint(participant, self.global.acc_reward_per_share)?;
        let reward = self.stakes.drain_pending(participant);
        if reward > 0 {
            let vault = self.address;
            self.reward_token
                .mint(&vault, participant, reward)
                .map_err(BowlError::MintFailed)?;
        }
        Ok(reward)
    }

    /// Replace the emission schedule.
    ///
    /// The old schedule is accrued in full first, so reward emitted up
    /// to the swap point is distributed before the window changes.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Unauthorized`] unless `caller` is the controller
    /// - [`BowlError::InvalidWindow`] if the new window is inverted
    /// - [`BowlError::Overflow`] on arithmetic wrap
    pub fn update_schedule(
        &mut self,
        caller: &AccountId,
        params: ScheduleParams,
        current_block: BlockNumber,
    ) -> Result<()> {
        if caller != &self.controller {
            return Err(BowlError::Unauthorized(*caller));
        }
        let mut replacement = RewardSchedule::new(params)?;
        // A window reaching back before the swap must not emit
        // retroactively.
        replacement.fast_forward(current_block);
        let snapshot = self.snapshot(None);
        match self.accrue_global(current_block) {
            Ok(()) => {
                self.schedule = replacement;
                tracing::info!(
                    rate = params.rate_per_block,
                    start = params.start_block,
                    end = params.end_block,
                    block = current_block,
                    "bowl: schedule replaced"
                );
                self.events.push(VaultEvent::ScheduleUpdated {
                    rate_per_block: params.rate_per_block,
                    start_block: params.start_block,
                    end_block: params.end_block,
                    block: current_block,
                });
                Ok(())
            }
            Err(e) => {
                self.restore(snapshot);
                Err(e)
            }
        }
    }

    /// Fold emission since the last update into the accumulator.
    fn accrue_global(&mut self, current_block: BlockNumber) -> Result<()> {
        let reward = self
            .schedule
            .accrue(current_block, self.global.total_staked)?;
        if reward > 0 {
            self.global.distribute(reward)?;
        }
        Ok(())
    }

    fn snapshot(&self, participant: Option<&AccountId>) -> OpSnapshot {
        OpSnapshot {
            schedule: self.schedule.clone(),
            global: self.global.clone(),
            participant: participant.map(|who| (*who, self.stakes.position(who).cloned())),
        }
    }

    fn restore(&mut self, snapshot: OpSnapshot) {
        self.schedule = snapshot.schedule;
        self.global = snapshot.global;
        if let Some((who, record)) = snapshot.participant {
            self.stakes.restore(&who, record);
        }
    }

    /// The participant's staked amount.
    pub fn balance_of(&self, participant: &AccountId) -> Amount {
        self.stakes.staked(participant)
    }

    /// Reward the participant could harvest at `current_block`, without
    /// mutating anything.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] on arithmetic wrap
    pub fn pending_reward(
        &self,
        participant: &AccountId,
        current_block: BlockNumber,
    ) -> Result<Amount> {
        let position = match self.stakes.position(participant) {
            Some(position) => position,
            None => return Ok(0),
        };
        let mut schedule = self.schedule.clone();
        let reward = schedule.accrue(current_block, self.global.total_staked)?;
        let mut acc = self.global.acc_reward_per_share;
        if reward > 0 {
            acc = acc.accumulate(ScaledAmount::per_share(reward, self.global.total_staked)?)?;
        }
        let owed = if position.staked_amount > 0 {
            acc.checked_sub(position.reward_debt)?
                .weighted(position.staked_amount)?
                .unscale()?
        } else {
            0
        };
        position
            .pending_harvestable
            .checked_add(owed)
            .ok_or(BowlError::Overflow)
    }

    /// Sum of all stakes.
    pub fn total_staked(&self) -> Amount {
        self.global.total_staked
    }

    /// The vault's own account.
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    /// Holder of the schedule-update capability.
    pub fn controller(&self) -> &AccountId {
        &self.controller
    }

    /// The active emission schedule.
    pub fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }

    /// The global accumulator.
    pub fn accumulator(&self) -> &GlobalAccumulator {
        &self.global
    }

    /// The stake ledger.
    pub fn stakes(&self) -> &StakeLedger {
        &self.stakes
    }

    /// The injected deposit-token ledger.
    pub fn deposit_token(&self) -> &D {
        &self.deposit_token
    }

    /// Mutable access to the deposit-token ledger, for host-side calls
    /// that go around the vault (mints, approvals).
    pub fn deposit_token_mut(&mut self) -> &mut D {
        &mut self.deposit_token
    }

    /// The injected reward-token ledger.
    pub fn reward_token(&self) -> &R {
        &self.reward_token
    }

    /// Mutable access to the reward-token ledger.
    pub fn reward_token_mut(&mut self) -> &mut R {
        &mut self.reward_token
    }

    /// Events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    /// Copy of the durable state (schedule, accumulator, positions).
    pub fn state(&self) -> VaultState {
        VaultState {
            schedule: self.schedule.clone(),
            global: self.global.clone(),
            stakes: self.stakes.clone(),
        }
    }
}
