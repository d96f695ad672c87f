//! Per-participant stake positions.
//!
//! Each position carries the participant's stake, the per-share value
//! at its last checkpoint (its reward debt), and reward already settled
//! but not yet harvested. The debt is a flag in the ground: settling a
//! participant multiplies the distance the global accumulator has moved
//! since their last checkpoint by their stake, then moves the flag
//! forward so the distance is never counted twice.
//!
//! Positions are zeroed rather than removed, so identity-to-record
//! mappings stay stable for the vault's lifetime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use salad_types::{AccountId, Amount};

use crate::fixed_point::ScaledAmount;
use crate::{BowlError, Result};

/// One participant's stake and settlement state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantPosition {
    /// Deposit tokens currently staked.
    pub staked_amount: Amount,
    /// Global per-share value at the last checkpoint.
    pub reward_debt: ScaledAmount,
    /// Reward settled but not yet harvested.
    pub pending_harvestable: Amount,
}

impl ParticipantPosition {
    /// True when the position holds neither stake nor pending reward.
    pub fn is_empty(&self) -> bool {
        self.staked_amount == 0 && self.pending_harvestable == 0
    }
}

/// The collection of participant positions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeLedger {
    positions: BTreeMap<AccountId, ParticipantPosition>,
}

impl StakeLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// The participant's position, creating a zeroed record on first use.
    pub fn get_or_create(&mut self, who: &AccountId) -> &mut ParticipantPosition {
        self.positions.entry(*who).or_default()
    }

    /// The participant's position, if one was ever created.
    pub fn position(&self, who: &AccountId) -> Option<&ParticipantPosition> {
        self.positions.get(who)
    }

    /// The participant's staked amount (zero if unknown).
    pub fn staked(&self, who: &AccountId) -> Amount {
        self.positions.get(who).map(|p| p.staked_amount).unwrap_or(0)
    }

    /// Iterate all positions in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &ParticipantPosition)> {
        self.positions.iter()
    }

    /// Number of records (zeroed ones included).
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no record was ever created.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Settle the participant up to `acc_per_share`.
    ///
    /// Folds `(acc_per_share - debt) * staked` into the pending reward,
    /// then advances the debt. MUST run before any stake mutation for
    /// this participant, or the distance-since-checkpoint is computed
    /// against the wrong stake.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] on arithmetic wrap or a debt running
    ///   ahead of the accumulator (both indicate corrupted bookkeeping)
    pub fn checkpoint(&mut self, who: &AccountId, acc_per_share: ScaledAmount) -> Result<()> {
        let position = self.get_or_create(who);
        if position.staked_amount > 0 {
            let owed = acc_per_share
                .checked_sub(position.reward_debt)?
                .weighted(position.staked_amount)?
                .unscale()?;
            position.pending_harvestable = position
                .pending_harvestable
                .checked_add(owed)
                .ok_or(BowlError::Overflow)?;
        }
        position.reward_debt = acc_per_share;
        Ok(())
    }

    /// Move the participant's stake and the global total in lockstep.
    ///
    /// # Errors
    ///
    /// - [`BowlError::InsufficientStake`] when removing more than staked
    /// - [`BowlError::Overflow`] on arithmetic wrap
    pub fn adjust_stake(
        &mut self,
        who: &AccountId,
        delta: i128,
        total_staked: &mut Amount,
    ) -> Result<()> {
        let position = self.get_or_create(who);
        if delta >= 0 {
            let added = delta.unsigned_abs();
            position.staked_amount = position
                .staked_amount
                .checked_add(added)
                .ok_or(BowlError::Overflow)?;
            *total_staked = total_staked.checked_add(added).ok_or(BowlError::Overflow)?;
        } else {
            let removed = delta.unsigned_abs();
            if removed > position.staked_amount {
                return Err(BowlError::InsufficientStake {
                    requested: removed,
                    available: position.staked_amount,
                });
            }
            position.staked_amount -= removed;
            *total_staked = total_staked.checked_sub(removed).ok_or(BowlError::Overflow)?;
        }
        Ok(())
    }

    /// Return and zero the participant's pending reward.
    pub fn drain_pending(&mut self, who: &AccountId) -> Amount {
        match self.positions.get_mut(who) {
            Some(position) => std::mem::take(&mut position.pending_harvestable),
            None => 0,
        }
    }

    /// Overwrite or remove a record wholesale. Used by the engine to
    /// restore a snapshot after a failed operation.
    pub(crate) fn restore(&mut self, who: &AccountId, record: Option<ParticipantPosition>) {
        match record {
            Some(position) => {
                self.positions.insert(*who, position);
            }
            None => {
                self.positions.remove(who);
            }
        }
    }
}
