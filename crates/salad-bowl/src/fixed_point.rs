//! Fixed-point reward-per-share arithmetic.
//!
//! Reward-per-share values are tiny fractions (one block's emission
//! divided by the total stake), so they are kept multiplied by
//! [`SCALE`] in a 256-bit integer. Products of a scaled value with a
//! `u128` stake fit comfortably: `u128 * 10^18 < 2^256`.
//!
//! Truncation always rounds toward zero: settlements floor, so the
//! vault never over-pays. The dust an accrual batch leaves behind is
//! bounded by `total_staked / SCALE` smallest units.

use serde::{Deserialize, Serialize};

use salad_types::Amount;

use crate::{BowlError, Result};

mod u256 {
    uint::construct_uint! {
        /// 256-bit unsigned integer backing scaled reward values.
        pub struct U256(4);
    }
}
pub use u256::U256;

/// Fixed-point scale factor (18 decimal places).
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// A reward value multiplied by [`SCALE`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScaledAmount(U256);

impl ScaledAmount {
    /// The zero value.
    pub fn zero() -> Self {
        ScaledAmount(U256::zero())
    }

    /// Lift a raw token amount into scaled space.
    ///
    /// Cannot overflow: the largest `u128` times [`SCALE`] stays below
    /// `2^256`.
    pub fn scale(raw: Amount) -> Self {
        ScaledAmount(U256::from(raw) * U256::from(SCALE))
    }

    /// Drop back to a raw token amount, truncating toward zero.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] if the quotient exceeds `u128`
    pub fn unscale(self) -> Result<Amount> {
        let quotient = self.0 / U256::from(SCALE);
        if quotient > U256::from(Amount::MAX) {
            return Err(BowlError::Overflow);
        }
        Ok(quotient.low_u128())
    }

    /// Add `delta` onto this value.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] on wrap (unreachable for realistic
    ///   supplies, checked regardless)
    pub fn accumulate(self, delta: ScaledAmount) -> Result<ScaledAmount> {
        self.0
            .checked_add(delta.0)
            .map(ScaledAmount)
            .ok_or(BowlError::Overflow)
    }

    /// Subtract `other` from this value.
    ///
    /// The accumulator never runs behind a recorded debt, so underflow
    /// here means corrupted bookkeeping.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] on underflow
    pub fn checked_sub(self, other: ScaledAmount) -> Result<ScaledAmount> {
        self.0
            .checked_sub(other.0)
            .map(ScaledAmount)
            .ok_or(BowlError::Overflow)
    }

    /// Scaled per-share value of a reward batch: `scale(reward) / total_staked`.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] if `total_staked` is zero (the caller
    ///   must never distribute against an empty vault)
    pub fn per_share(reward: Amount, total_staked: Amount) -> Result<ScaledAmount> {
        if total_staked == 0 {
            return Err(BowlError::Overflow);
        }
        Ok(ScaledAmount(
            ScaledAmount::scale(reward).0 / U256::from(total_staked),
        ))
    }

    /// Weight a per-share delta by a participant's stake.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] on wrap
    pub fn weighted(self, stake: Amount) -> Result<ScaledAmount> {
        self.0
            .checked_mul(U256::from(stake))
            .map(ScaledAmount)
            .ok_or(BowlError::Overflow)
    }
}

impl Serialize for ScaledAmount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ScaledAmount {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        U256::from_dec_str(&text)
            .map(ScaledAmount)
            .map_err(serde::de::Error::custom)
    }
}

/// Global reward-per-share state for the whole vault.
///
/// `acc_reward_per_share` is non-decreasing over the vault's lifetime.
/// While `total_staked` is zero nothing is distributed; undistributed
/// emission stays in the schedule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAccumulator {
    /// Cumulative reward per staked unit, scaled by [`SCALE`].
    pub acc_reward_per_share: ScaledAmount,
    /// Sum of all participant stakes.
    pub total_staked: Amount,
}

impl GlobalAccumulator {
    /// Fresh accumulator with no stake and no accrued reward.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a reward batch into the per-share value.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] if `total_staked` is zero or the
    ///   accumulator wraps
    pub fn distribute(&mut self, reward: Amount) -> Result<()> {
        let delta = ScaledAmount::per_share(reward, self.total_staked)?;
        self.acc_reward_per_share = self.acc_reward_per_share.accumulate(delta)?;
        tracing::trace!(reward, total_staked = self.total_staked, "accumulator: distributed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scale_unscale_roundtrip() {
        let raw = 123_456_789u128;
        let scaled = ScaledAmount::scale(raw);
        assert_eq!(scaled.unscale().expect("unscale"), raw);
    }

    #[test]
    fn test_unscale_truncates_toward_zero() {
        // One third of a unit below scale: floors to zero.
        let third = ScaledAmount::per_share(1, 3).expect("per share");
        assert_eq!(third.unscale().expect("unscale"), 0);
    }

    #[test]
    fn test_per_share_times_stake_recovers_reward() {
        let reward = 1_000_000_000u128;
        let total = 300_000_000_000_000_000_000u128; // 300e18
        let delta = ScaledAmount::per_share(reward, total).expect("per share");
        let recovered = delta.weighted(total).expect("weighted").unscale().expect("unscale");
        // Floor division dust is bounded by total / SCALE per batch.
        assert!(recovered <= reward);
        assert!(reward - recovered <= total / SCALE + 1);
    }

    #[test]
    fn test_per_share_zero_stake_rejected() {
        assert!(ScaledAmount::per_share(1, 0).is_err());
    }

    #[test]
    fn test_accumulate_overflow_checked() {
        let max = ScaledAmount(U256::MAX);
        assert!(max.accumulate(ScaledAmount::scale(1)).is_err());
    }

    #[test]
    fn test_checked_sub_underflow_rejected() {
        let small = ScaledAmount::scale(1);
        let large = ScaledAmount::scale(2);
        assert!(small.checked_sub(large).is_err());
        assert_eq!(
            large.checked_sub(small).expect("sub"),
            ScaledAmount::scale(1)
        );
    }

    #[test]
    fn test_scale_max_amount() {
        // The documented no-overflow bound.
        let scaled = ScaledAmount::scale(Amount::MAX);
        assert_eq!(scaled.unscale().expect("unscale"), Amount::MAX);
    }

    #[test]
    fn test_distribute_updates_per_share() {
        let mut global = GlobalAccumulator::new();
        global.total_staked = 100;
        global.distribute(50).expect("distribute");
        let owed = global
            .acc_reward_per_share
            .weighted(100)
            .expect("weighted")
            .unscale()
            .expect("unscale");
        assert_eq!(owed, 50);
    }

    #[test]
    fn test_distribute_empty_vault_rejected() {
        let mut global = GlobalAccumulator::new();
        assert!(global.distribute(1).is_err());
    }

    #[test]
    fn test_scaled_serde_roundtrip() {
        let value = ScaledAmount::per_share(7, 3).expect("per share");
        let json = serde_json::to_string(&value).expect("serialize");
        let restored: ScaledAmount = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, value);
    }

    proptest! {
        #[test]
        fn prop_scale_unscale_roundtrip(raw in any::<u128>()) {
            let scaled = ScaledAmount::scale(raw);
            prop_assert_eq!(scaled.unscale().expect("unscale"), raw);
        }

        #[test]
        fn prop_settlement_never_overpays(
            reward in 0u128..=u64::MAX as u128,
            total in 1u128..=u128::MAX / SCALE,
        ) {
            let delta = ScaledAmount::per_share(reward, total).expect("per share");
            let recovered = delta
                .weighted(total)
                .expect("weighted")
                .unscale()
                .expect("unscale");
            // Distributing to the whole stake returns at most the batch;
            // the dust lost to flooring is bounded by total / SCALE.
            prop_assert!(recovered <= reward);
            prop_assert!(reward - recovered <= total / SCALE + 1);
        }

        #[test]
        fn prop_accumulate_is_additive(a in any::<u64>(), b in any::<u64>()) {
            let sum = ScaledAmount::scale(a as u128)
                .accumulate(ScaledAmount::scale(b as u128))
                .expect("accumulate");
            prop_assert_eq!(sum, ScaledAmount::scale(a as u128 + b as u128));
        }
    }
}
