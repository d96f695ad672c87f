//! The bounded emission window.
//!
//! A schedule emits `rate_per_block` reward units for every block in
//! `[start_block, end_block]`. A cursor (`last_accrual_block`) marks
//! how far emission has been folded into the global accumulator; it
//! only moves forward, and only when there is stake to receive the
//! emission. Blocks that pass while the vault is empty are deferred,
//! not dropped: the cursor stays put and the window pays out once
//! stake reappears.

use serde::{Deserialize, Serialize};

use salad_types::{Amount, BlockNumber};

use crate::{BowlError, Result};

/// Configuration for one emission window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleParams {
    /// Reward units emitted per block inside the window.
    pub rate_per_block: Amount,
    /// First block of the window.
    pub start_block: BlockNumber,
    /// Last block of the window.
    pub end_block: BlockNumber,
}

/// An emission window plus its accrual cursor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSchedule {
    rate_per_block: Amount,
    start_block: BlockNumber,
    end_block: BlockNumber,
    /// Monotone, always within `[start_block, end_block]`.
    last_accrual_block: BlockNumber,
}

impl RewardSchedule {
    /// Validate `params` and open the window with the cursor at its start.
    ///
    /// # Errors
    ///
    /// - [`BowlError::InvalidWindow`] if `start_block > end_block`
    pub fn new(params: ScheduleParams) -> Result<Self> {
        if params.start_block > params.end_block {
            return Err(BowlError::InvalidWindow {
                start: params.start_block,
                end: params.end_block,
            });
        }
        Ok(Self {
            rate_per_block: params.rate_per_block,
            start_block: params.start_block,
            end_block: params.end_block,
            last_accrual_block: params.start_block,
        })
    }

    fn clamp(&self, block: BlockNumber) -> BlockNumber {
        block.clamp(self.start_block, self.end_block)
    }

    /// Reward emitted since the last accrual, bounded by the window.
    ///
    /// Advances the cursor to `clamp(current_block)` only when the
    /// reward is actually distributable (`total_staked > 0`); with no
    /// stake outstanding the elapsed window stays pending.
    ///
    /// # Errors
    ///
    /// - [`BowlError::Overflow`] if `elapsed * rate_per_block` wraps
    pub fn accrue(&mut self, current_block: BlockNumber, total_staked: Amount) -> Result<Amount> {
        let target = self.clamp(current_block);
        let elapsed = target.saturating_sub(self.last_accrual_block);
        if elapsed == 0 {
            return Ok(0);
        }
        if total_staked == 0 {
            tracing::trace!(elapsed, "schedule: no stake, emission deferred");
            return Ok(0);
        }
        let reward = Amount::from(elapsed)
            .checked_mul(self.rate_per_block)
            .ok_or(BowlError::Overflow)?;
        self.last_accrual_block = target;
        tracing::trace!(elapsed, reward, cursor = target, "schedule: accrued");
        Ok(reward)
    }

    /// Move the cursor forward to `block` (clamped into the window).
    ///
    /// Used when a schedule is activated mid-window: blocks before
    /// activation are never emitted, even if the configured window
    /// reaches back before it. The cursor never moves backward.
    pub fn fast_forward(&mut self, block: BlockNumber) {
        let target = self.clamp(block);
        if target > self.last_accrual_block {
            self.last_accrual_block = target;
        }
    }

    /// The window configuration.
    pub fn params(&self) -> ScheduleParams {
        ScheduleParams {
            rate_per_block: self.rate_per_block,
            start_block: self.start_block,
            end_block: self.end_block,
        }
    }

    /// Emission rate per block.
    pub fn rate_per_block(&self) -> Amount {
        self.rate_per_block
    }

    /// First block of the window.
    pub fn start_block(&self) -> BlockNumber {
        self.start_block
    }

    /// Last block of the window.
    pub fn end_block(&self) -> BlockNumber {
        self.end_block
    }

    /// How far emission has been folded into the accumulator.
    pub fn last_accrual_block(&self) -> BlockNumber {
        self.last_accrual_block
    }

    /// Blocks of the window not yet accrued.
    pub fn unaccrued_blocks(&self) -> BlockNumber {
        self.end_block - self.last_accrual_block
    }

    /// Whether every block of the window has been accrued.
    pub fn is_exhausted(&self) -> bool {
        self.last_accrual_block == self.end_block
    }
}
