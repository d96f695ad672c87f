//! # salad-bowl
//!
//! The staking vault: participants deposit SALAD, accrue reward-token
//! entitlements over a bounded block window, and harvest at will.
//!
//! Accounting uses the reward-per-share accumulator pattern: every
//! state-changing call first folds the reward emitted since the last
//! update into a global fixed-point per-share value, then settles the
//! calling participant against it. Per-participant cost is O(1)
//! regardless of how many positions exist.
//!
//! ## Modules
//!
//! - [`fixed_point`] — scaled arithmetic and the global accumulator
//! - [`schedule`] — the bounded emission window
//! - [`ledger`] — per-participant positions
//! - [`engine`] — the vault state machine
//!
//! ## Formula
//!
//! ```text
//! acc_reward_per_share += emitted_reward * SCALE / total_staked
//! pending(p)           += (acc_reward_per_share - debt(p)) * staked(p) / SCALE
//! ```

pub mod engine;
pub mod fixed_point;
pub mod ledger;
pub mod schedule;

pub use engine::SaladBowl;
pub use fixed_point::{GlobalAccumulator, ScaledAmount, SCALE};
pub use ledger::{ParticipantPosition, StakeLedger};
pub use schedule::{RewardSchedule, ScheduleParams};

use salad_token::TokenError;
use salad_types::{AccountId, Amount, BlockNumber};

/// Error types for vault operations.
///
/// Every failure aborts the enclosing operation atomically; the caller
/// observes state identical to before the call.
#[derive(Debug, thiserror::Error)]
pub enum BowlError {
    /// A schedule window whose start lies past its end.
    #[error("invalid schedule window: start {start} > end {end}")]
    InvalidWindow {
        /// First block of the window.
        start: BlockNumber,
        /// Last block of the window.
        end: BlockNumber,
    },

    /// A withdrawal larger than the participant's stake.
    #[error("insufficient stake: requested {requested}, staked {available}")]
    InsufficientStake {
        /// The amount requested.
        requested: Amount,
        /// The amount actually staked.
        available: Amount,
    },

    /// A deposit of zero tokens.
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// The caller does not hold the schedule-update capability.
    #[error("caller {0} is not the schedule controller")]
    Unauthorized(AccountId),

    /// The deposit-token ledger rejected a transfer.
    #[error("deposit token transfer failed")]
    TransferFailed(#[source] TokenError),

    /// The reward-token ledger rejected a mint.
    #[error("reward token mint failed")]
    MintFailed(#[source] TokenError),

    /// Arithmetic overflow. Always fatal; indicates a bug, never
    /// expected in normal operation.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Convenience result type for vault operations.
pub type Result<T> = std::result::Result<T, BowlError>;
