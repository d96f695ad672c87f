//! # salad-token
//!
//! Fungible token ledgers for the salad staking system.
//!
//! The vault core is polymorphic over a minimal capability interface,
//! [`TokenLedger`]; this crate provides that trait plus the two concrete
//! tokens the system deploys:
//!
//! - [`SaladToken`] — the deposit token (owner-gated mint, approvals)
//! - [`SaladReward`] — the reward token (mint gated to the configured bowl)
//!
//! ## Modules
//!
//! - [`ledger`] — the [`TokenLedger`] trait and the shared [`BalanceBook`]
//! - [`salad`] — the deposit token
//! - [`reward`] — the reward token

pub mod ledger;
pub mod reward;
pub mod salad;

pub use ledger::{BalanceBook, TokenLedger};
pub use reward::SaladReward;
pub use salad::SaladToken;

use salad_types::{AccountId, Amount};

/// Error types for token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// An account holds less than the amount being moved.
    #[error("insufficient balance: account {account} holds {available}, needs {requested}")]
    InsufficientBalance {
        /// The account being debited.
        account: AccountId,
        /// The amount requested.
        requested: Amount,
        /// The amount actually held.
        available: Amount,
    },

    /// A spender's allowance does not cover the amount being moved.
    #[error("insufficient allowance: spender {spender} allowed {available}, needs {requested}")]
    InsufficientAllowance {
        /// The spending account.
        spender: AccountId,
        /// The amount requested.
        requested: Amount,
        /// The allowance remaining.
        available: Amount,
    },

    /// The caller does not hold the required authority.
    #[error("caller {0} is not authorized")]
    Unauthorized(AccountId),

    /// Arithmetic overflow in balance or supply bookkeeping.
    #[error("arithmetic overflow")]
    Overflow,
}

/// Convenience result type for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
