//! # salad-types
//!
//! Shared domain types used across the salad workspace.
//!
//! ## Modules
//!
//! - [`account`] — participant identity
//! - [`events`] — observable vault events

pub mod account;
pub mod events;

pub use account::AccountId;
pub use events::VaultEvent;

/// Token amount in smallest units.
pub type Amount = u128;

/// Host-ledger block height.
pub type BlockNumber = u64;

/// Smallest units per whole token (18 decimals).
pub const UNITS_PER_TOKEN: Amount = 1_000_000_000_000_000_000;

/// Decimal places used by both the deposit and reward tokens.
pub const TOKEN_DECIMALS: u8 = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_per_token_matches_decimals() {
        assert_eq!(UNITS_PER_TOKEN, 10u128.pow(u32::from(TOKEN_DECIMALS)));
    }
}
