//! The deposit token.
//!
//! Participants acquire SALAD from the owner (the deploy account mints
//! directly to wallets), grant the vault an allowance, and stake through
//! the vault's `deposit`. Minting is owner-gated; transfers are open.

use serde::{Deserialize, Serialize};

use salad_types::{AccountId, Amount, TOKEN_DECIMALS};

use crate::ledger::{BalanceBook, TokenLedger};
use crate::{Result, TokenError};

/// The fungible deposit token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaladToken {
    /// The account allowed to mint.
    owner: AccountId,
    book: BalanceBook,
}

impl SaladToken {
    /// Deploy the token with `owner` as mint authority.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            book: BalanceBook::new(),
        }
    }

    /// The mint authority.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> Amount {
        self.book.total_supply()
    }

    /// Grant `spender` an allowance of `amount` over `owner`'s balance.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        self.book.approve(owner, spender, amount);
    }

    /// Remaining allowance granted by `owner` to `spender`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.book.allowance(owner, spender)
    }
}

impl TokenLedger for SaladToken {
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        self.book.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        self.book.spend_allowance(from, spender, amount)?;
        if let Err(e) = self.book.move_balance(from, to, amount) {
            // The allowance must not be consumed by a failed move.
            let restored = self.book.allowance(from, spender).saturating_add(amount);
            self.book.approve(from, spender, restored);
            return Err(e);
        }
        Ok(())
    }

    fn mint(&mut self, caller: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        if caller != &self.owner {
            return Err(TokenError::Unauthorized(*caller));
        }
        self.book.mint_to(to, amount)?;
        tracing::info!(to = %to, amount, "salad token: minted");
        Ok(())
    }

    fn balance_of(&self, who: &AccountId) -> Amount {
        self.book.balance_of(who)
    }

    fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }
}
