//! The token capability interface and the shared balance book.
//!
//! The vault engine never sees a concrete token type; it is injected
//! with implementations of [`TokenLedger`] and calls only this surface.
//! Both shipped tokens delegate their balance bookkeeping to
//! [`BalanceBook`], which keeps balances, allowances, and total supply
//! under checked arithmetic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use salad_types::{AccountId, Amount};

use crate::{Result, TokenError};

/// Minimal fungible-token capability consumed by the vault engine.
///
/// `transfer` moves tokens the caller already controls; `transfer_from`
/// spends a previously granted allowance; `mint` creates new supply
/// subject to the implementation's authority rules.
pub trait TokenLedger {
    /// Move `amount` from `from` to `to`.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`,
    /// consuming `spender`'s allowance granted by `from`.
    fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<()>;

    /// Create `amount` new tokens for `to`. Authority rules are
    /// implementation-specific.
    fn mint(&mut self, caller: &AccountId, to: &AccountId, amount: Amount) -> Result<()>;

    /// Current balance of `who`.
    fn balance_of(&self, who: &AccountId) -> Amount;

    /// Decimal places of the token.
    fn decimals(&self) -> u8;
}

/// In-memory balance/allowance/supply bookkeeping shared by the tokens.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BalanceBook {
    balances: BTreeMap<AccountId, Amount>,
    /// owner -> spender -> remaining allowance
    allowances: BTreeMap<AccountId, BTreeMap<AccountId, Amount>>,
    total_supply: Amount,
}

impl BalanceBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of `who` (zero if unknown).
    pub fn balance_of(&self, who: &AccountId) -> Amount {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Remaining allowance granted by `owner` to `spender`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|granted| granted.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Create `amount` new tokens for `to`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Overflow`] if supply or the recipient balance would wrap
    pub fn mint_to(&mut self, to: &AccountId, amount: Amount) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.balances.insert(*to, balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientBalance`] if `from` holds less than `amount`
    /// - [`TokenError::Overflow`] if the recipient balance would wrap
    pub fn move_balance(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                account: *from,
                requested: amount,
                available,
            })?;
        // Self-transfer is a funds-available check and nothing else.
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.balances.insert(*from, debited);
        self.balances.insert(*to, credited);
        Ok(())
    }

    /// Set the allowance granted by `owner` to `spender`.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    /// Consume `amount` of the allowance granted by `owner` to `spender`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientAllowance`] if the allowance does not cover `amount`
    pub fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<()> {
        let available = self.allowance(owner, spender);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                spender: *spender,
                requested: amount,
                available,
            })?;
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, remaining);
        Ok(())
    }
}
