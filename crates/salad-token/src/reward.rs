//! The reward token.
//!
//! Reward supply is created only when the vault pays out a harvest, so
//! minting is gated to a single configured bowl account. The owner
//! points the gate at the deployed bowl once, after deployment; until
//! then every mint fails.

use serde::{Deserialize, Serialize};

use salad_types::{AccountId, Amount, TOKEN_DECIMALS};

use crate::ledger::{BalanceBook, TokenLedger};
use crate::{Result, TokenError};

/// The reward token minted on harvest.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaladReward {
    /// The account allowed to re-point the mint gate.
    owner: AccountId,
    /// The bowl account allowed to mint, once configured.
    salad_bowl: Option<AccountId>,
    book: BalanceBook,
}

impl SaladReward {
    /// Deploy the token with `owner` as gate authority and no bowl set.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            salad_bowl: None,
            book: BalanceBook::new(),
        }
    }

    /// The gate authority.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// The configured bowl account, if any.
    pub fn salad_bowl(&self) -> Option<&AccountId> {
        self.salad_bowl.as_ref()
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> Amount {
        self.book.total_supply()
    }

    /// Point the mint gate at `bowl`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Unauthorized`] if `caller` is not the owner
    pub fn set_salad_bowl(&mut self, caller: &AccountId, bowl: AccountId) -> Result<()> {
        if caller != &self.owner {
            return Err(TokenError::Unauthorized(*caller));
        }
        tracing::warn!(bowl = %bowl, "reward token: mint gate re-pointed");
        self.salad_bowl = Some(bowl);
        Ok(())
    }
}

impl TokenLedger for SaladReward {
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
            let restored = self.book.allowance(from, spender).saturating_add(amount);
            self.book.approve(from, spender, restored);
            return Err(e);
        }
        Ok(())
    }

    fn mint(&mut self, caller: &AccountId, to: &AccountId, amount: Amount) -> Result<()> {
        match self.salad_bowl {
            Some(bowl) if caller == &bowl => {
                self.book.mint_to(to, amount)?;
                tracing::info!(to = %to, amount, "reward token: minted");
                Ok(())
            }
            _ => Err(TokenError::Unauthorized(*caller)),
        }
    }

    fn balance_of(&self, who: &AccountId) -> Amount {
        self.book.balance_of(who)
    }

    fn decimals(&self) -> u8 {
        TOKEN_DECIMALS
    }
}
