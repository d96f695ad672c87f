//! Observable vault events.
//!
//! Every successful state-changing vault operation records one event.
//! Events are buffered by the engine and drained by the embedding
//! application; a failed operation records nothing.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, BlockNumber};

/// A state change observed on the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultEvent {
    /// Deposit tokens were staked.
    Deposited {
        account: AccountId,
        amount: Amount,
        block: BlockNumber,
    },
    /// Staked tokens were returned to the participant.
    Withdrawn {
        account: AccountId,
        amount: Amount,
        block: BlockNumber,
    },
    /// Accrued reward was minted to the participant.
    Harvested {
        account: AccountId,
        reward: Amount,
        block: BlockNumber,
    },
    /// The emission schedule was replaced.
    ScheduleUpdated {
        rate_per_block: Amount,
        start_block: BlockNumber,
        end_block: BlockNumber,
        block: BlockNumber,
    },
}
