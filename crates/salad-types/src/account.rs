//! Participant identity.

use serde::{Deserialize, Serialize};

/// A 20-byte account identifier.
///
/// Identifies token holders, vault participants, and authorities. The
/// ordering derive keeps keyed collections deterministic. Serialized
/// as a `0x`-prefixed hex string so it can key JSON maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// Build an account id from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        AccountId(bytes)
    }

    /// Deterministic test/demo account: the index byte repeated.
    pub fn from_index(index: u8) -> Self {
        AccountId([index; 20])
    }

    /// Raw bytes of the identifier.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let stripped = text.strip_prefix("0x").unwrap_or(&text);
        let bytes = hex::decode(stripped).map_err(serde::de::Error::custom)?;
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("account id must be 20 bytes"))?;
        Ok(AccountId(raw))
    }
}
