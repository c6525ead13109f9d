use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte account identifier for owners, participants, token contracts and
/// distribution instances alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(address: &str) -> Result<Self, crate::error::DistributionError> {
        let stripped = address.strip_prefix("0x").unwrap_or(address);
        let raw = hex::decode(stripped)
            .map_err(|_| crate::error::DistributionError::InvalidAddress(address.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| crate::error::DistributionError::InvalidAddress(address.to_string()))?;
        Ok(Self(bytes))
    }

    /// The all-zero sentinel. Never a valid token, owner or recipient.
    pub fn placeholder() -> Self {
        Self([0; 32])
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == [0; 32]
    }

    /// Derive a fresh instance address from a parent account and a nonce.
    /// Used by the factory so each distribution can hold collaborator
    /// balances under its own account.
    pub fn derive(parent: &AccountAddress, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(parent.as_bytes());
        hasher.update(&nonce.to_le_bytes());
        Self(*hasher.finalize().as_bytes())
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}
