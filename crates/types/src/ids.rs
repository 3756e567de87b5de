//! Identifiers for accounts, assets and pools.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable integer index of a pool in the registry
pub type PoolId = usize;

/// Account identifier
///
/// Accounts are opaque strings: an address, a handle, or a protocol-owned
/// name such as the farm's custody account.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Fungible asset identifier (reward token or a staked asset)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let account = AccountId::from("bob");
        assert_eq!(serde_json::to_string(&account).unwrap(), "\"bob\"");

        let asset: AssetId = serde_json::from_str("\"LP-1\"").unwrap();
        assert_eq!(asset.as_str(), "LP-1");
        assert_eq!(asset.to_string(), "LP-1");
    }
}
