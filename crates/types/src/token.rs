/// Token identities and canonical pair ordering

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-chain identity of an ERC-20 token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TokenIdentity {
    /// Chain the token lives on
    pub chain_id: u64,

    /// Token contract address
    pub address: Address,

    /// Token metadata
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl TokenIdentity {
    pub fn new(
        chain_id: u64,
        address: Address,
        decimals: u8,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TokenIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.address)
    }
}

/// Order two addresses the way pools key them: ascending by address
pub fn sort_addresses(a: Address, b: Address) -> (Address, Address) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
