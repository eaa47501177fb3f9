//! # Typed identifiers
//!
//! Funds, investors and pools are all addressed by strings on the wire
//! (vault proxy addresses, wallet addresses, pair addresses). Wrapping each in
//! its own type keeps a fund id from being passed where an investor address
//! is expected.
//!
//! ```rust
//! use types::{FundId, InvestorAddress};
//!
//! let fund = FundId::new("0xVaultProxy");
//! let investor = InvestorAddress::new("0xAbCd");
//! assert_eq!(investor.as_str(), "0xabcd");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Define a transparent string identifier
///
/// The optional `normalize` function is applied on construction and on
/// deserialization so equality is always on the canonical form.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident $(, normalize = $normalize:path)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                let id: String = id.into();
                $(let id = $normalize(id);)?
                Self(id)
            }

            /// Borrow the canonical string form
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the canonical string form
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                String::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

/// Wallet addresses are case-insensitive hex (EIP-55 casing is display only)
fn lowercase_address(address: String) -> String {
    address.trim().to_ascii_lowercase()
}

fn trimmed(id: String) -> String {
    let trimmed = id.trim();
    if trimmed.len() == id.len() {
        id
    } else {
        trimmed.to_string()
    }
}

define_string_id!(
    /// Identifier of a fund (its vault address or registry id)
    FundId,
    normalize = trimmed
);

define_string_id!(
    /// Identifier of an investor (wallet address, lowercased)
    InvestorAddress,
    normalize = lowercase_address
);

define_string_id!(
    /// Identifier of a liquidity pool (pair contract address)
    PoolId,
    normalize = lowercase_address
);
