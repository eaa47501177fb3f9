//! Pool snapshots, trade direction and the reserve source contract

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use types::{EngineError, PoolId};

/// Which pooled asset is sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Sell asset A, receive asset B
    #[serde(rename = "a_to_b")]
    AtoB,
    /// Sell asset B, receive asset A
    #[serde(rename = "b_to_a")]
    BtoA,
}

impl SwapDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::AtoB => Self::BtoA,
            Self::BtoA => Self::AtoB,
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtoB => f.write_str("a_to_b"),
            Self::BtoA => f.write_str("b_to_a"),
        }
    }
}

impl FromStr for SwapDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "a_to_b" | "atob" => Ok(Self::AtoB),
            "b_to_a" | "btoa" => Ok(Self::BtoA),
            other => Err(anyhow!("Unknown swap direction '{}'", other)),
        }
    }
}

/// Point-in-time reserves of a two-asset constant-product pool
///
/// Read fresh for every quote; a snapshot is never reused once the caller's
/// refresh interval has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolState {
    pub reserve_a: Decimal,
    pub reserve_b: Decimal,
}

impl PoolState {
    pub fn new(reserve_a: Decimal, reserve_b: Decimal) -> Self {
        Self {
            reserve_a,
            reserve_b,
        }
    }

    /// Orient raw pair reserves (token0, token1) onto the fund's A/B assets
    ///
    /// Pair contracts sort their tokens by address, so which of the two is
    /// asset A depends on the deployment.
    pub fn from_pair_reserves(reserve0: Decimal, reserve1: Decimal, token0_is_a: bool) -> Self {
        if token0_is_a {
            Self::new(reserve0, reserve1)
        } else {
            Self::new(reserve1, reserve0)
        }
    }

    /// Both reserves must be strictly positive
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.reserve_a <= Decimal::ZERO || self.reserve_b <= Decimal::ZERO {
            return Err(EngineError::InvalidPoolState {
                reserve_a: self.reserve_a,
                reserve_b: self.reserve_b,
            });
        }
        Ok(())
    }

    /// `(reserve_in, reserve_out)` for a trade in `direction`
    pub fn reserves_for(&self, direction: SwapDirection) -> (Decimal, Decimal) {
        match direction {
            SwapDirection::AtoB => (self.reserve_a, self.reserve_b),
            SwapDirection::BtoA => (self.reserve_b, self.reserve_a),
        }
    }

    /// The constant product `k = reserve_a * reserve_b`
    pub fn invariant(&self) -> Result<Decimal, EngineError> {
        self.validate()?;
        self.reserve_a
            .checked_mul(self.reserve_b)
            .ok_or_else(|| EngineError::overflow("pool invariant"))
    }

    /// Marginal rate: units of output per unit of input at zero size
    pub fn spot_rate(&self, direction: SwapDirection) -> Result<Decimal, EngineError> {
        self.validate()?;
        let (reserve_in, reserve_out) = self.reserves_for(direction);
        reserve_out
            .checked_div(reserve_in)
            .ok_or_else(|| EngineError::overflow("spot rate"))
    }
}

/// Point-in-time reserve reads
pub trait ReserveSource {
    fn reserves(&self, pool: &PoolId) -> Result<PoolState>;
}

/// Fixed reserve snapshots keyed by pool id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticReserves {
    pools: HashMap<PoolId, PoolState>,
}

impl StaticReserves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pool: PoolId, state: PoolState) {
        self.pools.insert(pool, state);
    }
}

impl ReserveSource for StaticReserves {
    fn reserves(&self, pool: &PoolId) -> Result<PoolState> {
        self.pools
            .get(pool)
            .copied()
            .ok_or_else(|| anyhow!("No reserves recorded for pool {}", pool))
    }
}
