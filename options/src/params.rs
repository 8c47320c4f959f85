use alloy_primitives::{Address, Bytes, U256};

use crate::key::OptionKey;

/// Who is calling and when. The ledger never reads a clock of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub msg_sender: Address,
    pub block_timestamp: u64,
}

impl CallContext {
    #[must_use]
    pub const fn new(msg_sender: Address, block_timestamp: u64) -> Self {
        Self {
            msg_sender,
            block_timestamp,
        }
    }

    /// The same caller, `seconds` later.
    #[must_use]
    pub const fn forward(self, seconds: u64) -> Self {
        Self {
            msg_sender: self.msg_sender,
            block_timestamp: self.block_timestamp.saturating_add(seconds),
        }
    }
}

/// Which side of a mint is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionMint {
    /// `amount0`/`amount1` are the token (and long) amounts deposited.
    #[default]
    GivenTokensAndLongs,
    /// `amount0`/`amount1` are short amounts backed by token0/token1.
    GivenShorts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMintParam {
    pub key: OptionKey,
    pub long0_to: Address,
    pub long1_to: Address,
    pub short_to: Address,
    pub transaction: OptionMint,
    pub amount0: U256,
    pub amount1: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMintResult {
    pub token0_and_long0_amount: U256,
    pub token1_and_long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

/// Which side of a burn is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionBurn {
    /// `amount0`/`amount1` are the long (and token) amounts burned.
    #[default]
    GivenTokensAndLongs,
    /// `amount0`/`amount1` are short amounts redeemed for token0/token1.
    GivenShorts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionBurnParam {
    pub key: OptionKey,
    pub token0_to: Address,
    pub token1_to: Address,
    pub transaction: OptionBurn,
    pub amount0: U256,
    pub amount1: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionBurnResult {
    pub token0_and_long0_amount: U256,
    pub token1_and_long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionSwap {
    #[default]
    GivenToken0AndLong0,
    GivenToken1AndLong1,
}

/// Exchanges one long type for the other at the strike.
///
/// With `is_long0_to_long1` the caller gives up Long0 (receiving token0 at
/// `token_to`) and deposits token1 for Long1 (credited to `long_to`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSwapParam {
    pub key: OptionKey,
    pub token_to: Address,
    pub long_to: Address,
    pub is_long0_to_long1: bool,
    pub transaction: OptionSwap,
    pub amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSwapResult {
    pub token0_and_long0_amount: U256,
    pub token1_and_long1_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionCollect {
    #[default]
    GivenShort,
    GivenToken0,
    GivenToken1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCollectParam {
    pub key: OptionKey,
    pub token0_to: Address,
    pub token1_to: Address,
    pub transaction: OptionCollect,
    pub amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCollectResult {
    pub token0_amount: U256,
    pub token1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}
