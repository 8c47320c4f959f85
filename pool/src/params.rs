use alloy_primitives::{aliases::U160, Address, Bytes, U256};
use options::OptionKey;

/// What `delta` of a mint measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolMint {
    #[default]
    GivenLiquidity,
    /// Long (base units) to deposit.
    GivenLong,
    /// Short to deposit.
    GivenShort,
    /// The larger of the long and short deposits.
    GivenLarger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMintParam {
    pub key: OptionKey,
    /// Receives the liquidity.
    pub to: Address,
    pub transaction: PoolMint,
    pub delta: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMintResult {
    pub liquidity_amount: U160,
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

/// What `delta` of a burn measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolBurn {
    #[default]
    GivenLiquidity,
    GivenLong,
    GivenShort,
    /// The smaller of the long and short withdrawals.
    GivenSmaller,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolBurnParam {
    pub key: OptionKey,
    pub long0_to: Address,
    pub long1_to: Address,
    pub short_to: Address,
    pub transaction: PoolBurn,
    pub delta: U256,
    pub data: Bytes,
}

/// Amounts released by a burn.
///
/// Before maturity only the curve amounts are set. After maturity the curve
/// pays nothing and the burner receives everything its position is owed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolBurnResult {
    pub liquidity_amount: U160,
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub short_amount: U256,
    pub long0_fees: U256,
    pub long1_fees: U256,
    pub short_fees: U256,
    pub short_returned: U256,
    pub data: Bytes,
}

/// What `delta` of a leverage or deleverage measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolTrade {
    /// Change of the square-root interest rate.
    #[default]
    GivenDeltaSqrtInterestRate,
    /// Long (base units) leaving or entering the pool.
    GivenLong,
    /// Short paid in (leverage, fee included) or received (deleverage, net of fee).
    GivenShort,
}

/// Deposits short and withdraws long, raising the rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolLeverageParam {
    pub key: OptionKey,
    pub long0_to: Address,
    pub long1_to: Address,
    pub transaction: PoolTrade,
    pub delta: U256,
    pub data: Bytes,
}

/// Deposits long and withdraws short, lowering the rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDeleverageParam {
    pub key: OptionKey,
    pub to: Address,
    pub transaction: PoolTrade,
    pub delta: U256,
    pub data: Bytes,
}

/// Result of a leverage or deleverage. `short_amount` is what the caller
/// paid (leverage) or received (deleverage); `short_fees` is included in or
/// already removed from it respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTradeResult {
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub short_amount: U256,
    pub short_fees: U256,
    pub sqrt_interest_rate: U160,
    pub data: Bytes,
}

/// Which long amount of a rebalance `delta` measures.
///
/// The given long is the input when it is the side the caller pays and
/// the net output otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolRebalance {
    #[default]
    GivenLong0,
    GivenLong1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRebalanceParam {
    pub key: OptionKey,
    pub to: Address,
    pub is_long0_to_long1: bool,
    pub transaction: PoolRebalance,
    pub delta: U256,
    pub data: Bytes,
}

/// `long_fees` is in the output long and already removed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRebalanceResult {
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub long_fees: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAddFeesParam {
    pub key: OptionKey,
    pub long0_fees: U256,
    pub long1_fees: U256,
    pub short_fees: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCollectProtocolFeesParam {
    pub key: OptionKey,
    pub long0_to: Address,
    pub long1_to: Address,
    pub short_to: Address,
    pub long0_requested: U256,
    pub long1_requested: U256,
    pub short_requested: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCollectProtocolFeesResult {
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub short_amount: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCollectTransactionFeesParam {
    pub key: OptionKey,
    pub long0_to: Address,
    pub long1_to: Address,
    pub short_to: Address,
    pub long0_fees_requested: U256,
    pub long1_fees_requested: U256,
    pub short_fees_requested: U256,
    pub short_returned_requested: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolCollectTransactionFeesResult {
    pub long0_fees: U256,
    pub long1_fees: U256,
    pub short_fees: U256,
    pub short_returned: U256,
}
