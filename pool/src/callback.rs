//! Callbacks the pool requires of its caller.
//!
//! Operations with a long leg first ask a *choice* callback how the long
//! amount is split between Long0 and Long1, then (when the caller owes the
//! pool) call a *settle* callback that must transfer the owed option
//! positions to the pool. State is fully updated before the settle callback
//! runs, and the pool verifies its position balances after it returns.

use alloy_primitives::{aliases::U160, Bytes, U256};
use options::{OptionKey, OptionLedger, TokenBook};

use crate::error::PoolError;
use crate::Pool;

/// Asks how a long amount (base units) is split between Long0 and Long1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongChoiceParam {
    pub key: OptionKey,
    pub long_amount: U256,
    pub short_amount: U256,
    /// Long0 the pool can release or currently holds.
    pub long0_balance: U256,
    pub long1_balance: U256,
    pub data: Bytes,
}

/// The caller's split of a long amount, plus the payload for the settle callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongChoice {
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMintCallbackParam {
    pub key: OptionKey,
    pub liquidity_amount: U160,
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

/// Positions moved by a leverage or deleverage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTradeCallbackParam {
    pub key: OptionKey,
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRebalanceCallbackParam {
    pub key: OptionKey,
    pub is_long0_to_long1: bool,
    pub long0_amount: U256,
    pub long1_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAddFeesCallbackParam {
    pub key: OptionKey,
    pub long0_fees: U256,
    pub long1_fees: U256,
    pub short_fees: U256,
    pub data: Bytes,
}

/// The split must be worth at least `long_amount`.
pub trait PoolMintChoiceCallback {
    /// # Errors
    /// Any error aborts the mint.
    fn pool_mint_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError>;
}

/// Transfers the chosen Long0, Long1 and the short to the pool.
pub trait PoolMintCallback {
    /// # Errors
    /// Any error aborts the mint.
    fn pool_mint_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolMintCallbackParam,
    ) -> Result<Bytes, PoolError>;
}

/// The split must be worth at most `long_amount` and fit the pool's balances.
pub trait PoolBurnChoiceCallback {
    /// # Errors
    /// Any error aborts the burn.
    fn pool_burn_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError>;
}

/// The split must be worth at most `long_amount` and fit the pool's balances.
pub trait PoolLeverageChoiceCallback {
    /// # Errors
    /// Any error aborts the leverage.
    fn pool_leverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError>;
}

/// Transfers the short to the pool.
pub trait PoolLeverageCallback {
    /// # Errors
    /// Any error aborts the leverage.
    fn pool_leverage_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolTradeCallbackParam,
    ) -> Result<Bytes, PoolError>;
}

/// The split must be worth at least `long_amount`.
pub trait PoolDeleverageChoiceCallback {
    /// # Errors
    /// Any error aborts the deleverage.
    fn pool_deleverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError>;
}

/// Transfers the chosen Long0 and Long1 to the pool.
pub trait PoolDeleverageCallback {
    /// # Errors
    /// Any error aborts the deleverage.
    fn pool_deleverage_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolTradeCallbackParam,
    ) -> Result<Bytes, PoolError>;
}

/// Transfers the input long to the pool.
pub trait PoolRebalanceCallback {
    /// # Errors
    /// Any error aborts the rebalance.
    fn pool_rebalance_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolRebalanceCallbackParam,
    ) -> Result<Bytes, PoolError>;
}

/// Transfers the donated positions to the pool.
pub trait PoolAddFeesCallback {
    /// # Errors
    /// Any error aborts the donation.
    fn pool_add_fees_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolAddFeesCallbackParam,
    ) -> Result<Bytes, PoolError>;
}

impl<F> PoolRebalanceCallback for F
where
    F: FnMut(
        &mut Pool,
        &mut OptionLedger,
        &mut TokenBook,
        &PoolRebalanceCallbackParam,
    ) -> Result<Bytes, PoolError>,
{
    fn pool_rebalance_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolRebalanceCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self(pool, option, tokens, param)
    }
}

impl<F> PoolAddFeesCallback for F
where
    F: FnMut(
        &mut Pool,
        &mut OptionLedger,
        &mut TokenBook,
        &PoolAddFeesCallbackParam,
    ) -> Result<Bytes, PoolError>,
{
    fn pool_add_fees_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolAddFeesCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self(pool, option, tokens, param)
    }
}
