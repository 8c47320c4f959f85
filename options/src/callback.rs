//! Callbacks the ledger requires of its caller.
//!
//! The ledger applies every state change of an operation before it calls
//! back, so a callback that re-enters the ledger sees the updated books.
//! Single-method callbacks are implemented for matching closures.

use alloy_primitives::{Bytes, U256};

use crate::error::OptionError;
use crate::key::OptionKey;
use crate::token::TokenBook;
use crate::OptionLedger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMintCallbackParam {
    pub key: OptionKey,
    pub token0_and_long0_amount: U256,
    pub token1_and_long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionBurnCallbackParam {
    pub key: OptionKey,
    pub token0_and_long0_amount: U256,
    pub token1_and_long1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSwapCallbackParam {
    pub key: OptionKey,
    pub is_long0_to_long1: bool,
    pub token0_and_long0_amount: U256,
    pub token1_and_long1_amount: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCollectCallbackParam {
    pub key: OptionKey,
    pub token0_amount: U256,
    pub token1_amount: U256,
    pub short_amount: U256,
    pub data: Bytes,
}

/// Pays for a mint: must leave the ledger holding the required token0 and
/// token1 before returning.
pub trait OptionMintCallback {
    /// # Errors
    /// Any error aborts the mint.
    fn option_mint_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionMintCallbackParam,
    ) -> Result<Bytes, OptionError>;
}

/// Notified after a burn released its tokens. Only called with a non-empty payload.
pub trait OptionBurnCallback {
    /// # Errors
    /// Any error aborts the burn.
    fn option_burn_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionBurnCallbackParam,
    ) -> Result<Bytes, OptionError>;
}

/// Pays for the deposited side of a swap.
pub trait OptionSwapCallback {
    /// # Errors
    /// Any error aborts the swap.
    fn option_swap_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionSwapCallbackParam,
    ) -> Result<Bytes, OptionError>;
}

/// Notified after a collect released its tokens. Only called with a non-empty payload.
pub trait OptionCollectCallback {
    /// # Errors
    /// Any error aborts the collect.
    fn option_collect_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionCollectCallbackParam,
    ) -> Result<Bytes, OptionError>;
}

impl<F> OptionMintCallback for F
where
    F: FnMut(&mut OptionLedger, &mut TokenBook, &OptionMintCallbackParam) -> Result<Bytes, OptionError>,
{
    fn option_mint_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionMintCallbackParam,
    ) -> Result<Bytes, OptionError> {
        self(option, tokens, param)
    }
}

impl<F> OptionBurnCallback for F
where
    F: FnMut(&mut OptionLedger, &mut TokenBook, &OptionBurnCallbackParam) -> Result<Bytes, OptionError>,
{
    fn option_burn_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionBurnCallbackParam,
    ) -> Result<Bytes, OptionError> {
        self(option, tokens, param)
    }
}

impl<F> OptionSwapCallback for F
where
    F: FnMut(&mut OptionLedger, &mut TokenBook, &OptionSwapCallbackParam) -> Result<Bytes, OptionError>,
{
    fn option_swap_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionSwapCallbackParam,
    ) -> Result<Bytes, OptionError> {
        self(option, tokens, param)
    }
}

impl<F> OptionCollectCallback for F
where
    F: FnMut(
        &mut OptionLedger,
        &mut TokenBook,
        &OptionCollectCallbackParam,
    ) -> Result<Bytes, OptionError>,
{
    fn option_collect_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionCollectCallbackParam,
    ) -> Result<Bytes, OptionError> {
        self(option, tokens, param)
    }
}

/// For burns and collects that pass no payload and expect no call back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallback;

impl OptionBurnCallback for NoCallback {
    fn option_burn_callback(
        &mut self,
        _option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        _param: &OptionBurnCallbackParam,
    ) -> Result<Bytes, OptionError> {
        Ok(Bytes::new())
    }
}

impl OptionCollectCallback for NoCallback {
    fn option_collect_callback(
        &mut self,
        _option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        _param: &OptionCollectCallbackParam,
    ) -> Result<Bytes, OptionError> {
        Ok(Bytes::new())
    }
}
