//! Previews of ledger and pool operations.
//!
//! A quote runs the real operation against clones of the ledger, the pool
//! and the token book, `duration_forward` seconds after the given context.
//! Whatever the operation asks to be paid is minted into the clones, so a
//! quote never depends on the caller's balances. The clones are dropped
//! afterwards and the originals are left untouched.

use alloy_primitives::{aliases::U160, Address, Bytes, U256};
use math::strike::base_is_token0;
use options::callback::{
    OptionBurnCallback, OptionBurnCallbackParam, OptionCollectCallback,
    OptionCollectCallbackParam, OptionMintCallback, OptionMintCallbackParam, OptionSwapCallback,
    OptionSwapCallbackParam,
};
use options::params::{
    OptionBurnParam, OptionBurnResult, OptionCollectParam, OptionCollectResult, OptionMint,
    OptionMintParam, OptionMintResult, OptionSwapParam, OptionSwapResult,
};
use options::{CallContext, OptionError, OptionKey, OptionLedger, TokenBook};
use pool::callback::{
    LongChoice, LongChoiceParam, PoolBurnChoiceCallback, PoolDeleverageCallback,
    PoolDeleverageChoiceCallback, PoolLeverageCallback, PoolLeverageChoiceCallback,
    PoolMintCallback, PoolMintCallbackParam, PoolMintChoiceCallback, PoolRebalanceCallback,
    PoolRebalanceCallbackParam, PoolTradeCallbackParam,
};
use pool::params::{
    PoolBurnParam, PoolBurnResult, PoolDeleverageParam, PoolLeverageParam, PoolMintParam,
    PoolMintResult, PoolRebalanceParam, PoolRebalanceResult, PoolTradeResult,
};
use pool::{Pool, PoolError};

/// A pool quote: the operation's result and the rate it leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolQuote<T> {
    pub result: T,
    pub sqrt_interest_rate_after: U160,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoter {
    address: Address,
}

/// Pays the ledger by minting the owed tokens out of thin air.
struct Faucet;

impl OptionMintCallback for Faucet {
    fn option_mint_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionMintCallbackParam,
    ) -> Result<Bytes, OptionError> {
        tokens.mint(param.key.token0, option.address(), param.token0_and_long0_amount);
        tokens.mint(param.key.token1, option.address(), param.token1_and_long1_amount);
        Ok(param.data.clone())
    }
}

impl OptionSwapCallback for Faucet {
    fn option_swap_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionSwapCallbackParam,
    ) -> Result<Bytes, OptionError> {
        let (token, amount) = if param.is_long0_to_long1 {
            (param.key.token1, param.token1_and_long1_amount)
        } else {
            (param.key.token0, param.token0_and_long0_amount)
        };
        tokens.mint(token, option.address(), amount);
        Ok(param.data.clone())
    }
}

// Burns and collects owe nothing, the payload is handed back as is.
impl OptionBurnCallback for Faucet {
    fn option_burn_callback(
        &mut self,
        _option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &OptionBurnCallbackParam,
    ) -> Result<Bytes, OptionError> {
        Ok(param.data.clone())
    }
}

impl OptionCollectCallback for Faucet {
    fn option_collect_callback(
        &mut self,
        _option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &OptionCollectCallbackParam,
    ) -> Result<Bytes, OptionError> {
        Ok(param.data.clone())
    }
}

/// Pays the pool by minting the owed positions straight to it, and defers
/// every long split to the caller's choice.
struct Minting<'a, C> {
    quoter: Address,
    ctx: CallContext,
    choice: &'a mut C,
}

impl<C> Minting<'_, C> {
    /// Mints `long0`, `long1` and `short` of `key` to `to`.
    fn deliver(
        &self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        key: OptionKey,
        to: Address,
        [long0, long1, short]: [U256; 3],
    ) -> Result<(), PoolError> {
        if !long0.is_zero() || !long1.is_zero() {
            let param = OptionMintParam {
                key,
                long0_to: to,
                long1_to: to,
                short_to: self.quoter,
                transaction: OptionMint::GivenTokensAndLongs,
                amount0: long0,
                amount1: long1,
                data: Bytes::new(),
            };
            option.mint(tokens, self.ctx, param, &mut Faucet)?;
        }

        if !short.is_zero() {
            let (amount0, amount1) = if base_is_token0(key.strike) {
                (short, U256::ZERO)
            } else {
                (U256::ZERO, short)
            };
            let param = OptionMintParam {
                key,
                long0_to: self.quoter,
                long1_to: self.quoter,
                short_to: to,
                transaction: OptionMint::GivenShorts,
                amount0,
                amount1,
                data: Bytes::new(),
            };
            option.mint(tokens, self.ctx, param, &mut Faucet)?;
        }

        Ok(())
    }
}

impl<C: PoolMintChoiceCallback> PoolMintChoiceCallback for Minting<'_, C> {
    fn pool_mint_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        self.choice.pool_mint_choice_callback(param)
    }
}

impl<C> PoolMintCallback for Minting<'_, C> {
    fn pool_mint_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolMintCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.deliver(
            option,
            tokens,
            param.key,
            pool.address(),
            [param.long0_amount, param.long1_amount, param.short_amount],
        )?;
        Ok(param.data.clone())
    }
}

impl<C: PoolLeverageChoiceCallback> PoolLeverageChoiceCallback for Minting<'_, C> {
    fn pool_leverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError> {
        self.choice.pool_leverage_choice_callback(param)
    }
}

impl<C> PoolLeverageCallback for Minting<'_, C> {
    fn pool_leverage_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolTradeCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.deliver(
            option,
            tokens,
            param.key,
            pool.address(),
            [U256::ZERO, U256::ZERO, param.short_amount],
        )?;
        Ok(param.data.clone())
    }
}

impl<C: PoolDeleverageChoiceCallback> PoolDeleverageChoiceCallback for Minting<'_, C> {
    fn pool_deleverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError> {
        self.choice.pool_deleverage_choice_callback(param)
    }
}

impl<C> PoolDeleverageCallback for Minting<'_, C> {
    fn pool_deleverage_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolTradeCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.deliver(
            option,
            tokens,
            param.key,
            pool.address(),
            [param.long0_amount, param.long1_amount, U256::ZERO],
        )?;
        Ok(param.data.clone())
    }
}

impl<C> PoolRebalanceCallback for Minting<'_, C> {
    fn pool_rebalance_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &PoolRebalanceCallbackParam,
    ) -> Result<Bytes, PoolError> {
        let owed = if param.is_long0_to_long1 {
            [param.long0_amount, U256::ZERO, U256::ZERO]
        } else {
            [U256::ZERO, param.long1_amount, U256::ZERO]
        };
        self.deliver(option, tokens, param.key, pool.address(), owed)?;
        Ok(param.data.clone())
    }
}

#[allow(clippy::too_many_arguments, clippy::unused_self)]
impl Quoter {
    /// Creates a quoter that holds whatever it mints at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self { address }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Tokens and positions a mint would produce.
    ///
    /// # Errors
    /// Whatever [`OptionLedger::mint`] would return.
    pub fn quote_option_mint(
        &self,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: OptionMintParam,
        duration_forward: u64,
    ) -> Result<OptionMintResult, OptionError> {
        let (mut option, mut tokens) = (option.clone(), tokens.clone());
        option.mint(&mut tokens, ctx.forward(duration_forward), param, &mut Faucet)
    }

    /// # Errors
    /// Whatever [`OptionLedger::burn`] would return.
    pub fn quote_option_burn(
        &self,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: OptionBurnParam,
        duration_forward: u64,
    ) -> Result<OptionBurnResult, OptionError> {
        let (mut option, mut tokens) = (option.clone(), tokens.clone());
        option.burn(&mut tokens, ctx.forward(duration_forward), param, &mut Faucet)
    }

    /// # Errors
    /// Whatever [`OptionLedger::swap`] would return.
    pub fn quote_option_swap(
        &self,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: OptionSwapParam,
        duration_forward: u64,
    ) -> Result<OptionSwapResult, OptionError> {
        let (mut option, mut tokens) = (option.clone(), tokens.clone());
        option.swap(&mut tokens, ctx.forward(duration_forward), param, &mut Faucet)
    }

    /// # Errors
    /// Whatever [`OptionLedger::collect`] would return. A market that has
    /// not matured yet may be quoted with enough `duration_forward`.
    pub fn quote_option_collect(
        &self,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: OptionCollectParam,
        duration_forward: u64,
    ) -> Result<OptionCollectResult, OptionError> {
        let (mut option, mut tokens) = (option.clone(), tokens.clone());
        option.collect(&mut tokens, ctx.forward(duration_forward), param, &mut Faucet)
    }

    /// Liquidity and deposits of a pool mint, split by `choice`.
    ///
    /// # Errors
    /// Whatever [`Pool::mint`] would return.
    pub fn quote_pool_mint<C: PoolMintChoiceCallback>(
        &self,
        pool: &Pool,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: PoolMintParam,
        duration_forward: u64,
        choice: &mut C,
    ) -> Result<PoolQuote<PoolMintResult>, PoolError> {
        let ctx = ctx.forward(duration_forward);
        let key = param.key;
        let (mut pool, mut option, mut tokens) = (pool.clone(), option.clone(), tokens.clone());
        let mut minting = Minting {
            quoter: self.address,
            ctx,
            choice,
        };

        let result = pool.mint(&mut option, &mut tokens, ctx, param, &mut minting)?;

        Ok(PoolQuote {
            result,
            sqrt_interest_rate_after: pool.sqrt_interest_rate(key),
        })
    }

    /// # Errors
    /// Whatever [`Pool::burn`] would return.
    pub fn quote_pool_burn<C: PoolBurnChoiceCallback>(
        &self,
        pool: &Pool,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: PoolBurnParam,
        duration_forward: u64,
        choice: &mut C,
    ) -> Result<PoolQuote<PoolBurnResult>, PoolError> {
        let ctx = ctx.forward(duration_forward);
        let key = param.key;
        let (mut pool, mut option, mut tokens) = (pool.clone(), option.clone(), tokens.clone());

        let result = pool.burn(&mut option, &mut tokens, ctx, param, choice)?;

        Ok(PoolQuote {
            result,
            sqrt_interest_rate_after: pool.sqrt_interest_rate(key),
        })
    }

    /// # Errors
    /// Whatever [`Pool::leverage`] would return.
    pub fn quote_pool_leverage<C: PoolLeverageChoiceCallback>(
        &self,
        pool: &Pool,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: PoolLeverageParam,
        duration_forward: u64,
        choice: &mut C,
    ) -> Result<PoolQuote<PoolTradeResult>, PoolError> {
        let ctx = ctx.forward(duration_forward);
        let key = param.key;
        let (mut pool, mut option, mut tokens) = (pool.clone(), option.clone(), tokens.clone());
        let mut minting = Minting {
            quoter: self.address,
            ctx,
            choice,
        };

        let result = pool.leverage(&mut option, &mut tokens, ctx, param, &mut minting)?;

        Ok(PoolQuote {
            result,
            sqrt_interest_rate_after: pool.sqrt_interest_rate(key),
        })
    }

    /// # Errors
    /// Whatever [`Pool::deleverage`] would return.
    pub fn quote_pool_deleverage<C: PoolDeleverageChoiceCallback>(
        &self,
        pool: &Pool,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: PoolDeleverageParam,
        duration_forward: u64,
        choice: &mut C,
    ) -> Result<PoolQuote<PoolTradeResult>, PoolError> {
        let ctx = ctx.forward(duration_forward);
        let key = param.key;
        let (mut pool, mut option, mut tokens) = (pool.clone(), option.clone(), tokens.clone());
        let mut minting = Minting {
            quoter: self.address,
            ctx,
            choice,
        };

        let result = pool.deleverage(&mut option, &mut tokens, ctx, param, &mut minting)?;

        Ok(PoolQuote {
            result,
            sqrt_interest_rate_after: pool.sqrt_interest_rate(key),
        })
    }

    /// Rebalancing leaves the rate as it is; it is reported all the same.
    ///
    /// # Errors
    /// Whatever [`Pool::rebalance`] would return.
    pub fn quote_pool_rebalance(
        &self,
        pool: &Pool,
        option: &OptionLedger,
        tokens: &TokenBook,
        ctx: CallContext,
        param: PoolRebalanceParam,
        duration_forward: u64,
    ) -> Result<PoolQuote<PoolRebalanceResult>, PoolError> {
        let ctx = ctx.forward(duration_forward);
        let key = param.key;
        let (mut pool, mut option, mut tokens) = (pool.clone(), option.clone(), tokens.clone());
        let mut minting = Minting {
            quoter: self.address,
            ctx,
            choice: &mut (),
        };

        let result = pool.rebalance(&mut option, &mut tokens, ctx, param, &mut minting)?;

        Ok(PoolQuote {
            result,
            sqrt_interest_rate_after: pool.sqrt_interest_rate(key),
        })
    }
}
