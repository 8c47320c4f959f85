use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use alloy_primitives::{aliases::U160, Address, Log, U256};
use alloy_sol_types::SolEvent;
use math::num::{add, max, min, sub};
use math::safe_cast::{to_u160, widen};
use math::strike::{combine, convert};
use options::params::CallContext;
use options::{OptionKey, OptionLedger, PositionType, TokenBook};

use crate::callback::{
    LongChoice, LongChoiceParam, PoolAddFeesCallback, PoolAddFeesCallbackParam,
    PoolBurnChoiceCallback, PoolDeleverageCallback, PoolDeleverageChoiceCallback,
    PoolLeverageCallback, PoolLeverageChoiceCallback, PoolMintCallback, PoolMintCallbackParam,
    PoolMintChoiceCallback, PoolRebalanceCallback, PoolRebalanceCallbackParam,
    PoolTradeCallbackParam,
};
use crate::curve::{
    delta_rate_given_short, liquidity_given_long, liquidity_given_short, long_of, long_released,
    long_required, rate_given_long, short_of, short_released, short_required,
};
use crate::error::{
    AlreadyInitialized, AlreadyMatured, ExceedsCurve, ExceedsPoolBalance, InvalidChoice,
    InvalidSqrtInterestRate, NoLiquidity, NotEnoughLiquidity, NotEnoughReceived, OnlyOwner,
    PoolError, Uninitialized, ZeroAddress, ZeroInput, ZeroOutput, ZeroSqrtInterestRate,
};
use crate::events::{
    AddFees, Burn, CollectProtocolFees, CollectTransactionFees, Deleverage, Initialize,
    Leverage, Mint, Rebalance, TransferLiquidity,
};
use crate::fee::{additional, removal};
use crate::params::{
    PoolAddFeesParam, PoolBurn, PoolBurnParam, PoolBurnResult, PoolCollectProtocolFeesParam,
    PoolCollectProtocolFeesResult, PoolCollectTransactionFeesParam,
    PoolCollectTransactionFeesResult, PoolDeleverageParam, PoolLeverageParam, PoolMint,
    PoolMintParam, PoolMintResult, PoolRebalance, PoolRebalanceParam, PoolRebalanceResult,
    PoolTrade, PoolTradeResult,
};
use crate::state::{FeeAsset, PoolConfig, PoolState};

/// A constant-product pool per market, holding its positions in an
/// [`OptionLedger`] at its own address.
///
/// Every public mutating operation is atomic over the pool, the option
/// ledger and the token book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    address: Address,
    owner: Address,
    config: PoolConfig,
    pools: BTreeMap<OptionKey, PoolState>,
    markets: Vec<OptionKey>,
    /// Positions committed by settled calls, per market.
    reserves: BTreeMap<(OptionKey, PositionType), U256>,
    logs: Vec<Log>,
}

impl Pool {
    /// Creates a pool engine at `address`. `owner` may collect protocol fees.
    #[must_use]
    pub const fn new(address: Address, owner: Address, config: PoolConfig) -> Self {
        Self {
            address,
            owner,
            config,
            pools: BTreeMap::new(),
            markets: Vec::new(),
            reserves: BTreeMap::new(),
            logs: Vec::new(),
        }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    #[must_use]
    pub const fn config(&self) -> PoolConfig {
        self.config
    }

    #[must_use]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Opens the pool of `key` at `sqrt_interest_rate`. The engine's fee
    /// rates are fixed for the market from here on.
    ///
    /// # Errors
    /// - Key validation errors from the option ledger
    /// - `ZeroSqrtInterestRate`: If the rate is zero
    /// - `AlreadyMatured`: If the market has matured
    /// - `AlreadyInitialized`: If the pool exists
    pub fn initialize(
        &mut self,
        ctx: CallContext,
        key: OptionKey,
        sqrt_interest_rate: U160,
    ) -> Result<(), PoolError> {
        key.validate()?;
        if sqrt_interest_rate.is_zero() {
            return Err(PoolError::ZeroSqrtInterestRate(ZeroSqrtInterestRate {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;
        if self.pools.contains_key(&key) {
            return Err(PoolError::AlreadyInitialized(AlreadyInitialized {
                market: key.id(),
            }));
        }

        self.pools.insert(
            key,
            PoolState::new(sqrt_interest_rate, ctx.block_timestamp, self.config),
        );
        self.markets.push(key);
        self.emit(&Initialize {
            market: key.id(),
            sqrt_interest_rate,
        });

        Ok(())
    }

    /// Adds liquidity for `param.to`, paid with long and short positions.
    ///
    /// # Errors
    /// - `ZeroAddress` / `ZeroInput`: Missing recipient or zero delta
    /// - `Uninitialized` / `AlreadyMatured`: No live pool for the key
    /// - `ZeroOutput`: If the delta is worth no liquidity
    /// - `InvalidChoice`: If the long split is worth less than required
    /// - `NotEnoughReceived`: If the callback underpaid
    pub fn mint<C: PoolMintChoiceCallback + PoolMintCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolMintParam,
        callback: &mut C,
    ) -> Result<PoolMintResult, PoolError> {
        self.atomically(option, tokens, |pool, option, tokens| {
            pool.process_mint(option, tokens, ctx, param, callback)
        })
    }

    /// Removes liquidity of `ctx.msg_sender`.
    ///
    /// Before maturity the curve's long and short are paid out. After
    /// maturity only `GivenLiquidity` is accepted and the burner receives
    /// everything its position is owed instead.
    ///
    /// # Errors
    /// - `NotEnoughLiquidity`: If the sender holds less liquidity than burned
    /// - `InvalidChoice` / `ExceedsPoolBalance`: If the long split is invalid
    /// - `AlreadyMatured`: For a non-liquidity burn after maturity
    pub fn burn<C: PoolBurnChoiceCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolBurnParam,
        callback: &mut C,
    ) -> Result<PoolBurnResult, PoolError> {
        self.atomically(option, tokens, |pool, option, _| {
            pool.process_burn(option, ctx, param, callback)
        })
    }

    /// Deposits short and withdraws long. The transaction fee is paid in short.
    ///
    /// # Errors
    /// - `NoLiquidity`: If the pool has no liquidity
    /// - `ExceedsCurve`: If more long is requested than the curve holds
    /// - `ZeroOutput`: If no long would be released
    /// - `InvalidChoice` / `ExceedsPoolBalance`: If the long split is invalid
    /// - `NotEnoughReceived`: If the callback underpaid
    pub fn leverage<C: PoolLeverageChoiceCallback + PoolLeverageCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolLeverageParam,
        callback: &mut C,
    ) -> Result<PoolTradeResult, PoolError> {
        self.atomically(option, tokens, |pool, option, tokens| {
            pool.process_leverage(option, tokens, ctx, param, callback)
        })
    }

    /// Deposits long and withdraws short. The transaction fee is paid in short.
    ///
    /// # Errors
    /// - `NoLiquidity`: If the pool has no liquidity
    /// - `InvalidSqrtInterestRate`: If the rate would reach zero
    /// - `ZeroOutput`: If no short would be released
    /// - `InvalidChoice`: If the long split is worth less than required
    /// - `NotEnoughReceived`: If the callback underpaid
    pub fn deleverage<C: PoolDeleverageChoiceCallback + PoolDeleverageCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolDeleverageParam,
        callback: &mut C,
    ) -> Result<PoolTradeResult, PoolError> {
        self.atomically(option, tokens, |pool, option, tokens| {
            pool.process_deleverage(option, tokens, ctx, param, callback)
        })
    }

    /// Exchanges Long0 for Long1 (or back) at the strike, charging the
    /// transaction fee on the long paid out.
    ///
    /// # Errors
    /// - `NoLiquidity`: If the pool has no liquidity
    /// - `ExceedsPoolBalance`: If the pool holds too little of the output long
    /// - `NotEnoughReceived`: If the callback underpaid
    pub fn rebalance<C: PoolRebalanceCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolRebalanceParam,
        callback: &mut C,
    ) -> Result<PoolRebalanceResult, PoolError> {
        self.atomically(option, tokens, |pool, option, tokens| {
            pool.process_rebalance(option, tokens, ctx, param, callback)
        })
    }

    /// Donates positions to the pool's liquidity providers, pro rata.
    ///
    /// # Errors
    /// - `ZeroInput`: If every amount is zero
    /// - `NoLiquidity`: If the pool has no liquidity
    /// - `NotEnoughReceived`: If the callback underpaid
    pub fn add_fees<C: PoolAddFeesCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolAddFeesParam,
        callback: &mut C,
    ) -> Result<(), PoolError> {
        self.atomically(option, tokens, |pool, option, tokens| {
            pool.process_add_fees(option, tokens, ctx, param, callback)
        })
    }

    /// Pays out up to the requested protocol fees.
    ///
    /// # Errors
    /// - `OnlyOwner`: If the caller is not the owner
    /// - `ZeroAddress`: If a recipient is the zero address
    pub fn collect_protocol_fees(
        &mut self,
        option: &mut OptionLedger,
        ctx: CallContext,
        param: PoolCollectProtocolFeesParam,
    ) -> Result<PoolCollectProtocolFeesResult, PoolError> {
        if ctx.msg_sender != self.owner {
            return Err(PoolError::OnlyOwner(OnlyOwner {
                caller: ctx.msg_sender,
            }));
        }
        if param.long0_to.is_zero() || param.long1_to.is_zero() || param.short_to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }

        self.atomically(option, &mut TokenBook::new(), |pool, option, _| {
            let key = param.key;
            let state = pool.state_mut(&key)?;
            let long0_amount = state.long0_protocol_fees.min(param.long0_requested);
            let long1_amount = state.long1_protocol_fees.min(param.long1_requested);
            let short_amount = state.short_protocol_fees.min(param.short_requested);
            state.long0_protocol_fees -= long0_amount;
            state.long1_protocol_fees -= long1_amount;
            state.short_protocol_fees -= short_amount;

            pool.send(option, key, PositionType::Long0, param.long0_to, long0_amount)?;
            pool.send(option, key, PositionType::Long1, param.long1_to, long1_amount)?;
            pool.send(option, key, PositionType::Short, param.short_to, short_amount)?;

            pool.emit(&CollectProtocolFees {
                market: key.id(),
                caller: ctx.msg_sender,
                long0_amount,
                long1_amount,
                short_amount,
            });

            Ok(PoolCollectProtocolFeesResult {
                long0_amount,
                long1_amount,
                short_amount,
            })
        })
    }

    /// Pays out up to the requested fees and short returned owed to
    /// `ctx.msg_sender`.
    ///
    /// # Errors
    /// - `ZeroAddress`: If a recipient is the zero address
    /// - `Uninitialized`: If the pool does not exist
    pub fn collect_transaction_fees(
        &mut self,
        option: &mut OptionLedger,
        ctx: CallContext,
        param: PoolCollectTransactionFeesParam,
    ) -> Result<PoolCollectTransactionFeesResult, PoolError> {
        if param.long0_to.is_zero() || param.long1_to.is_zero() || param.short_to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }

        self.atomically(option, &mut TokenBook::new(), |pool, option, _| {
            let key = param.key;
            let owner = ctx.msg_sender;
            let state = pool.state_mut(&key)?;
            state.accrue(&key, ctx.block_timestamp)?;
            let (long0_fees, long1_fees, short_fees, short_returned) =
                state.settled_position(owner)?.take_owed(
                    param.long0_fees_requested,
                    param.long1_fees_requested,
                    param.short_fees_requested,
                    param.short_returned_requested,
                );
            state.prune(owner);

            pool.send(option, key, PositionType::Long0, param.long0_to, long0_fees)?;
            pool.send(option, key, PositionType::Long1, param.long1_to, long1_fees)?;
            pool.send(
                option,
                key,
                PositionType::Short,
                param.short_to,
                add(short_fees, short_returned)?,
            )?;

            pool.emit(&CollectTransactionFees {
                market: key.id(),
                caller: owner,
                long0_fees,
                long1_fees,
                short_fees,
                short_returned,
            });

            Ok(PoolCollectTransactionFeesResult {
                long0_fees,
                long1_fees,
                short_fees,
                short_returned,
            })
        })
    }

    /// Moves liquidity from `ctx.msg_sender` to `to`. Earnings up to now
    /// stay with the sender; the receiver earns from here on.
    ///
    /// # Errors
    /// - `ZeroAddress` / `ZeroInput`: Missing recipient or zero amount
    /// - `NotEnoughLiquidity`: If the sender holds less than `amount`
    pub fn transfer_liquidity(
        &mut self,
        ctx: CallContext,
        key: OptionKey,
        to: Address,
        amount: U160,
    ) -> Result<(), PoolError> {
        if to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }
        if amount.is_zero() {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }

        let snapshot = self.clone();
        let result = self.process_transfer_liquidity(ctx, key, to, amount);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    #[must_use]
    pub fn sqrt_interest_rate(&self, key: OptionKey) -> U160 {
        self.pools
            .get(&key)
            .map_or(U160::ZERO, |state| state.sqrt_interest_rate)
    }

    #[must_use]
    pub fn total_liquidity(&self, key: OptionKey) -> U160 {
        self.pools
            .get(&key)
            .map_or(U160::ZERO, |state| state.liquidity)
    }

    #[must_use]
    pub fn liquidity_of(&self, key: OptionKey, owner: Address) -> U160 {
        self.pools
            .get(&key)
            .and_then(|state| state.positions.get(&owner))
            .map_or(U160::ZERO, |position| position.liquidity)
    }

    /// Fee growth per unit of liquidity (Q128) for Long0, Long1 and Short.
    #[must_use]
    pub fn fee_growth(&self, key: OptionKey) -> (U256, U256, U256) {
        self.pools.get(&key).map_or(
            (U256::ZERO, U256::ZERO, U256::ZERO),
            |state| {
                (
                    state.growth.long0_fee,
                    state.growth.long1_fee,
                    state.growth.short_fee,
                )
            },
        )
    }

    /// Short returned per unit of liquidity (Q128) as of `block_timestamp`.
    ///
    /// # Errors
    /// - `Uninitialized`: If the pool does not exist
    pub fn short_returned_growth(
        &self,
        key: OptionKey,
        block_timestamp: u64,
    ) -> Result<U256, PoolError> {
        Ok(self
            .state(&key)?
            .growth_at(&key, block_timestamp)?
            .short_returned)
    }

    /// Long0, Long1 and Short fees owed to `owner`, settled or not.
    ///
    /// # Errors
    /// - `Uninitialized`: If the pool does not exist
    pub fn fees_earned_of(
        &self,
        key: OptionKey,
        owner: Address,
    ) -> Result<(U256, U256, U256), PoolError> {
        let state = self.state(&key)?;
        let position = state.projected_position(owner, &state.growth)?;
        Ok((position.long0_fees, position.long1_fees, position.short_fees))
    }

    /// Short returned owed to `owner` as of `block_timestamp`.
    ///
    /// # Errors
    /// - `Uninitialized`: If the pool does not exist
    pub fn short_returned_of(
        &self,
        key: OptionKey,
        owner: Address,
        block_timestamp: u64,
    ) -> Result<U256, PoolError> {
        let state = self.state(&key)?;
        let growth = state.growth_at(&key, block_timestamp)?;
        Ok(state.projected_position(owner, &growth)?.short_returned)
    }

    #[must_use]
    pub fn protocol_fees_earned(&self, key: OptionKey) -> (U256, U256, U256) {
        self.pools.get(&key).map_or(
            (U256::ZERO, U256::ZERO, U256::ZERO),
            |state| {
                (
                    state.long0_protocol_fees,
                    state.long1_protocol_fees,
                    state.short_protocol_fees,
                )
            },
        )
    }

    /// Long0 and Long1 backing the curve, fees excluded.
    #[must_use]
    pub fn total_long_balance(&self, key: OptionKey) -> (U256, U256) {
        self.pools.get(&key).map_or((U256::ZERO, U256::ZERO), |state| {
            (state.long0_balance, state.long1_balance)
        })
    }

    /// Short backing the curve at `block_timestamp`.
    ///
    /// # Errors
    /// - `Uninitialized`: If the pool does not exist
    pub fn total_short(&self, key: OptionKey, block_timestamp: u64) -> Result<U256, PoolError> {
        let state = self.state(&key)?;
        Ok(short_of(
            state.liquidity(),
            state.rate(),
            key.duration(block_timestamp),
            false,
        )?)
    }

    /// Everything the pool holds in the option ledger for `key`.
    #[must_use]
    pub fn total_positions(&self, option: &OptionLedger, key: OptionKey) -> (U256, U256, U256) {
        (
            option.position_of(key, self.address, PositionType::Long0),
            option.position_of(key, self.address, PositionType::Long1),
            option.position_of(key, self.address, PositionType::Short),
        )
    }

    /// Pools in order of initialization.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<OptionKey> {
        self.markets.get(index).copied()
    }

    #[must_use]
    pub fn number_of_pools(&self) -> usize {
        self.markets.len()
    }

    fn atomically<T>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        operation: impl FnOnce(&mut Self, &mut OptionLedger, &mut TokenBook) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        let pool = self.clone();
        let ledger = option.clone();
        let book = tokens.clone();

        let result = operation(self, option, tokens);
        if result.is_err() {
            *self = pool;
            *option = ledger;
            *tokens = book;
        }
        result
    }

    fn process_mint<C: PoolMintChoiceCallback + PoolMintCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolMintParam,
        callback: &mut C,
    ) -> Result<PoolMintResult, PoolError> {
        let key = param.key;
        if param.to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }
        if param.delta.is_zero() {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        let state = self.state_mut(&key)?;
        state.accrue(&key, ctx.block_timestamp)?;
        let rate = state.rate();
        let duration = key.duration(ctx.block_timestamp);

        let liquidity_amount = match param.transaction {
            PoolMint::GivenLiquidity => param.delta,
            PoolMint::GivenLong => liquidity_given_long(param.delta, rate, false)?,
            PoolMint::GivenShort => liquidity_given_short(param.delta, rate, duration, false)?,
            PoolMint::GivenLarger => min(
                liquidity_given_long(param.delta, rate, false)?,
                liquidity_given_short(param.delta, rate, duration, false)?,
            ),
        };
        if liquidity_amount.is_zero() {
            return Err(PoolError::ZeroOutput(ZeroOutput {}));
        }
        let long_amount = long_of(liquidity_amount, rate, true)?;
        let short_amount = short_of(liquidity_amount, rate, duration, true)?;

        state.liquidity = to_u160(add(state.liquidity(), liquidity_amount)?)?;
        let position = state.settled_position(param.to)?;
        position.liquidity = to_u160(add(widen(position.liquidity), liquidity_amount)?)?;

        let choice = callback.pool_mint_choice_callback(&LongChoiceParam {
            key,
            long_amount,
            short_amount,
            long0_balance: state.long0_balance,
            long1_balance: state.long1_balance,
            data: param.data,
        })?;
        if combine(choice.long0_amount, choice.long1_amount, key.strike, false)? < long_amount {
            return Err(invalid_choice(long_amount, &choice));
        }
        state.long0_balance = add(state.long0_balance, choice.long0_amount)?;
        state.long1_balance = add(state.long1_balance, choice.long1_amount)?;

        let liquidity_amount = to_u160(liquidity_amount)?;
        let data = callback.pool_mint_callback(
            self,
            option,
            tokens,
            &PoolMintCallbackParam {
                key,
                liquidity_amount,
                long0_amount: choice.long0_amount,
                long1_amount: choice.long1_amount,
                short_amount,
                data: choice.data,
            },
        )?;

        self.settle(option, key, PositionType::Long0, choice.long0_amount)?;
        self.settle(option, key, PositionType::Long1, choice.long1_amount)?;
        self.settle(option, key, PositionType::Short, short_amount)?;

        self.emit(&Mint {
            market: key.id(),
            caller: ctx.msg_sender,
            to: param.to,
            liquidity_amount,
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
        });

        Ok(PoolMintResult {
            liquidity_amount,
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            data,
        })
    }

    fn process_burn<C: PoolBurnChoiceCallback>(
        &mut self,
        option: &mut OptionLedger,
        ctx: CallContext,
        param: PoolBurnParam,
        callback: &mut C,
    ) -> Result<PoolBurnResult, PoolError> {
        let key = param.key;
        if param.long0_to.is_zero() || param.long1_to.is_zero() || param.short_to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }
        if param.delta.is_zero() {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }

        let owner = ctx.msg_sender;
        let state = self.state_mut(&key)?;
        state.accrue(&key, ctx.block_timestamp)?;

        if key.is_matured(ctx.block_timestamp) {
            if param.transaction != PoolBurn::GivenLiquidity {
                return Err(matured(&key, ctx.block_timestamp));
            }
            return self.burn_matured(option, ctx, param);
        }

        let rate = state.rate();
        let duration = key.duration(ctx.block_timestamp);
        let liquidity_amount = match param.transaction {
            PoolBurn::GivenLiquidity => param.delta,
            PoolBurn::GivenLong => liquidity_given_long(param.delta, rate, true)?,
            PoolBurn::GivenShort => liquidity_given_short(param.delta, rate, duration, true)?,
            PoolBurn::GivenSmaller => max(
                liquidity_given_long(param.delta, rate, true)?,
                liquidity_given_short(param.delta, rate, duration, true)?,
            ),
        };
        let long_amount = long_of(liquidity_amount, rate, false)?;
        let short_amount = short_of(liquidity_amount, rate, duration, false)?;

        remove_liquidity(state, owner, liquidity_amount)?;

        let choice = callback.pool_burn_choice_callback(&LongChoiceParam {
            key,
            long_amount,
            short_amount,
            long0_balance: state.long0_balance,
            long1_balance: state.long1_balance,
            data: param.data,
        })?;
        if combine(choice.long0_amount, choice.long1_amount, key.strike, true)? > long_amount {
            return Err(invalid_choice(long_amount, &choice));
        }
        take_long(state, &choice)?;

        self.send(option, key, PositionType::Long0, param.long0_to, choice.long0_amount)?;
        self.send(option, key, PositionType::Long1, param.long1_to, choice.long1_amount)?;
        self.send(option, key, PositionType::Short, param.short_to, short_amount)?;

        let liquidity_amount = to_u160(liquidity_amount)?;
        self.emit(&Burn {
            market: key.id(),
            caller: owner,
            liquidity_amount,
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            short_returned: U256::ZERO,
        });

        Ok(PoolBurnResult {
            liquidity_amount,
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            long0_fees: U256::ZERO,
            long1_fees: U256::ZERO,
            short_fees: U256::ZERO,
            short_returned: U256::ZERO,
            data: choice.data,
        })
    }

    /// After maturity the curve is closed: burning only settles the
    /// position and pays out everything it is owed.
    fn burn_matured(
        &mut self,
        option: &mut OptionLedger,
        ctx: CallContext,
        param: PoolBurnParam,
    ) -> Result<PoolBurnResult, PoolError> {
        let key = param.key;
        let owner = ctx.msg_sender;
        let state = self.state_mut(&key)?;

        remove_liquidity(state, owner, param.delta)?;
        let (long0_fees, long1_fees, short_fees, short_returned) = state
            .settled_position(owner)?
            .take_owed(U256::MAX, U256::MAX, U256::MAX, U256::MAX);
        state.prune(owner);

        self.send(option, key, PositionType::Long0, param.long0_to, long0_fees)?;
        self.send(option, key, PositionType::Long1, param.long1_to, long1_fees)?;
        self.send(
            option,
            key,
            PositionType::Short,
            param.short_to,
            add(short_fees, short_returned)?,
        )?;

        let liquidity_amount = to_u160(param.delta)?;
        self.emit(&Burn {
            market: key.id(),
            caller: owner,
            liquidity_amount,
            long0_amount: U256::ZERO,
            long1_amount: U256::ZERO,
            short_amount: U256::ZERO,
            short_returned,
        });

        Ok(PoolBurnResult {
            liquidity_amount,
            long0_amount: U256::ZERO,
            long1_amount: U256::ZERO,
            short_amount: U256::ZERO,
            long0_fees,
            long1_fees,
            short_fees,
            short_returned,
            data: param.data,
        })
    }

    fn process_leverage<C: PoolLeverageChoiceCallback + PoolLeverageCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolLeverageParam,
        callback: &mut C,
    ) -> Result<PoolTradeResult, PoolError> {
        let key = param.key;
        if param.long0_to.is_zero() || param.long1_to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }
        if param.delta.is_zero() {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        let state = self.live_state(&key, ctx.block_timestamp)?;
        let liquidity = state.liquidity();
        let rate = state.rate();
        let duration = key.duration(ctx.block_timestamp);
        let fee_rate = state.config.transaction_fee;

        let (next, long_amount, short_amount, short_fees) = match param.transaction {
            PoolTrade::GivenDeltaSqrtInterestRate => {
                let next = add(rate, param.delta)?;
                let short = short_required(liquidity, rate, next, duration)?;
                let fee = additional(short, fee_rate)?;
                (
                    next,
                    long_released(liquidity, rate, next)?,
                    add(short, fee)?,
                    fee,
                )
            }
            PoolTrade::GivenShort => {
                let fee = removal(param.delta, fee_rate)?;
                let delta_rate =
                    delta_rate_given_short(param.delta - fee, liquidity, duration, false)?;
                let next = add(rate, delta_rate)?;
                (
                    next,
                    long_released(liquidity, rate, next)?,
                    param.delta,
                    fee,
                )
            }
            PoolTrade::GivenLong => {
                let available = long_of(liquidity, rate, false)?;
                if param.delta >= available {
                    return Err(PoolError::ExceedsCurve(ExceedsCurve {
                        available,
                        required: param.delta,
                    }));
                }
                let next = rate_given_long(liquidity, available - param.delta, true)?;
                let short = short_required(liquidity, rate, next, duration)?;
                let fee = additional(short, fee_rate)?;
                (next, param.delta, add(short, fee)?, fee)
            }
        };
        if long_amount.is_zero() {
            return Err(PoolError::ZeroOutput(ZeroOutput {}));
        }
        state.set_rate(next)?;

        let choice = callback.pool_leverage_choice_callback(&LongChoiceParam {
            key,
            long_amount,
            short_amount,
            long0_balance: state.long0_balance,
            long1_balance: state.long1_balance,
            data: param.data,
        })?;
        if combine(choice.long0_amount, choice.long1_amount, key.strike, true)? > long_amount {
            return Err(invalid_choice(long_amount, &choice));
        }
        take_long(state, &choice)?;
        state.charge(FeeAsset::Short, short_fees)?;
        let sqrt_interest_rate = state.sqrt_interest_rate;

        self.send(option, key, PositionType::Long0, param.long0_to, choice.long0_amount)?;
        self.send(option, key, PositionType::Long1, param.long1_to, choice.long1_amount)?;

        let data = callback.pool_leverage_callback(
            self,
            option,
            tokens,
            &PoolTradeCallbackParam {
                key,
                long0_amount: choice.long0_amount,
                long1_amount: choice.long1_amount,
                short_amount,
                data: choice.data,
            },
        )?;
        self.settle(option, key, PositionType::Short, short_amount)?;

        self.emit(&Leverage {
            market: key.id(),
            caller: ctx.msg_sender,
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            short_fees,
            sqrt_interest_rate,
        });

        Ok(PoolTradeResult {
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            short_fees,
            sqrt_interest_rate,
            data,
        })
    }

    fn process_deleverage<C: PoolDeleverageChoiceCallback + PoolDeleverageCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolDeleverageParam,
        callback: &mut C,
    ) -> Result<PoolTradeResult, PoolError> {
        let key = param.key;
        if param.to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }
        if param.delta.is_zero() {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        let state = self.live_state(&key, ctx.block_timestamp)?;
        let liquidity = state.liquidity();
        let rate = state.rate();
        let duration = key.duration(ctx.block_timestamp);
        let fee_rate = state.config.transaction_fee;

        let (next, long_amount, short_amount, short_fees) = match param.transaction {
            PoolTrade::GivenDeltaSqrtInterestRate => {
                let next = lower_rate(rate, param.delta)?;
                let gross = short_released(liquidity, rate, next, duration)?;
                let fee = removal(gross, fee_rate)?;
                (
                    next,
                    long_required(liquidity, rate, next)?,
                    gross - fee,
                    fee,
                )
            }
            PoolTrade::GivenShort => {
                let fee = additional(param.delta, fee_rate)?;
                let gross = add(param.delta, fee)?;
                let next = lower_rate(
                    rate,
                    delta_rate_given_short(gross, liquidity, duration, true)?,
                )?;
                (
                    next,
                    long_required(liquidity, rate, next)?,
                    param.delta,
                    fee,
                )
            }
            PoolTrade::GivenLong => {
                let long = add(long_of(liquidity, rate, false)?, param.delta)?;
                let next = rate_given_long(liquidity, long, true)?;
                if next >= rate {
                    return Err(PoolError::ZeroOutput(ZeroOutput {}));
                }
                let gross = short_released(liquidity, rate, next, duration)?;
                let fee = removal(gross, fee_rate)?;
                (next, param.delta, gross - fee, fee)
            }
        };
        if short_amount.is_zero() {
            return Err(PoolError::ZeroOutput(ZeroOutput {}));
        }
        state.set_rate(next)?;

        let choice = callback.pool_deleverage_choice_callback(&LongChoiceParam {
            key,
            long_amount,
            short_amount,
            long0_balance: state.long0_balance,
            long1_balance: state.long1_balance,
            data: param.data,
        })?;
        if combine(choice.long0_amount, choice.long1_amount, key.strike, false)? < long_amount {
            return Err(invalid_choice(long_amount, &choice));
        }
        state.long0_balance = add(state.long0_balance, choice.long0_amount)?;
        state.long1_balance = add(state.long1_balance, choice.long1_amount)?;
        state.charge(FeeAsset::Short, short_fees)?;
        let sqrt_interest_rate = state.sqrt_interest_rate;

        self.send(option, key, PositionType::Short, param.to, short_amount)?;

        let data = callback.pool_deleverage_callback(
            self,
            option,
            tokens,
            &PoolTradeCallbackParam {
                key,
                long0_amount: choice.long0_amount,
                long1_amount: choice.long1_amount,
                short_amount,
                data: choice.data,
            },
        )?;
        self.settle(option, key, PositionType::Long0, choice.long0_amount)?;
        self.settle(option, key, PositionType::Long1, choice.long1_amount)?;

        self.emit(&Deleverage {
            market: key.id(),
            caller: ctx.msg_sender,
            to: param.to,
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            short_fees,
            sqrt_interest_rate,
        });

        Ok(PoolTradeResult {
            long0_amount: choice.long0_amount,
            long1_amount: choice.long1_amount,
            short_amount,
            short_fees,
            sqrt_interest_rate,
            data,
        })
    }

    fn process_rebalance<C: PoolRebalanceCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolRebalanceParam,
        callback: &mut C,
    ) -> Result<PoolRebalanceResult, PoolError> {
        let key = param.key;
        if param.to.is_zero() {
            return Err(PoolError::ZeroAddress(ZeroAddress {}));
        }
        if param.delta.is_zero() {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        let state = self.live_state(&key, ctx.block_timestamp)?;
        let fee_rate = state.config.transaction_fee;
        let strike = key.strike;
        let delta = param.delta;

        // (long0, long1) moved net of fee, the fee, and the gross output.
        let (long0_amount, long1_amount, long_fees, gross) =
            match (param.is_long0_to_long1, param.transaction) {
                (true, PoolRebalance::GivenLong0) => {
                    let gross = convert(delta, strike, true, false)?;
                    let fee = removal(gross, fee_rate)?;
                    (delta, gross - fee, fee, gross)
                }
                (true, PoolRebalance::GivenLong1) => {
                    let fee = additional(delta, fee_rate)?;
                    let gross = add(delta, fee)?;
                    (convert(gross, strike, false, true)?, delta, fee, gross)
                }
                (false, PoolRebalance::GivenLong1) => {
                    let gross = convert(delta, strike, false, false)?;
                    let fee = removal(gross, fee_rate)?;
                    (gross - fee, delta, fee, gross)
                }
                (false, PoolRebalance::GivenLong0) => {
                    let fee = additional(delta, fee_rate)?;
                    let gross = add(delta, fee)?;
                    (delta, convert(gross, strike, true, true)?, fee, gross)
                }
            };

        let (input, input_amount, output, output_amount, fee_asset) = if param.is_long0_to_long1
        {
            (
                PositionType::Long0,
                long0_amount,
                PositionType::Long1,
                long1_amount,
                FeeAsset::Long1,
            )
        } else {
            (
                PositionType::Long1,
                long1_amount,
                PositionType::Long0,
                long0_amount,
                FeeAsset::Long0,
            )
        };
        if output_amount.is_zero() {
            return Err(PoolError::ZeroOutput(ZeroOutput {}));
        }

        let (output_balance, input_balance) = if param.is_long0_to_long1 {
            (&mut state.long1_balance, &mut state.long0_balance)
        } else {
            (&mut state.long0_balance, &mut state.long1_balance)
        };
        if gross > *output_balance {
            return Err(PoolError::ExceedsPoolBalance(ExceedsPoolBalance {
                position: output.to_u8(),
                balance: *output_balance,
                required: gross,
            }));
        }
        *output_balance -= gross;
        *input_balance = add(*input_balance, input_amount)?;
        state.charge(fee_asset, long_fees)?;

        self.send(option, key, output, param.to, output_amount)?;

        let data = callback.pool_rebalance_callback(
            self,
            option,
            tokens,
            &PoolRebalanceCallbackParam {
                key,
                is_long0_to_long1: param.is_long0_to_long1,
                long0_amount,
                long1_amount,
                data: param.data,
            },
        )?;
        self.settle(option, key, input, input_amount)?;

        self.emit(&Rebalance {
            market: key.id(),
            caller: ctx.msg_sender,
            to: param.to,
            is_long0_to_long1: param.is_long0_to_long1,
            long0_amount,
            long1_amount,
            long_fees,
        });

        Ok(PoolRebalanceResult {
            long0_amount,
            long1_amount,
            long_fees,
            data,
        })
    }

    fn process_add_fees<C: PoolAddFeesCallback>(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: PoolAddFeesParam,
        callback: &mut C,
    ) -> Result<(), PoolError> {
        let key = param.key;
        if param.long0_fees.is_zero() && param.long1_fees.is_zero() && param.short_fees.is_zero()
        {
            return Err(PoolError::ZeroInput(ZeroInput {}));
        }

        let state = self.live_state(&key, ctx.block_timestamp)?;
        state.donate(FeeAsset::Long0, param.long0_fees)?;
        state.donate(FeeAsset::Long1, param.long1_fees)?;
        state.donate(FeeAsset::Short, param.short_fees)?;

        callback.pool_add_fees_callback(
            self,
            option,
            tokens,
            &PoolAddFeesCallbackParam {
                key,
                long0_fees: param.long0_fees,
                long1_fees: param.long1_fees,
                short_fees: param.short_fees,
                data: param.data,
            },
        )?;
        self.settle(option, key, PositionType::Long0, param.long0_fees)?;
        self.settle(option, key, PositionType::Long1, param.long1_fees)?;
        self.settle(option, key, PositionType::Short, param.short_fees)?;

        self.emit(&AddFees {
            market: key.id(),
            caller: ctx.msg_sender,
            long0_fees: param.long0_fees,
            long1_fees: param.long1_fees,
            short_fees: param.short_fees,
        });

        Ok(())
    }

    fn process_transfer_liquidity(
        &mut self,
        ctx: CallContext,
        key: OptionKey,
        to: Address,
        amount: U160,
    ) -> Result<(), PoolError> {
        let from = ctx.msg_sender;
        let state = self.state_mut(&key)?;
        state.accrue(&key, ctx.block_timestamp)?;

        let sender = state.settled_position(from)?;
        if sender.liquidity < amount {
            return Err(PoolError::NotEnoughLiquidity(NotEnoughLiquidity {
                owner: from,
                liquidity: widen(sender.liquidity),
                required: widen(amount),
            }));
        }
        sender.liquidity -= amount;

        let receiver = state.settled_position(to)?;
        receiver.liquidity = to_u160(add(widen(receiver.liquidity), widen(amount))?)?;
        state.prune(from);

        self.emit(&TransferLiquidity {
            market: key.id(),
            from,
            to,
            liquidity_amount: amount,
        });

        Ok(())
    }

    fn state(&self, key: &OptionKey) -> Result<&PoolState, PoolError> {
        self.pools.get(key).ok_or_else(|| uninitialized(key))
    }

    fn state_mut(&mut self, key: &OptionKey) -> Result<&mut PoolState, PoolError> {
        self.pools.get_mut(key).ok_or_else(|| uninitialized(key))
    }

    /// Accrued state of a pool that has liquidity to charge fees against.
    fn live_state(
        &mut self,
        key: &OptionKey,
        block_timestamp: u64,
    ) -> Result<&mut PoolState, PoolError> {
        let state = self.state_mut(key)?;
        state.accrue(key, block_timestamp)?;
        if state.liquidity.is_zero() {
            return Err(PoolError::NoLiquidity(NoLiquidity { market: key.id() }));
        }
        Ok(state)
    }

    fn reserve_of(&self, key: OptionKey, position: PositionType) -> U256 {
        self.reserves
            .get(&(key, position))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Transfers a position out of the pool. Zero amounts are skipped.
    fn send(
        &mut self,
        option: &mut OptionLedger,
        key: OptionKey,
        position: PositionType,
        to: Address,
        amount: U256,
    ) -> Result<(), PoolError> {
        if amount.is_zero() {
            return Ok(());
        }

        let reserve = sub(self.reserve_of(key, position), amount)?;
        self.reserves.insert((key, position), reserve);
        option.transfer_position(self.address, key, to, position, amount)?;
        Ok(())
    }

    /// Commits `amount` of a position owed by the current call.
    ///
    /// The pool's balance in the ledger must cover everything already
    /// committed plus `amount`.
    fn settle(
        &mut self,
        option: &OptionLedger,
        key: OptionKey,
        position: PositionType,
        amount: U256,
    ) -> Result<(), PoolError> {
        if amount.is_zero() {
            return Ok(());
        }

        let required = add(self.reserve_of(key, position), amount)?;
        let balance = option.position_of(key, self.address, position);
        if balance < required {
            return Err(PoolError::NotEnoughReceived(NotEnoughReceived {
                market: key.id(),
                position: position.to_u8(),
                required,
                balance,
            }));
        }
        self.reserves.insert((key, position), required);
        Ok(())
    }

    fn emit<E: SolEvent>(&mut self, event: &E) {
        self.logs.push(Log {
            address: self.address,
            data: event.encode_log_data(),
        });
    }
}

fn ensure_active(key: &OptionKey, block_timestamp: u64) -> Result<(), PoolError> {
    if key.is_matured(block_timestamp) {
        return Err(matured(key, block_timestamp));
    }
    Ok(())
}

fn matured(key: &OptionKey, block_timestamp: u64) -> PoolError {
    PoolError::AlreadyMatured(AlreadyMatured {
        maturity: key.maturity,
        block_timestamp: U256::from(block_timestamp),
    })
}

fn uninitialized(key: &OptionKey) -> PoolError {
    PoolError::Uninitialized(Uninitialized { market: key.id() })
}

fn invalid_choice(long_amount: U256, choice: &LongChoice) -> PoolError {
    PoolError::InvalidChoice(InvalidChoice {
        long_amount,
        long0_amount: choice.long0_amount,
        long1_amount: choice.long1_amount,
    })
}

fn lower_rate(rate: U256, delta: U256) -> Result<U256, PoolError> {
    if delta >= rate {
        return Err(PoolError::InvalidSqrtInterestRate(InvalidSqrtInterestRate {
            current: rate,
            next: U256::ZERO,
        }));
    }
    Ok(rate - delta)
}

fn remove_liquidity(state: &mut PoolState, owner: Address, amount: U256) -> Result<(), PoolError> {
    let position = state.settled_position(owner)?;
    let held = widen(position.liquidity);
    if held < amount {
        return Err(PoolError::NotEnoughLiquidity(NotEnoughLiquidity {
            owner,
            liquidity: held,
            required: amount,
        }));
    }
    position.liquidity = to_u160(held - amount)?;
    state.liquidity = to_u160(sub(state.liquidity(), amount)?)?;
    Ok(())
}

/// Takes a chosen split out of the pool's long balances.
fn take_long(state: &mut PoolState, choice: &LongChoice) -> Result<(), PoolError> {
    if choice.long0_amount > state.long0_balance {
        return Err(PoolError::ExceedsPoolBalance(ExceedsPoolBalance {
            position: PositionType::Long0.to_u8(),
            balance: state.long0_balance,
            required: choice.long0_amount,
        }));
    }
    if choice.long1_amount > state.long1_balance {
        return Err(PoolError::ExceedsPoolBalance(ExceedsPoolBalance {
            position: PositionType::Long1.to_u8(),
            balance: state.long1_balance,
            required: choice.long1_amount,
        }));
    }
    state.long0_balance -= choice.long0_amount;
    state.long1_balance -= choice.long1_amount;
    Ok(())
}
