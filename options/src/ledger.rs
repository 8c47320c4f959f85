use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;
use alloy_primitives::{Address, Log, U256};
use alloy_sol_types::SolEvent;
use math::full_math::mul_div;
use math::num::{add, sub};
use math::strike::{combine, convert, turn};

use crate::callback::{
    OptionBurnCallback, OptionBurnCallbackParam, OptionCollectCallback,
    OptionCollectCallbackParam, OptionMintCallback, OptionMintCallbackParam, OptionSwapCallback,
    OptionSwapCallbackParam,
};
use crate::error::{
    AlreadyMatured, InsufficientPosition, NotEnoughReceived, NotYetMatured, OptionError,
    TransferFailed, ZeroAddress, ZeroInput,
};
use crate::events::{Burn, Collect, Mint, Swap, TransferPosition};
use crate::key::{OptionKey, PositionType};
use crate::params::{
    CallContext, OptionBurn, OptionBurnParam, OptionBurnResult, OptionCollect,
    OptionCollectParam, OptionCollectResult, OptionMint, OptionMintParam, OptionMintResult,
    OptionSwap, OptionSwapParam, OptionSwapResult,
};
use crate::token::TokenBook;

/// Balance of one owner in one position of one market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PositionKey {
    key: OptionKey,
    position: PositionType,
    owner: Address,
}

/// Fully collateralized Long0/Long1/Short claims for every market.
///
/// Each market holds two invariants:
/// - the Long0 total equals the token0 it holds, the Long1 total the token1
/// - the Short total equals `combine(long0, long1)` at the time of issue
///
/// Every public mutating operation is atomic: on error the ledger and the
/// token book are restored exactly, including the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionLedger {
    address: Address,
    positions: BTreeMap<PositionKey, U256>,
    totals: BTreeMap<(OptionKey, PositionType), U256>,
    /// Tokens committed by settled calls, across all markets.
    reserves: BTreeMap<Address, U256>,
    markets: Vec<OptionKey>,
    known: BTreeSet<OptionKey>,
    logs: Vec<Log>,
}

impl OptionLedger {
    /// Creates an empty ledger holding its tokens at `address`.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self {
            address,
            positions: BTreeMap::new(),
            totals: BTreeMap::new(),
            reserves: BTreeMap::new(),
            markets: Vec::new(),
            known: BTreeSet::new(),
            logs: Vec::new(),
        }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Events emitted so far, oldest first.
    #[must_use]
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Issues longs and shorts against token0/token1 paid in the callback.
    ///
    /// Positions are credited before the callback runs. After it returns the
    /// ledger must hold every token it owes, otherwise the mint is undone.
    ///
    /// # Errors
    /// - `ZeroAddress` / `InvalidTokenPair` / `ZeroStrike` / `InvalidMaturity`: Malformed key or recipient
    /// - `ZeroInput`: If both amounts are zero
    /// - `AlreadyMatured`: If the market has matured
    /// - `NotEnoughReceived`: If the callback underpaid
    /// - Math errors when an amount overflows
    pub fn mint<C: OptionMintCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionMintParam,
        callback: &mut C,
    ) -> Result<OptionMintResult, OptionError> {
        self.atomically(tokens, |ledger, tokens| {
            ledger.process_mint(tokens, ctx, param, callback)
        })
    }

    /// Redeems matching Long0, Long1 and Short of `ctx.msg_sender` for tokens.
    ///
    /// # Errors
    /// - `InsufficientPosition`: If the sender lacks any of the three positions
    /// - `AlreadyMatured`: If the market has matured
    /// - `TransferFailed`: If a token transfer out fails
    /// - Validation and math errors as in [`Self::mint`]
    pub fn burn<C: OptionBurnCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionBurnParam,
        callback: &mut C,
    ) -> Result<OptionBurnResult, OptionError> {
        self.atomically(tokens, |ledger, tokens| {
            ledger.process_burn(tokens, ctx, param, callback)
        })
    }

    /// Exchanges one long type of `ctx.msg_sender` for the other at the strike.
    ///
    /// The released side is rounded down, the deposited side up.
    ///
    /// # Errors
    /// - `InsufficientPosition`: If the sender holds too little of the long given up
    /// - `NotEnoughReceived`: If the callback underpaid
    /// - Validation and math errors as in [`Self::mint`]
    pub fn swap<C: OptionSwapCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionSwapParam,
        callback: &mut C,
    ) -> Result<OptionSwapResult, OptionError> {
        self.atomically(tokens, |ledger, tokens| {
            ledger.process_swap(tokens, ctx, param, callback)
        })
    }

    /// Redeems Short of `ctx.msg_sender` for its pro-rata share of the
    /// remaining token0 and token1 after maturity.
    ///
    /// # Errors
    /// - `NotYetMatured`: Before maturity
    /// - `InsufficientPosition`: If the sender holds too little Short
    /// - `DivideByZero`: If the market has no Short outstanding
    /// - Validation errors as in [`Self::mint`]
    pub fn collect<C: OptionCollectCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionCollectParam,
        callback: &mut C,
    ) -> Result<OptionCollectResult, OptionError> {
        self.atomically(tokens, |ledger, tokens| {
            ledger.process_collect(tokens, ctx, param, callback)
        })
    }

    /// Moves `amount` of a position from `msg_sender` to `to`.
    ///
    /// # Errors
    /// - `ZeroAddress`: If `to` is the zero address
    /// - `ZeroInput`: If `amount` is zero
    /// - `InsufficientPosition`: If the sender holds less than `amount`
    pub fn transfer_position(
        &mut self,
        msg_sender: Address,
        key: OptionKey,
        to: Address,
        position: PositionType,
        amount: U256,
    ) -> Result<(), OptionError> {
        key.validate()?;
        if to.is_zero() {
            return Err(OptionError::ZeroAddress(ZeroAddress {}));
        }
        if amount.is_zero() {
            return Err(OptionError::ZeroInput(ZeroInput {}));
        }

        let from = PositionKey {
            key,
            position,
            owner: msg_sender,
        };
        let balance = self.positions.get(&from).copied().unwrap_or(U256::ZERO);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            OptionError::InsufficientPosition(InsufficientPosition {
                owner: msg_sender,
                position: position.to_u8(),
                balance,
                required: amount,
            })
        })?;
        self.set_position(from, remaining);

        let to_key = PositionKey {
            key,
            position,
            owner: to,
        };
        let received = add(self.position_of(key, to, position), amount)?;
        self.set_position(to_key, received);

        self.emit(&TransferPosition {
            market: key.id(),
            from: msg_sender,
            to,
            position: position.to_u8(),
            amount,
        });

        Ok(())
    }

    /// Outstanding supply of a position in a market.
    ///
    /// For Long0 and Long1 this is also the token0/token1 still held for
    /// the market.
    #[must_use]
    pub fn total_position(&self, key: OptionKey, position: PositionType) -> U256 {
        self.totals
            .get(&(key, position))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    #[must_use]
    pub fn position_of(&self, key: OptionKey, owner: Address, position: PositionType) -> U256 {
        self.positions
            .get(&PositionKey {
                key,
                position,
                owner,
            })
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Markets in order of their first mint.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<OptionKey> {
        self.markets.get(index).copied()
    }

    #[must_use]
    pub fn number_of_options(&self) -> usize {
        self.markets.len()
    }

    /// Amount of `token` committed to the ledger across all markets.
    #[must_use]
    pub fn reserve_of(&self, token: Address) -> U256 {
        self.reserves.get(&token).copied().unwrap_or(U256::ZERO)
    }

    fn atomically<T>(
        &mut self,
        tokens: &mut TokenBook,
        operation: impl FnOnce(&mut Self, &mut TokenBook) -> Result<T, OptionError>,
    ) -> Result<T, OptionError> {
        let ledger = self.clone();
        let book = tokens.clone();

        let result = operation(self, tokens);
        if result.is_err() {
            *self = ledger;
            *tokens = book;
        }
        result
    }

    fn process_mint<C: OptionMintCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionMintParam,
        callback: &mut C,
    ) -> Result<OptionMintResult, OptionError> {
        let key = param.key;
        key.validate()?;
        if param.long0_to.is_zero() || param.long1_to.is_zero() || param.short_to.is_zero() {
            return Err(OptionError::ZeroAddress(ZeroAddress {}));
        }
        if param.amount0.is_zero() && param.amount1.is_zero() {
            return Err(OptionError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        let (token0_and_long0_amount, token1_and_long1_amount, short_amount) =
            match param.transaction {
                OptionMint::GivenTokensAndLongs => (
                    param.amount0,
                    param.amount1,
                    combine(param.amount0, param.amount1, key.strike, false)?,
                ),
                OptionMint::GivenShorts => (
                    turn(param.amount0, key.strike, false, true)?,
                    turn(param.amount1, key.strike, true, true)?,
                    add(param.amount0, param.amount1)?,
                ),
            };

        self.register(key);
        self.credit(key, PositionType::Long0, param.long0_to, token0_and_long0_amount)?;
        self.credit(key, PositionType::Long1, param.long1_to, token1_and_long1_amount)?;
        self.credit(key, PositionType::Short, param.short_to, short_amount)?;

        let data = callback.option_mint_callback(
            self,
            tokens,
            &OptionMintCallbackParam {
                key,
                token0_and_long0_amount,
                token1_and_long1_amount,
                short_amount,
                data: param.data,
            },
        )?;

        self.settle(tokens, key.token0, token0_and_long0_amount)?;
        self.settle(tokens, key.token1, token1_and_long1_amount)?;

        self.emit(&Mint {
            market: key.id(),
            long0_to: param.long0_to,
            long1_to: param.long1_to,
            short_to: param.short_to,
            token0_and_long0_amount,
            token1_and_long1_amount,
            short_amount,
        });

        Ok(OptionMintResult {
            token0_and_long0_amount,
            token1_and_long1_amount,
            short_amount,
            data,
        })
    }

    fn process_burn<C: OptionBurnCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionBurnParam,
        callback: &mut C,
    ) -> Result<OptionBurnResult, OptionError> {
        let key = param.key;
        key.validate()?;
        if param.token0_to.is_zero() || param.token1_to.is_zero() {
            return Err(OptionError::ZeroAddress(ZeroAddress {}));
        }
        if param.amount0.is_zero() && param.amount1.is_zero() {
            return Err(OptionError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        let (token0_and_long0_amount, token1_and_long1_amount, short_amount) =
            match param.transaction {
                OptionBurn::GivenTokensAndLongs => (
                    param.amount0,
                    param.amount1,
                    combine(param.amount0, param.amount1, key.strike, true)?,
                ),
                OptionBurn::GivenShorts => (
                    turn(param.amount0, key.strike, false, false)?,
                    turn(param.amount1, key.strike, true, false)?,
                    add(param.amount0, param.amount1)?,
                ),
            };

        let owner = ctx.msg_sender;
        self.debit(key, PositionType::Long0, owner, token0_and_long0_amount)?;
        self.debit(key, PositionType::Long1, owner, token1_and_long1_amount)?;
        self.debit(key, PositionType::Short, owner, short_amount)?;
        self.decrease_reserve(key.token0, token0_and_long0_amount)?;
        self.decrease_reserve(key.token1, token1_and_long1_amount)?;

        self.safe_transfer(tokens, key.token0, param.token0_to, token0_and_long0_amount)?;
        self.safe_transfer(tokens, key.token1, param.token1_to, token1_and_long1_amount)?;

        let data = if param.data.is_empty() {
            param.data
        } else {
            callback.option_burn_callback(
                self,
                tokens,
                &OptionBurnCallbackParam {
                    key,
                    token0_and_long0_amount,
                    token1_and_long1_amount,
                    short_amount,
                    data: param.data,
                },
            )?
        };

        self.emit(&Burn {
            market: key.id(),
            token0_to: param.token0_to,
            token1_to: param.token1_to,
            token0_and_long0_amount,
            token1_and_long1_amount,
            short_amount,
        });

        Ok(OptionBurnResult {
            token0_and_long0_amount,
            token1_and_long1_amount,
            short_amount,
            data,
        })
    }

    fn process_swap<C: OptionSwapCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionSwapParam,
        callback: &mut C,
    ) -> Result<OptionSwapResult, OptionError> {
        let key = param.key;
        key.validate()?;
        if param.token_to.is_zero() || param.long_to.is_zero() {
            return Err(OptionError::ZeroAddress(ZeroAddress {}));
        }
        if param.amount.is_zero() {
            return Err(OptionError::ZeroInput(ZeroInput {}));
        }
        ensure_active(&key, ctx.block_timestamp)?;

        // The side flowing into the ledger rounds up.
        let (token0_and_long0_amount, token1_and_long1_amount) =
            match (param.transaction, param.is_long0_to_long1) {
                (OptionSwap::GivenToken0AndLong0, is_long0_to_long1) => (
                    param.amount,
                    convert(param.amount, key.strike, true, is_long0_to_long1)?,
                ),
                (OptionSwap::GivenToken1AndLong1, is_long0_to_long1) => (
                    convert(param.amount, key.strike, false, !is_long0_to_long1)?,
                    param.amount,
                ),
            };

        let (given_up, released, released_amount, taken, deposited, deposited_amount) =
            if param.is_long0_to_long1 {
                (
                    PositionType::Long0,
                    key.token0,
                    token0_and_long0_amount,
                    PositionType::Long1,
                    key.token1,
                    token1_and_long1_amount,
                )
            } else {
                (
                    PositionType::Long1,
                    key.token1,
                    token1_and_long1_amount,
                    PositionType::Long0,
                    key.token0,
                    token0_and_long0_amount,
                )
            };

        self.debit(key, given_up, ctx.msg_sender, released_amount)?;
        self.credit(key, taken, param.long_to, deposited_amount)?;
        self.decrease_reserve(released, released_amount)?;

        self.safe_transfer(tokens, released, param.token_to, released_amount)?;

        let data = callback.option_swap_callback(
            self,
            tokens,
            &OptionSwapCallbackParam {
                key,
                is_long0_to_long1: param.is_long0_to_long1,
                token0_and_long0_amount,
                token1_and_long1_amount,
                data: param.data,
            },
        )?;

        self.settle(tokens, deposited, deposited_amount)?;

        self.emit(&Swap {
            market: key.id(),
            token_to: param.token_to,
            long_to: param.long_to,
            is_long0_to_long1: param.is_long0_to_long1,
            token0_and_long0_amount,
            token1_and_long1_amount,
        });

        Ok(OptionSwapResult {
            token0_and_long0_amount,
            token1_and_long1_amount,
            data,
        })
    }

    fn process_collect<C: OptionCollectCallback>(
        &mut self,
        tokens: &mut TokenBook,
        ctx: CallContext,
        param: OptionCollectParam,
        callback: &mut C,
    ) -> Result<OptionCollectResult, OptionError> {
        let key = param.key;
        key.validate()?;
        if param.token0_to.is_zero() || param.token1_to.is_zero() {
            return Err(OptionError::ZeroAddress(ZeroAddress {}));
        }
        if param.amount.is_zero() {
            return Err(OptionError::ZeroInput(ZeroInput {}));
        }
        if !key.is_matured(ctx.block_timestamp) {
            return Err(OptionError::NotYetMatured(NotYetMatured {
                maturity: key.maturity,
                block_timestamp: U256::from(ctx.block_timestamp),
            }));
        }

        let long0 = self.total_position(key, PositionType::Long0);
        let long1 = self.total_position(key, PositionType::Long1);
        let short = self.total_position(key, PositionType::Short);

        let (token0_amount, token1_amount, short_amount) = match param.transaction {
            OptionCollect::GivenShort => (
                mul_div(long0, param.amount, short, false)?,
                mul_div(long1, param.amount, short, false)?,
                param.amount,
            ),
            OptionCollect::GivenToken0 => {
                let short_amount = mul_div(param.amount, short, long0, true)?;
                (
                    param.amount,
                    mul_div(long1, short_amount, short, false)?,
                    short_amount,
                )
            }
            OptionCollect::GivenToken1 => {
                let short_amount = mul_div(param.amount, short, long1, true)?;
                (
                    mul_div(long0, short_amount, short, false)?,
                    param.amount,
                    short_amount,
                )
            }
        };

        self.debit(key, PositionType::Short, ctx.msg_sender, short_amount)?;
        self.release(key, PositionType::Long0, token0_amount)?;
        self.release(key, PositionType::Long1, token1_amount)?;
        self.decrease_reserve(key.token0, token0_amount)?;
        self.decrease_reserve(key.token1, token1_amount)?;

        self.safe_transfer(tokens, key.token0, param.token0_to, token0_amount)?;
        self.safe_transfer(tokens, key.token1, param.token1_to, token1_amount)?;

        let data = if param.data.is_empty() {
            param.data
        } else {
            callback.option_collect_callback(
                self,
                tokens,
                &OptionCollectCallbackParam {
                    key,
                    token0_amount,
                    token1_amount,
                    short_amount,
                    data: param.data,
                },
            )?
        };

        self.emit(&Collect {
            market: key.id(),
            token0_to: param.token0_to,
            token1_to: param.token1_to,
            token0_amount,
            token1_amount,
            short_amount,
        });

        Ok(OptionCollectResult {
            token0_amount,
            token1_amount,
            short_amount,
            data,
        })
    }

    fn register(&mut self, key: OptionKey) {
        if self.known.insert(key) {
            self.markets.push(key);
        }
    }

    fn set_position(&mut self, position: PositionKey, amount: U256) {
        if amount.is_zero() {
            self.positions.remove(&position);
        } else {
            self.positions.insert(position, amount);
        }
    }

    fn credit(
        &mut self,
        key: OptionKey,
        position: PositionType,
        owner: Address,
        amount: U256,
    ) -> Result<(), OptionError> {
        if amount.is_zero() {
            return Ok(());
        }

        let balance = add(self.position_of(key, owner, position), amount)?;
        self.set_position(
            PositionKey {
                key,
                position,
                owner,
            },
            balance,
        );
        let total = add(self.total_position(key, position), amount)?;
        self.totals.insert((key, position), total);
        Ok(())
    }

    fn debit(
        &mut self,
        key: OptionKey,
        position: PositionType,
        owner: Address,
        amount: U256,
    ) -> Result<(), OptionError> {
        if amount.is_zero() {
            return Ok(());
        }

        let balance = self.position_of(key, owner, position);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            OptionError::InsufficientPosition(InsufficientPosition {
                owner,
                position: position.to_u8(),
                balance,
                required: amount,
            })
        })?;
        self.set_position(
            PositionKey {
                key,
                position,
                owner,
            },
            remaining,
        );
        self.release(key, position, amount)
    }

    /// Lowers a total without touching any holder's balance.
    fn release(
        &mut self,
        key: OptionKey,
        position: PositionType,
        amount: U256,
    ) -> Result<(), OptionError> {
        let total = sub(self.total_position(key, position), amount)?;
        self.totals.insert((key, position), total);
        Ok(())
    }

    fn decrease_reserve(&mut self, token: Address, amount: U256) -> Result<(), OptionError> {
        let reserve = sub(self.reserve_of(token), amount)?;
        self.reserves.insert(token, reserve);
        Ok(())
    }

    /// Commits `amount` of `token` owed by the current call.
    ///
    /// The ledger's balance must cover everything already committed plus
    /// `amount`. Calls nested inside a callback commit first, so their
    /// payments can never be counted twice.
    fn settle(
        &mut self,
        tokens: &TokenBook,
        token: Address,
        amount: U256,
    ) -> Result<(), OptionError> {
        if amount.is_zero() {
            return Ok(());
        }

        let required = add(self.reserve_of(token), amount)?;
        let balance = tokens.balance_of(token, self.address);
        if balance < required {
            return Err(OptionError::NotEnoughReceived(NotEnoughReceived {
                token,
                required,
                balance,
            }));
        }
        self.reserves.insert(token, required);
        Ok(())
    }

    /// Transfers tokens out of the ledger. Zero amounts are skipped.
    fn safe_transfer(
        &self,
        tokens: &mut TokenBook,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), OptionError> {
        if amount.is_zero() {
            return Ok(());
        }

        if tokens.transfer(token, self.address, to, amount) {
            Ok(())
        } else {
            Err(OptionError::TransferFailed(TransferFailed { token, to, amount }))
        }
    }

    fn emit<E: SolEvent>(&mut self, event: &E) {
        self.logs.push(Log {
            address: self.address,
            data: event.encode_log_data(),
        });
    }
}

fn ensure_active(key: &OptionKey, block_timestamp: u64) -> Result<(), OptionError> {
    if key.is_matured(block_timestamp) {
        return Err(OptionError::AlreadyMatured(AlreadyMatured {
            maturity: key.maturity,
            block_timestamp: U256::from(block_timestamp),
        }));
    }
    Ok(())
}
