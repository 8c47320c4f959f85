use alloy_primitives::{Address, Bytes, U256};
use options::callback::{
    OptionBurnCallback, OptionBurnCallbackParam, OptionCollectCallback,
    OptionCollectCallbackParam, OptionMintCallback, OptionMintCallbackParam, OptionSwapCallback,
    OptionSwapCallbackParam,
};
use options::error::TransferFailed;
use options::{OptionError, OptionKey, OptionLedger, PositionType, TokenBook};
use pool::callback::{
    LongChoice, LongChoiceParam, PoolAddFeesCallback, PoolAddFeesCallbackParam,
    PoolBurnChoiceCallback, PoolDeleverageCallback, PoolDeleverageChoiceCallback,
    PoolLeverageCallback, PoolLeverageChoiceCallback, PoolMintCallback, PoolMintCallbackParam,
    PoolMintChoiceCallback, PoolRebalanceCallback, PoolRebalanceCallbackParam,
    PoolTradeCallbackParam,
};
use pool::{Pool, PoolError};

use crate::split::LongSplit;

/// An account that settles every ledger and pool callback from what it
/// holds: tokens for the option ledger, option positions for the pool.
///
/// The payload passed to an operation is handed back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payer {
    address: Address,
    split: LongSplit,
}

impl Payer {
    #[must_use]
    pub const fn new(address: Address, split: LongSplit) -> Self {
        Self { address, split }
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub const fn split(&self) -> LongSplit {
        self.split
    }

    fn pay_token(
        self,
        tokens: &mut TokenBook,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), OptionError> {
        if amount.is_zero() || tokens.transfer(token, self.address, to, amount) {
            return Ok(());
        }
        Err(OptionError::TransferFailed(TransferFailed { token, to, amount }))
    }

    /// Transfers Long0, Long1 and Short, in that order, to the pool.
    fn pay_positions(
        self,
        pool: &Pool,
        option: &mut OptionLedger,
        key: OptionKey,
        amounts: [U256; 3],
    ) -> Result<(), PoolError> {
        for (position, amount) in PositionType::ALL.into_iter().zip(amounts) {
            if !amount.is_zero() {
                option.transfer_position(self.address, key, pool.address(), position, amount)?;
            }
        }
        Ok(())
    }
}

impl OptionMintCallback for Payer {
    fn option_mint_callback(
        &mut self,
        option: &mut OptionLedger,
        tokens: &mut TokenBook,
        param: &OptionMintCallbackParam,
    ) -> Result<Bytes, OptionError> {
        let ledger = option.address();
        self.pay_token(tokens, param.key.token0, ledger, param.token0_and_long0_amount)?;
        self.pay_token(tokens, param.key.token1, ledger, param.token1_and_long1_amount)?;
        Ok(param.data.clone())
    }
}

impl OptionSwapCallback for Payer {
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
        self.pay_token(tokens, token, option.address(), amount)?;
        Ok(param.data.clone())
    }
}

impl OptionBurnCallback for Payer {
    fn option_burn_callback(
        &mut self,
        _option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &OptionBurnCallbackParam,
    ) -> Result<Bytes, OptionError> {
        Ok(param.data.clone())
    }
}

impl OptionCollectCallback for Payer {
    fn option_collect_callback(
        &mut self,
        _option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &OptionCollectCallbackParam,
    ) -> Result<Bytes, OptionError> {
        Ok(param.data.clone())
    }
}

impl PoolMintChoiceCallback for Payer {
    fn pool_mint_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        self.split.pay_in(param)
    }
}

impl PoolMintCallback for Payer {
    fn pool_mint_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &PoolMintCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.pay_positions(
            pool,
            option,
            param.key,
            [param.long0_amount, param.long1_amount, param.short_amount],
        )?;
        Ok(param.data.clone())
    }
}

impl PoolBurnChoiceCallback for Payer {
    fn pool_burn_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        self.split.take_out(param)
    }
}

impl PoolLeverageChoiceCallback for Payer {
    fn pool_leverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError> {
        self.split.take_out(param)
    }
}

impl PoolLeverageCallback for Payer {
    fn pool_leverage_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &PoolTradeCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.pay_positions(
            pool,
            option,
            param.key,
            [U256::ZERO, U256::ZERO, param.short_amount],
        )?;
        Ok(param.data.clone())
    }
}

impl PoolDeleverageChoiceCallback for Payer {
    fn pool_deleverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError> {
        self.split.pay_in(param)
    }
}

impl PoolDeleverageCallback for Payer {
    fn pool_deleverage_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &PoolTradeCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.pay_positions(
            pool,
            option,
            param.key,
            [param.long0_amount, param.long1_amount, U256::ZERO],
        )?;
        Ok(param.data.clone())
    }
}

impl PoolRebalanceCallback for Payer {
    fn pool_rebalance_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &PoolRebalanceCallbackParam,
    ) -> Result<Bytes, PoolError> {
        let amounts = if param.is_long0_to_long1 {
            [param.long0_amount, U256::ZERO, U256::ZERO]
        } else {
            [U256::ZERO, param.long1_amount, U256::ZERO]
        };
        self.pay_positions(pool, option, param.key, amounts)?;
        Ok(param.data.clone())
    }
}

impl PoolAddFeesCallback for Payer {
    fn pool_add_fees_callback(
        &mut self,
        pool: &mut Pool,
        option: &mut OptionLedger,
        _tokens: &mut TokenBook,
        param: &PoolAddFeesCallbackParam,
    ) -> Result<Bytes, PoolError> {
        self.pay_positions(
            pool,
            option,
            param.key,
            [param.long0_fees, param.long1_fees, param.short_fees],
        )?;
        Ok(param.data.clone())
    }
}
