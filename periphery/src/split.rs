use alloy_primitives::U256;
use math::full_math::mul_div;
use math::num::{add, sub};
use math::strike::{combine, turn};
use pool::callback::{
    LongChoice, LongChoiceParam, PoolBurnChoiceCallback, PoolDeleverageChoiceCallback,
    PoolLeverageChoiceCallback, PoolMintChoiceCallback,
};
use pool::PoolError;

/// How a long amount (base units) is split between Long0 and Long1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LongSplit {
    /// All in Long0, falling back to Long1 when the pool runs out.
    #[default]
    Long0,
    /// All in Long1, falling back to Long0 when the pool runs out.
    Long1,
    /// In proportion to what the pool holds of each.
    Proportional,
}

impl LongSplit {
    /// Base amount to be covered by Long0.
    fn long0_share(self, param: &LongChoiceParam) -> Result<U256, PoolError> {
        match self {
            Self::Long0 => Ok(param.long_amount),
            Self::Long1 => Ok(U256::ZERO),
            Self::Proportional => {
                let strike = param.key.strike;
                let value0 = combine(param.long0_balance, U256::ZERO, strike, false)?;
                let value1 = combine(U256::ZERO, param.long1_balance, strike, false)?;
                let total = add(value0, value1)?;
                if total.is_zero() {
                    return Ok(param.long_amount);
                }
                Ok(mul_div(param.long_amount, value0, total, false)?)
            }
        }
    }

    /// A split worth at least `long_amount`, for a caller paying the pool.
    ///
    /// # Errors
    /// Propagates conversion errors.
    pub fn pay_in(self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        let strike = param.key.strike;
        let share0 = self.long0_share(param)?;

        Ok(LongChoice {
            long0_amount: turn(share0, strike, false, true)?,
            long1_amount: turn(param.long_amount - share0, strike, true, true)?,
            data: param.data.clone(),
        })
    }

    /// A split worth at most `long_amount` that the pool can release.
    ///
    /// # Errors
    /// Propagates conversion errors.
    pub fn take_out(self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        let strike = param.key.strike;
        let long = param.long_amount;

        let mut long0 = turn(self.long0_share(param)?, strike, false, false)?
            .min(param.long0_balance);
        let rest = sub(long, combine(long0, U256::ZERO, strike, true)?)?;
        let long1 = turn(rest, strike, true, false)?.min(param.long1_balance);

        let rest = long.saturating_sub(combine(long0, long1, strike, true)?);
        if !rest.is_zero() {
            let more = turn(rest, strike, false, false)?;
            long0 += more.min(param.long0_balance - long0);
        }

        Ok(LongChoice {
            long0_amount: long0,
            long1_amount: long1,
            data: param.data.clone(),
        })
    }
}

impl PoolMintChoiceCallback for LongSplit {
    fn pool_mint_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        self.pay_in(param)
    }
}

impl PoolDeleverageChoiceCallback for LongSplit {
    fn pool_deleverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError> {
        self.pay_in(param)
    }
}

impl PoolBurnChoiceCallback for LongSplit {
    fn pool_burn_choice_callback(&mut self, param: &LongChoiceParam) -> Result<LongChoice, PoolError> {
        self.take_out(param)
    }
}

impl PoolLeverageChoiceCallback for LongSplit {
    fn pool_leverage_choice_callback(
        &mut self,
        param: &LongChoiceParam,
    ) -> Result<LongChoice, PoolError> {
        self.take_out(param)
    }
}
