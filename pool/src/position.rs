use alloy_primitives::{aliases::U160, U256};
use math::num::{add, sub};
use math::safe_cast::widen;
use math::MathError;

use crate::fee::earned;

/// Global per-liquidity accumulators of one pool, all Q128.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Growth {
    pub long0_fee: U256,
    pub long1_fee: U256,
    pub short_fee: U256,
    pub short_returned: U256,
}

/// A liquidity provider's stake in one pool.
///
/// Earnings are settled lazily: every time the liquidity changes, what the
/// current liquidity earned since the last snapshot is added to the owed
/// amounts and the snapshot moves to the current growth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiquidityPosition {
    pub liquidity: U160,
    pub growth_last: Growth,
    pub long0_fees: U256,
    pub long1_fees: U256,
    pub short_fees: U256,
    pub short_returned: U256,
}

impl LiquidityPosition {
    /// Settles everything earned up to `growth` into the owed amounts.
    ///
    /// # Errors
    /// - `SubUnderflow`: If `growth` is behind the last snapshot
    /// - `AddOverflow`: If an owed amount overflows
    pub fn update(&mut self, growth: &Growth) -> Result<(), MathError> {
        let liquidity = widen(self.liquidity);

        self.long0_fees = add(
            self.long0_fees,
            earned(liquidity, sub(growth.long0_fee, self.growth_last.long0_fee)?)?,
        )?;
        self.long1_fees = add(
            self.long1_fees,
            earned(liquidity, sub(growth.long1_fee, self.growth_last.long1_fee)?)?,
        )?;
        self.short_fees = add(
            self.short_fees,
            earned(liquidity, sub(growth.short_fee, self.growth_last.short_fee)?)?,
        )?;
        self.short_returned = add(
            self.short_returned,
            earned(
                liquidity,
                sub(growth.short_returned, self.growth_last.short_returned)?,
            )?,
        )?;
        self.growth_last = *growth;

        Ok(())
    }

    /// What the position would be owed if settled at `growth`, without
    /// mutating it.
    ///
    /// # Errors
    /// Same as [`Self::update`].
    pub fn projected(&self, growth: &Growth) -> Result<Self, MathError> {
        let mut position = *self;
        position.update(growth)?;
        Ok(position)
    }

    /// Takes up to the requested amounts out of the owed fees.
    ///
    /// Returns `(long0_fees, long1_fees, short_fees, short_returned)` paid.
    pub fn take_owed(
        &mut self,
        long0_requested: U256,
        long1_requested: U256,
        short_requested: U256,
        short_returned_requested: U256,
    ) -> (U256, U256, U256, U256) {
        let long0 = self.long0_fees.min(long0_requested);
        let long1 = self.long1_fees.min(long1_requested);
        let short = self.short_fees.min(short_requested);
        let returned = self.short_returned.min(short_returned_requested);

        self.long0_fees -= long0;
        self.long1_fees -= long1;
        self.short_fees -= short;
        self.short_returned -= returned;

        (long0, long1, short, returned)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.liquidity.is_zero()
            && self.long0_fees.is_zero()
            && self.long1_fees.is_zero()
            && self.short_fees.is_zero()
            && self.short_returned.is_zero()
    }
}
