use alloc::collections::BTreeMap;
use alloy_primitives::{aliases::U160, Address, U256};
use math::num::add;
use math::safe_cast::{to_u160, widen};
use math::MathError;
use options::OptionKey;

use crate::curve::short_returned_growth;
use crate::fee::{growth, split};
use crate::position::{Growth, LiquidityPosition};

/// Fee rates a pool engine applies to every market it initializes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolConfig {
    /// UQ0.16 rate charged on leverage, deleverage and rebalance.
    pub transaction_fee: u16,
    /// UQ0.16 share of every charged fee kept by the protocol.
    pub protocol_fee: u16,
}

/// Which option position a fee is paid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FeeAsset {
    Long0,
    Long1,
    Short,
}

/// State of the pool for one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub(crate) liquidity: U160,
    pub(crate) sqrt_interest_rate: U160,
    /// Last time short returned accrued, never past maturity.
    pub(crate) last_timestamp: U256,
    pub(crate) long0_balance: U256,
    pub(crate) long1_balance: U256,
    pub(crate) growth: Growth,
    pub(crate) long0_protocol_fees: U256,
    pub(crate) long1_protocol_fees: U256,
    pub(crate) short_protocol_fees: U256,
    pub(crate) config: PoolConfig,
    pub(crate) positions: BTreeMap<Address, LiquidityPosition>,
}

impl PoolState {
    pub(crate) fn new(sqrt_interest_rate: U160, block_timestamp: u64, config: PoolConfig) -> Self {
        Self {
            liquidity: U160::ZERO,
            sqrt_interest_rate,
            last_timestamp: U256::from(block_timestamp),
            long0_balance: U256::ZERO,
            long1_balance: U256::ZERO,
            growth: Growth::default(),
            long0_protocol_fees: U256::ZERO,
            long1_protocol_fees: U256::ZERO,
            short_protocol_fees: U256::ZERO,
            config,
            positions: BTreeMap::new(),
        }
    }

    pub(crate) fn liquidity(&self) -> U256 {
        widen(self.liquidity)
    }

    pub(crate) fn rate(&self) -> U256 {
        widen(self.sqrt_interest_rate)
    }

    /// Accumulators as they will be once accrued up to `block_timestamp`.
    pub(crate) fn growth_at(&self, key: &OptionKey, block_timestamp: u64) -> Result<Growth, MathError> {
        let now = U256::from(block_timestamp).min(key.maturity);
        let mut growth = self.growth;
        if now > self.last_timestamp {
            growth.short_returned = add(
                growth.short_returned,
                short_returned_growth(self.rate(), now - self.last_timestamp)?,
            )?;
        }
        Ok(growth)
    }

    /// Gives liquidity providers the short that decayed since the last call.
    pub(crate) fn accrue(&mut self, key: &OptionKey, block_timestamp: u64) -> Result<(), MathError> {
        self.growth = self.growth_at(key, block_timestamp)?;
        self.last_timestamp = self
            .last_timestamp
            .max(U256::from(block_timestamp).min(key.maturity));
        Ok(())
    }

    pub(crate) fn set_rate(&mut self, rate: U256) -> Result<(), MathError> {
        self.sqrt_interest_rate = to_u160(rate)?;
        Ok(())
    }

    /// Charges `fee` in `asset`: the protocol's share is set aside and the
    /// rest grows every provider's claim.
    ///
    /// Returns the protocol's share.
    pub(crate) fn charge(&mut self, asset: FeeAsset, fee: U256) -> Result<U256, MathError> {
        if fee.is_zero() {
            return Ok(U256::ZERO);
        }

        let (lp, protocol) = split(fee, self.config.protocol_fee)?;
        let per_unit = growth(lp, self.liquidity())?;

        match asset {
            FeeAsset::Long0 => {
                self.growth.long0_fee = add(self.growth.long0_fee, per_unit)?;
                self.long0_protocol_fees = add(self.long0_protocol_fees, protocol)?;
            }
            FeeAsset::Long1 => {
                self.growth.long1_fee = add(self.growth.long1_fee, per_unit)?;
                self.long1_protocol_fees = add(self.long1_protocol_fees, protocol)?;
            }
            FeeAsset::Short => {
                self.growth.short_fee = add(self.growth.short_fee, per_unit)?;
                self.short_protocol_fees = add(self.short_protocol_fees, protocol)?;
            }
        }

        Ok(protocol)
    }

    /// Shares a donation among providers without a protocol cut.
    pub(crate) fn donate(&mut self, asset: FeeAsset, amount: U256) -> Result<(), MathError> {
        if amount.is_zero() {
            return Ok(());
        }

        let per_unit = growth(amount, self.liquidity())?;
        let accumulator = match asset {
            FeeAsset::Long0 => &mut self.growth.long0_fee,
            FeeAsset::Long1 => &mut self.growth.long1_fee,
            FeeAsset::Short => &mut self.growth.short_fee,
        };
        *accumulator = add(*accumulator, per_unit)?;
        Ok(())
    }

    /// Settles `owner`'s earnings and returns the position for modification.
    pub(crate) fn settled_position(
        &mut self,
        owner: Address,
    ) -> Result<&mut LiquidityPosition, MathError> {
        let growth = self.growth;
        let position = self.positions.entry(owner).or_default();
        position.update(&growth)?;
        Ok(position)
    }

    /// `owner`'s position as it would be after settling at `growth`, without
    /// changing state.
    pub(crate) fn projected_position(
        &self,
        owner: Address,
        growth: &Growth,
    ) -> Result<LiquidityPosition, MathError> {
        self.positions.get(&owner).map_or_else(
            || Ok(LiquidityPosition::default()),
            |position| position.projected(growth),
        )
    }

    pub(crate) fn prune(&mut self, owner: Address) {
        if self
            .positions
            .get(&owner)
            .is_some_and(LiquidityPosition::is_empty)
        {
            self.positions.remove(&owner);
        }
    }
}
