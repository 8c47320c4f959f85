//! Transaction and protocol fees.
//!
//! Rates are UQ0.16 numbers stored as `u16` over [`FEE_BASE`], so a rate can
//! never reach 100%.

use alloy_primitives::U256;
use math::full_math::mul_div;
use math::MathError;

use crate::curve::Q128;

/// `2^16`.
pub const FEE_BASE: U256 = U256::from_limbs([1 << 16, 0, 0, 0]);

/// Fee taken out of a gross `amount`, rounded up.
///
/// # Errors
/// Never fails for in-range input; propagates `mul_div` errors.
pub fn removal(amount: U256, rate: u16) -> Result<U256, MathError> {
    mul_div(amount, U256::from(rate), FEE_BASE, true)
}

/// Fee charged on top of a net `amount` so that `removal(net + fee) == fee`
/// up to rounding, rounded up.
///
/// # Errors
/// Propagates `mul_div` errors.
pub fn additional(amount: U256, rate: u16) -> Result<U256, MathError> {
    mul_div(
        amount,
        U256::from(rate),
        FEE_BASE - U256::from(rate),
        true,
    )
}

/// Splits a charged fee into the liquidity providers' and the protocol's share.
///
/// # Errors
/// Propagates `mul_div` errors.
pub fn split(fee: U256, protocol_rate: u16) -> Result<(U256, U256), MathError> {
    let protocol = mul_div(fee, U256::from(protocol_rate), FEE_BASE, false)?;
    Ok((fee - protocol, protocol))
}

/// Growth per unit of liquidity (Q128) when `amount` is shared by `liquidity`.
///
/// # Errors
/// - `DivideByZero`: If `liquidity` is zero
pub fn growth(amount: U256, liquidity: U256) -> Result<U256, MathError> {
    mul_div(amount, Q128, liquidity, false)
}

/// Amount earned by `liquidity` since the accumulator moved by `growth_delta`.
///
/// # Errors
/// Propagates `mul_div` errors.
pub fn earned(liquidity: U256, growth_delta: U256) -> Result<U256, MathError> {
    mul_div(liquidity, growth_delta, Q128, false)
}
