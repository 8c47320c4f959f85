//! Conversions between token0, token1 and the base denomination of a strike.
//!
//! A strike is the price of token0 in token1 as a UQ128.128 fixed-point
//! number. Short positions are denominated in the "base" token: token0 when
//! the strike is above `2^128` (one token0 is worth more than one token1),
//! token1 otherwise.
//!
//! Every function takes the rounding direction explicitly; the call site
//! decides which side keeps the dust.

use alloy_primitives::U256;

use crate::error::MathError;
use crate::full_math::mul_div;
use crate::num::{add, sub};

/// `2^128`, the strike of a one-to-one market.
pub const STRIKE_ONE: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Returns `true` when short positions are denominated in token0.
#[must_use]
pub fn base_is_token0(strike: U256) -> bool {
    strike > STRIKE_ONE
}

/// Converts an amount of token0 into token1 (`zero_to_one`) or back.
///
/// # Errors
/// - `DivideByZero`: If converting token1 into token0 with a zero strike
/// - `MulDivOverflow`: If the converted amount does not fit in 256 bits
pub fn convert(
    amount: U256,
    strike: U256,
    zero_to_one: bool,
    round_up: bool,
) -> Result<U256, MathError> {
    if zero_to_one {
        mul_div(amount, strike, STRIKE_ONE, round_up)
    } else {
        mul_div(amount, STRIKE_ONE, strike, round_up)
    }
}

/// Expresses a base-denominated amount in token1 (`to_one`) or token0.
///
/// # Errors
/// Propagates [`convert`] errors.
pub fn turn(amount: U256, strike: U256, to_one: bool, round_up: bool) -> Result<U256, MathError> {
    match (base_is_token0(strike), to_one) {
        (true, true) => convert(amount, strike, true, round_up),
        (false, false) => convert(amount, strike, false, round_up),
        _ => Ok(amount),
    }
}

/// Folds a token0 amount and a token1 amount into one base-denominated total.
///
/// # Errors
/// - `AddOverflow`: If the total does not fit in 256 bits
/// - Propagates [`convert`] errors
pub fn combine(
    amount0: U256,
    amount1: U256,
    strike: U256,
    round_up: bool,
) -> Result<U256, MathError> {
    let (base, other) = if base_is_token0(strike) {
        (amount0, convert(amount1, strike, false, round_up)?)
    } else {
        (amount1, convert(amount0, strike, true, round_up)?)
    };

    add(base, other)
}

/// Recovers the other side of a combined base total.
///
/// With `zero_to_one`, `amount` is in token0 and the token1 amount is
/// returned, such that `combine(amount, result) == base` up to rounding;
/// otherwise `amount` is in token1 and the token0 amount is returned.
///
/// # Errors
/// - `SubUnderflow`: If `amount` alone is worth more than `base`
/// - Propagates [`convert`] errors
pub fn dif(
    base: U256,
    amount: U256,
    strike: U256,
    zero_to_one: bool,
    round_up: bool,
) -> Result<U256, MathError> {
    if base_is_token0(strike) {
        if zero_to_one {
            convert(sub(base, amount)?, strike, true, round_up)
        } else {
            sub(base, convert(amount, strike, false, !round_up)?)
        }
    } else if zero_to_one {
        sub(base, convert(amount, strike, true, !round_up)?)
    } else {
        convert(sub(base, amount)?, strike, false, round_up)
    }
}
