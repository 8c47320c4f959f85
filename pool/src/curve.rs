//! The constant-product curve between long and short.
//!
//! With liquidity `L`, square-root interest rate `r` (Q64.96) and `d` seconds
//! to maturity the pool prices
//!
//! ```text
//! long  = L * 2^96 / r
//! short = L * r * d / 2^96
//! ```
//!
//! so `long * short = L^2 * d` stays constant while `r` moves. Leverage
//! (short in, long out) raises `r`; deleverage (long in, short out) lowers it.
//! Long is measured in base units of the strike.

use alloy_primitives::U256;
use math::full_math::mul_div;
use math::num::sub;
use math::MathError;

/// `2^96`, the unit of the square-root interest rate.
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// `2^128`, the unit of every per-liquidity growth accumulator.
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

/// Long held by `liquidity` at `rate`.
///
/// # Errors
/// - `DivideByZero`: If `rate` is zero
pub fn long_of(liquidity: U256, rate: U256, round_up: bool) -> Result<U256, MathError> {
    mul_div(liquidity, Q96, rate, round_up)
}

/// Short held by `liquidity` at `rate` with `duration` seconds left.
///
/// # Errors
/// - `MulDivOverflow`: If the result does not fit in 256 bits
pub fn short_of(
    liquidity: U256,
    rate: U256,
    duration: U256,
    round_up: bool,
) -> Result<U256, MathError> {
    mul_div(liquidity, rate_times_duration(rate, duration), Q96, round_up)
}

/// Liquidity backed by `long` at `rate`.
///
/// # Errors
/// - `MulDivOverflow`: If the result does not fit in 256 bits
pub fn liquidity_given_long(long: U256, rate: U256, round_up: bool) -> Result<U256, MathError> {
    mul_div(long, rate, Q96, round_up)
}

/// Liquidity backed by `short` at `rate` with `duration` seconds left.
///
/// # Errors
/// - `DivideByZero`: If the market has matured
pub fn liquidity_given_short(
    short: U256,
    rate: U256,
    duration: U256,
    round_up: bool,
) -> Result<U256, MathError> {
    mul_div(short, Q96, rate_times_duration(rate, duration), round_up)
}

/// Rate change caused by moving `short` through `liquidity`.
///
/// # Errors
/// - `DivideByZero`: If `liquidity` or `duration` is zero
pub fn delta_rate_given_short(
    short: U256,
    liquidity: U256,
    duration: U256,
    round_up: bool,
) -> Result<U256, MathError> {
    // liquidity < 2^160 and duration < 2^96
    mul_div(short, Q96, liquidity * duration, round_up)
}

/// Rate at which `liquidity` holds exactly `long`.
///
/// # Errors
/// - `DivideByZero`: If `long` is zero
pub fn rate_given_long(liquidity: U256, long: U256, round_up: bool) -> Result<U256, MathError> {
    mul_div(liquidity, Q96, long, round_up)
}

/// Long released when the rate rises from `rate` to `next`, rounded so the
/// curve keeps at least what it owes.
///
/// # Errors
/// Propagates [`long_of`] errors.
pub fn long_released(liquidity: U256, rate: U256, next: U256) -> Result<U256, MathError> {
    Ok(long_of(liquidity, rate, false)?.saturating_sub(long_of(liquidity, next, true)?))
}

/// Long required when the rate falls from `rate` to `next`.
///
/// # Errors
/// - `SubUnderflow`: If `next` is above `rate`
pub fn long_required(liquidity: U256, rate: U256, next: U256) -> Result<U256, MathError> {
    sub(long_of(liquidity, next, true)?, long_of(liquidity, rate, false)?)
}

/// Short required when the rate rises from `rate` to `next`.
///
/// # Errors
/// - `SubUnderflow`: If `next` is below `rate`
pub fn short_required(
    liquidity: U256,
    rate: U256,
    next: U256,
    duration: U256,
) -> Result<U256, MathError> {
    sub(
        short_of(liquidity, next, duration, true)?,
        short_of(liquidity, rate, duration, false)?,
    )
}

/// Short released when the rate falls from `rate` to `next`.
///
/// # Errors
/// Propagates [`short_of`] errors.
pub fn short_released(
    liquidity: U256,
    rate: U256,
    next: U256,
    duration: U256,
) -> Result<U256, MathError> {
    Ok(short_of(liquidity, rate, duration, false)?
        .saturating_sub(short_of(liquidity, next, duration, true)?))
}

/// Short given back to liquidity providers per unit of liquidity (Q128) as
/// `elapsed` seconds pass at `rate`.
///
/// # Errors
/// - `MulDivOverflow`: If the growth does not fit in 256 bits
pub fn short_returned_growth(rate: U256, elapsed: U256) -> Result<U256, MathError> {
    mul_div(rate_times_duration(rate, elapsed), Q128, Q96, false)
}

/// `rate < 2^160` and `duration < 2^96`, so the product fits in 256 bits.
fn rate_times_duration(rate: U256, duration: U256) -> U256 {
    rate * duration
}
