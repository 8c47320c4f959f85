//! 512-bit arithmetic on `(lo, hi)` pairs of 256-bit words.
//!
//! A 512-bit value `x` is represented as `x = lo + hi * 2^256`. The pairs are
//! widened into [`U512`] for the actual computation, which keeps every
//! operation exact.

use alloy_primitives::{aliases::U512, U256};

use crate::error::{
    AddOverflow, DivideByZero, DivideOverflow, MathError, MulDivOverflow, SqrtOverflow,
    SubUnderflow,
};

/// Upper bound on Newton iterations for a 512-bit square root. Starting from
/// a power-of-two overestimate the iteration converges in well under this.
const MAX_NEWTON_ITERATIONS: usize = 256;

pub(crate) fn join(lo: U256, hi: U256) -> U512 {
    let lo = lo.as_limbs();
    let hi = hi.as_limbs();
    U512::from_limbs([lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]])
}

pub(crate) fn split(value: U512) -> (U256, U256) {
    let limbs = value.as_limbs();
    (
        U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]),
        U256::from_limbs([limbs[4], limbs[5], limbs[6], limbs[7]]),
    )
}

/// Exact product of two 256-bit values.
///
/// # Returns
/// `(lo, hi)` such that `a * b = lo + hi * 2^256`
#[must_use]
pub fn mul512(multiplicand: U256, multiplier: U256) -> (U256, U256) {
    let product = join(multiplicand, U256::ZERO).wrapping_mul(join(multiplier, U256::ZERO));
    split(product)
}

/// Adds two 512-bit values.
///
/// # Errors
/// - `AddOverflow`: If the sum does not fit in 512 bits
pub fn add512(
    augend0: U256,
    augend1: U256,
    addend0: U256,
    addend1: U256,
) -> Result<(U256, U256), MathError> {
    join(augend0, augend1)
        .checked_add(join(addend0, addend1))
        .map(split)
        .ok_or(MathError::AddOverflow(AddOverflow {
            augend0,
            augend1,
            addend0,
            addend1,
        }))
}

/// Subtracts a 512-bit value from another.
///
/// # Errors
/// - `SubUnderflow`: If the subtrahend is larger than the minuend
pub fn sub512(
    minuend0: U256,
    minuend1: U256,
    subtrahend0: U256,
    subtrahend1: U256,
) -> Result<(U256, U256), MathError> {
    join(minuend0, minuend1)
        .checked_sub(join(subtrahend0, subtrahend1))
        .map(split)
        .ok_or(MathError::SubUnderflow(SubUnderflow {
            minuend0,
            minuend1,
            subtrahend0,
            subtrahend1,
        }))
}

/// Divides a 512-bit dividend by a 256-bit divisor.
///
/// # Parameters
/// - `dividend0`, `dividend1`: Low and high words of the dividend
/// - `divisor`: Divisor, must be nonzero
/// - `round_up`: Round the quotient up when the division is inexact
///
/// # Errors
/// - `DivideByZero`: If `divisor` is zero
/// - `DivideOverflow`: If the (rounded) quotient does not fit in 256 bits
pub fn div512_to_256(
    dividend0: U256,
    dividend1: U256,
    divisor: U256,
    round_up: bool,
) -> Result<U256, MathError> {
    if divisor.is_zero() {
        return Err(MathError::DivideByZero(DivideByZero {}));
    }

    let (quotient, remainder) = join(dividend0, dividend1).div_rem(join(divisor, U256::ZERO));
    let quotient = if round_up && !remainder.is_zero() {
        quotient + U512::from(1u8)
    } else {
        quotient
    };

    let (lo, hi) = split(quotient);
    if !hi.is_zero() {
        return Err(MathError::DivideOverflow(DivideOverflow {
            dividend0,
            dividend1,
            divisor,
        }));
    }

    Ok(lo)
}

/// Computes `multiplicand * multiplier / divisor` with a 512-bit intermediate.
///
/// # Errors
/// - `DivideByZero`: If `divisor` is zero
/// - `MulDivOverflow`: If the result does not fit in 256 bits
pub fn mul_div(
    multiplicand: U256,
    multiplier: U256,
    divisor: U256,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lo, hi) = mul512(multiplicand, multiplier);

    div512_to_256(lo, hi, divisor, round_up).map_err(|error| match error {
        MathError::DivideOverflow(_) => MathError::MulDivOverflow(MulDivOverflow {
            multiplicand,
            multiplier,
            divisor,
        }),
        other => other,
    })
}

/// Floor square root by Newton–Raphson, starting above the root.
pub(crate) fn floor_sqrt(value: U512) -> U512 {
    if value.is_zero() {
        return U512::ZERO;
    }

    let mut estimate = U512::from(1u8) << value.bit_len().div_ceil(2);
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let next = (estimate + value / estimate) >> 1usize;
        if next >= estimate {
            break;
        }
        estimate = next;
    }

    estimate
}

/// Square root of a 512-bit value.
///
/// Rounds up iff `round_up` is set and the value is not a perfect square.
///
/// # Errors
/// - `SqrtOverflow`: If the rounded-up root is `2^256`
pub fn sqrt512(value0: U256, value1: U256, round_up: bool) -> Result<U256, MathError> {
    let value = join(value0, value1);
    let root = floor_sqrt(value);
    let (root, _) = split(root);

    if round_up && join(root, U256::ZERO).wrapping_mul(join(root, U256::ZERO)) < value {
        return root
            .checked_add(U256::from(1u8))
            .ok_or(MathError::SqrtOverflow(SqrtOverflow { value0, value1 }));
    }

    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul512_max_squared() {
        let (lo, hi) = mul512(U256::MAX, U256::MAX);
        // (2^256 - 1)^2 = 2^512 - 2^257 + 1
        assert_eq!(lo, U256::from(1));
        assert_eq!(hi, U256::MAX - U256::from(1));
    }

    #[test]
    fn test_add512_carries_into_high_word() {
        let (lo, hi) = add512(U256::MAX, U256::ZERO, U256::from(1), U256::ZERO).unwrap();
        assert_eq!(lo, U256::ZERO);
        assert_eq!(hi, U256::from(1));
    }

    #[test]
    fn test_add512_overflow() {
        let result = add512(U256::MAX, U256::MAX, U256::from(1), U256::ZERO);
        assert!(matches!(result, Err(MathError::AddOverflow(_))));
    }

    #[test]
    fn test_sub512_borrows_from_high_word() {
        let (lo, hi) = sub512(U256::ZERO, U256::from(1), U256::from(1), U256::ZERO).unwrap();
        assert_eq!(lo, U256::MAX);
        assert_eq!(hi, U256::ZERO);
    }

    #[test]
    fn test_sub512_underflow() {
        let result = sub512(U256::from(5), U256::ZERO, U256::from(6), U256::ZERO);
        assert!(matches!(result, Err(MathError::SubUnderflow(_))));
    }

    #[test]
    fn test_div512_to_256_rounding() {
        let down = div512_to_256(U256::from(10), U256::ZERO, U256::from(3), false).unwrap();
        let up = div512_to_256(U256::from(10), U256::ZERO, U256::from(3), true).unwrap();
        assert_eq!(down, U256::from(3));
        assert_eq!(up, U256::from(4));

        let exact = div512_to_256(U256::from(9), U256::ZERO, U256::from(3), true).unwrap();
        assert_eq!(exact, U256::from(3));
    }

    #[test]
    fn test_div512_to_256_divide_by_zero() {
        let result = div512_to_256(U256::from(1), U256::ZERO, U256::ZERO, false);
        assert!(matches!(result, Err(MathError::DivideByZero(_))));
    }

    #[test]
    fn test_div512_to_256_overflow() {
        let result = div512_to_256(U256::ZERO, U256::from(1), U256::from(1), false);
        assert!(matches!(result, Err(MathError::DivideOverflow(_))));
    }

    #[test]
    fn test_div512_to_256_round_up_overflow_at_boundary() {
        // (2^512 - 1) / 2^256 floors to 2^256 - 1 but rounds up to 2^256.
        let divisor = U256::MAX;
        let down = div512_to_256(U256::MAX, U256::MAX - U256::from(1), divisor, false).unwrap();
        assert_eq!(down, U256::MAX);

        let up = div512_to_256(U256::MAX, U256::MAX - U256::from(1), divisor, true);
        assert!(matches!(up, Err(MathError::DivideOverflow(_))));
    }

    #[test]
    fn test_mul_div_full_precision() {
        // 2^255 * 4 / 8 = 2^254, the intermediate needs 257 bits.
        let a = U256::from(1) << 255;
        let result = mul_div(a, U256::from(4), U256::from(8), false).unwrap();
        assert_eq!(result, U256::from(1) << 254);
    }

    #[test]
    fn test_mul_div_overflow() {
        let result = mul_div(U256::MAX, U256::from(2), U256::from(1), false);
        assert!(matches!(result, Err(MathError::MulDivOverflow(_))));
    }

    #[test]
    fn test_mul_div_zero_divisor() {
        let result = mul_div(U256::from(1), U256::from(1), U256::ZERO, true);
        assert!(matches!(result, Err(MathError::DivideByZero(_))));
    }

    #[test]
    fn test_sqrt512_perfect_square() {
        let (lo, hi) = mul512(U256::MAX, U256::MAX);
        assert_eq!(sqrt512(lo, hi, false).unwrap(), U256::MAX);
        assert_eq!(sqrt512(lo, hi, true).unwrap(), U256::MAX);
    }

    #[test]
    fn test_sqrt512_rounds_up_non_square() {
        assert_eq!(sqrt512(U256::from(10), U256::ZERO, false).unwrap(), U256::from(3));
        assert_eq!(sqrt512(U256::from(10), U256::ZERO, true).unwrap(), U256::from(4));
    }

    #[test]
    fn test_sqrt512_overflow_when_rounding_past_256_bits() {
        let result = sqrt512(U256::MAX, U256::MAX, true);
        assert!(matches!(result, Err(MathError::SqrtOverflow(_))));
        assert_eq!(sqrt512(U256::MAX, U256::MAX, false).unwrap(), U256::MAX);
    }

    #[test]
    fn test_sqrt512_zero() {
        assert_eq!(sqrt512(U256::ZERO, U256::ZERO, true).unwrap(), U256::ZERO);
    }
}
