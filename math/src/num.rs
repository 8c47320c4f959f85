use alloy_primitives::U256;

use crate::error::{AddOverflow, DivideByZero, MathError, SubUnderflow};
use crate::full_math::{floor_sqrt, join, split};

/// Addition reporting overflow as a [`MathError`].
///
/// # Errors
/// - `AddOverflow`: If the sum does not fit in 256 bits
pub fn add(augend: U256, addend: U256) -> Result<U256, MathError> {
    augend
        .checked_add(addend)
        .ok_or(MathError::AddOverflow(AddOverflow {
            augend0: augend,
            augend1: U256::ZERO,
            addend0: addend,
            addend1: U256::ZERO,
        }))
}

/// Subtraction reporting underflow as a [`MathError`].
///
/// # Errors
/// - `SubUnderflow`: If `subtrahend` exceeds `minuend`
pub fn sub(minuend: U256, subtrahend: U256) -> Result<U256, MathError> {
    minuend
        .checked_sub(subtrahend)
        .ok_or(MathError::SubUnderflow(SubUnderflow {
            minuend0: minuend,
            minuend1: U256::ZERO,
            subtrahend0: subtrahend,
            subtrahend1: U256::ZERO,
        }))
}

/// Division rounding up.
///
/// # Errors
/// - `DivideByZero`: If `divisor` is zero
pub fn div_up(dividend: U256, divisor: U256) -> Result<U256, MathError> {
    if divisor.is_zero() {
        return Err(MathError::DivideByZero(DivideByZero {}));
    }

    let (quotient, remainder) = dividend.div_rem(divisor);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        // quotient < U256::MAX whenever the division is inexact
        Ok(quotient + U256::from(1u8))
    }
}

/// Square root of a 256-bit value, rounded up iff `round_up` is set and the
/// value is not a perfect square. Never fails: the result is at most `2^128`.
#[must_use]
pub fn sqrt(value: U256, round_up: bool) -> U256 {
    let (root, _) = split(floor_sqrt(join(value, U256::ZERO)));

    if round_up && root * root < value {
        root + U256::from(1u8)
    } else {
        root
    }
}

#[must_use]
pub fn min(a: U256, b: U256) -> U256 {
    if a < b {
        a
    } else {
        b
    }
}

#[must_use]
pub fn max(a: U256, b: U256) -> U256 {
    if a > b {
        a
    } else {
        b
    }
}

/// Absolute difference.
#[must_use]
pub fn diff(a: U256, b: U256) -> U256 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sub_report_bounds() {
        assert_eq!(add(U256::from(2), U256::from(3)).unwrap(), U256::from(5));
        assert_eq!(sub(U256::from(5), U256::from(3)).unwrap(), U256::from(2));
        assert!(matches!(
            add(U256::MAX, U256::from(1)),
            Err(MathError::AddOverflow(_))
        ));
        assert!(matches!(
            sub(U256::from(1), U256::from(2)),
            Err(MathError::SubUnderflow(_))
        ));
    }

    #[test]
    fn test_div_up() {
        assert_eq!(div_up(U256::from(7), U256::from(2)).unwrap(), U256::from(4));
        assert_eq!(div_up(U256::from(8), U256::from(2)).unwrap(), U256::from(4));
        assert_eq!(div_up(U256::ZERO, U256::from(2)).unwrap(), U256::ZERO);
        assert_eq!(div_up(U256::MAX, U256::from(2)).unwrap(), U256::from(1) << 255);
    }

    #[test]
    fn test_div_up_by_zero() {
        assert!(matches!(
            div_up(U256::from(1), U256::ZERO),
            Err(MathError::DivideByZero(_))
        ));
    }

    #[test]
    fn test_sqrt_max_rounds_up_to_2_pow_128() {
        assert_eq!(sqrt(U256::MAX, false), U256::from(u128::MAX));
        assert_eq!(sqrt(U256::MAX, true), U256::from(1) << 128);
    }

    #[test]
    fn test_sqrt_small_values() {
        assert_eq!(sqrt(U256::ZERO, true), U256::ZERO);
        assert_eq!(sqrt(U256::from(1), false), U256::from(1));
        assert_eq!(sqrt(U256::from(15), false), U256::from(3));
        assert_eq!(sqrt(U256::from(15), true), U256::from(4));
        assert_eq!(sqrt(U256::from(16), true), U256::from(4));
    }

    #[test]
    fn test_min_max_diff() {
        let a = U256::from(3);
        let b = U256::from(10);
        assert_eq!(min(a, b), a);
        assert_eq!(max(a, b), b);
        assert_eq!(diff(a, b), U256::from(7));
        assert_eq!(diff(b, a), U256::from(7));
    }
}
