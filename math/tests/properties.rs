use alloy_primitives::{aliases::U512, Uint, U256};
use math::full_math::{div512_to_256, mul512, mul_div, sqrt512};
use math::num::sqrt;
use math::strike::{convert, STRIKE_ONE};
use math::MathError;
use proptest::prelude::*;

type U1024 = Uint<1024, 16>;

fn wide(value: U256) -> U1024 {
    let mut limbs = [0u64; 16];
    limbs[..4].copy_from_slice(value.as_limbs());
    U1024::from_limbs(limbs)
}

fn wide512(value: U256) -> U512 {
    let mut limbs = [0u64; 8];
    limbs[..4].copy_from_slice(value.as_limbs());
    U512::from_limbs(limbs)
}

fn narrow(value: U1024) -> Option<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

fn u256() -> impl Strategy<Value = U256> {
    prop_oneof![
        any::<u64>().prop_map(U256::from),
        any::<u128>().prop_map(U256::from),
        any::<[u64; 4]>().prop_map(U256::from_limbs),
    ]
}

fn nonzero_u256() -> impl Strategy<Value = U256> {
    u256().prop_filter("nonzero", |value| !value.is_zero())
}

proptest! {
    #[test]
    fn mul_div_matches_reference(a in u256(), b in u256(), denominator in nonzero_u256()) {
        let product = wide(a) * wide(b);
        let (quotient, remainder) = product.div_rem(wide(denominator));
        let ceil = if remainder.is_zero() { quotient } else { quotient + U1024::from(1u8) };

        match narrow(quotient) {
            Some(floor) => prop_assert_eq!(mul_div(a, b, denominator, false).unwrap(), floor),
            None => prop_assert!(matches!(
                mul_div(a, b, denominator, false),
                Err(MathError::MulDivOverflow(_))
            )),
        }

        match narrow(ceil) {
            Some(ceil) => prop_assert_eq!(mul_div(a, b, denominator, true).unwrap(), ceil),
            None => prop_assert!(mul_div(a, b, denominator, true).is_err()),
        }
    }

    #[test]
    fn mul_div_floor_never_exceeds_ceil(a in u256(), b in u256(), denominator in nonzero_u256()) {
        if let (Ok(floor), Ok(ceil)) = (
            mul_div(a, b, denominator, false),
            mul_div(a, b, denominator, true),
        ) {
            prop_assert!(floor <= ceil);
            prop_assert!(ceil - floor <= U256::from(1u8));
        }
    }

    #[test]
    fn mul512_matches_reference(a in u256(), b in u256()) {
        let (lo, hi) = mul512(a, b);
        let expected = wide(a) * wide(b);
        let limbs = expected.as_limbs();
        prop_assert_eq!(lo, U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]));
        prop_assert_eq!(hi, U256::from_limbs([limbs[4], limbs[5], limbs[6], limbs[7]]));
    }

    #[test]
    fn div512_recovers_factor(a in u256(), b in nonzero_u256()) {
        let (lo, hi) = mul512(a, b);
        prop_assert_eq!(div512_to_256(lo, hi, b, false).unwrap(), a);
        prop_assert_eq!(div512_to_256(lo, hi, b, true).unwrap(), a);
    }

    #[test]
    fn sqrt_brackets_value(value in u256()) {
        let root = sqrt(value, false);
        let root_wide = wide512(root);
        let next = root_wide + U512::from(1u8);
        prop_assert!(root_wide * root_wide <= wide512(value));
        prop_assert!(wide512(value) < next * next);
    }

    #[test]
    fn sqrt_rounds_up_iff_not_square(value in u256()) {
        let floor = sqrt(value, false);
        let ceil = sqrt(value, true);
        let is_square = wide512(floor) * wide512(floor) == wide512(value);
        if is_square {
            prop_assert_eq!(floor, ceil);
        } else {
            prop_assert_eq!(ceil, floor + U256::from(1u8));
        }
    }

    #[test]
    fn sqrt512_brackets_value(lo in u256(), hi in u256()) {
        let root = sqrt512(lo, hi, false).unwrap();
        let value = {
            let mut limbs = [0u64; 16];
            limbs[..4].copy_from_slice(lo.as_limbs());
            limbs[4..8].copy_from_slice(hi.as_limbs());
            U1024::from_limbs(limbs)
        };
        let next = wide(root) + U1024::from(1u8);
        prop_assert!(wide(root) * wide(root) <= value);
        prop_assert!(value < next * next);
    }

    #[test]
    fn convert_round_trip_never_gains(amount in any::<u128>(), strike in any::<u128>().prop_filter("nonzero", |s| *s != 0), shift in 0usize..=128) {
        let strike = U256::from(strike) << shift;
        let amount = U256::from(amount);
        let there = convert(amount, strike, true, false).unwrap();
        let back = convert(there, strike, false, false).unwrap();
        prop_assert!(back <= amount);
    }
}

#[test]
fn convert_round_trip_at_one_to_one_is_exact() {
    let amount = U256::from(123_456_789u64);
    let there = convert(amount, STRIKE_ONE, true, false).unwrap();
    assert_eq!(convert(there, STRIKE_ONE, false, false).unwrap(), amount);
}
