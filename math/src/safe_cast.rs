use alloy_primitives::{aliases::U160, U256};

use crate::error::{CastOverflow, MathError};

/// Narrows a 256-bit value to 160 bits.
///
/// # Errors
/// - `CastOverflow`: If the value needs more than 160 bits
pub fn to_u160(value: U256) -> Result<U160, MathError> {
    if value.bit_len() > 160 {
        return Err(MathError::CastOverflow(CastOverflow { value, bits: 160 }));
    }

    let limbs = value.as_limbs();
    Ok(U160::from_limbs([limbs[0], limbs[1], limbs[2]]))
}

#[must_use]
pub fn widen(value: U160) -> U256 {
    let limbs = value.as_limbs();
    U256::from_limbs([limbs[0], limbs[1], limbs[2], 0])
}
