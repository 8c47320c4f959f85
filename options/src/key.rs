use alloy_primitives::{keccak256, Address, B256, U256};

use crate::error::{
    InvalidMaturity, InvalidPosition, InvalidTokenPair, OptionError, ZeroAddress, ZeroStrike,
};

/// Exclusive upper bound of a maturity timestamp (`2^96`).
pub const MATURITY_LIMIT: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// Identifies a market: an ordered token pair, a strike and a maturity.
///
/// `strike` is the price of token0 in token1 as a UQ128.128 number and
/// `maturity` is a unix timestamp below `2^96`. The key is compared by value
/// and used directly as the composite key of every ledger and pool map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionKey {
    pub token0: Address,
    pub token1: Address,
    pub strike: U256,
    pub maturity: U256,
}

impl OptionKey {
    #[must_use]
    pub const fn new(token0: Address, token1: Address, strike: U256, maturity: U256) -> Self {
        Self {
            token0,
            token1,
            strike,
            maturity,
        }
    }

    /// Deterministic market identifier, `keccak256(token0, token1, strike, maturity)`.
    ///
    /// Used as the indexed market topic of every event.
    #[must_use]
    pub fn id(&self) -> B256 {
        let encoded = [
            self.token0.as_slice(),
            self.token1.as_slice(),
            self.strike.to_be_bytes::<32>().as_slice(),
            self.maturity.to_be_bytes::<32>().as_slice(),
        ]
        .concat();

        keccak256(encoded)
    }

    /// Checks the key is well formed, without reading any state.
    ///
    /// # Errors
    /// - `ZeroAddress`: If either token is the zero address
    /// - `InvalidTokenPair`: If `token0` is not strictly below `token1`
    /// - `ZeroStrike`: If the strike is zero
    /// - `InvalidMaturity`: If the maturity is zero or does not fit 96 bits
    pub fn validate(&self) -> Result<(), OptionError> {
        if self.token0.is_zero() || self.token1.is_zero() {
            return Err(OptionError::ZeroAddress(ZeroAddress {}));
        }
        if self.token0 >= self.token1 {
            return Err(OptionError::InvalidTokenPair(InvalidTokenPair {
                token0: self.token0,
                token1: self.token1,
            }));
        }
        if self.strike.is_zero() {
            return Err(OptionError::ZeroStrike(ZeroStrike {}));
        }
        if self.maturity.is_zero() || self.maturity >= MATURITY_LIMIT {
            return Err(OptionError::InvalidMaturity(InvalidMaturity {
                maturity: self.maturity,
            }));
        }
        Ok(())
    }

    /// Returns `true` once `block_timestamp` has reached the maturity.
    #[must_use]
    pub fn is_matured(&self, block_timestamp: u64) -> bool {
        U256::from(block_timestamp) >= self.maturity
    }

    /// Seconds left until maturity, zero once matured.
    #[must_use]
    pub fn duration(&self, block_timestamp: u64) -> U256 {
        self.maturity.saturating_sub(U256::from(block_timestamp))
    }
}

/// The three claims issued against a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PositionType {
    /// Claim on token0, exercisable before maturity.
    Long0,
    /// Claim on token1, exercisable before maturity.
    Long1,
    /// Base-denominated claim on whatever remains after maturity.
    Short,
}

impl PositionType {
    pub const ALL: [Self; 3] = [Self::Long0, Self::Long1, Self::Short];

    /// Converts the position type to u8 for encoding.
    ///
    /// # Returns
    /// - `0` for Long0
    /// - `1` for Long1
    /// - `2` for Short
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Long0 => 0,
            Self::Long1 => 1,
            Self::Short => 2,
        }
    }
}

impl TryFrom<u8> for PositionType {
    type Error = OptionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Long0),
            1 => Ok(Self::Long1),
            2 => Ok(Self::Short),
            _ => Err(OptionError::InvalidPosition(InvalidPosition { position: value })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> OptionKey {
        OptionKey::new(
            Address::from([0x11; 20]),
            Address::from([0x22; 20]),
            U256::from(1) << 128,
            U256::from(1_700_000_000),
        )
    }

    #[test]
    fn test_maturity_limit_is_2_pow_96() {
        assert_eq!(MATURITY_LIMIT, U256::from(1) << 96);
    }

    #[test]
    fn test_id_same_parameters_identical() {
        assert_eq!(key().id(), key().id());
    }

    #[test]
    fn test_id_different_strikes() {
        let mut other = key();
        other.strike = U256::from(2) << 128;
        assert_ne!(key().id(), other.id());
    }

    #[test]
    fn test_id_different_maturities() {
        let mut other = key();
        other.maturity = U256::from(1_800_000_000);
        assert_ne!(key().id(), other.id());
    }

    #[test]
    fn test_validate_accepts_well_formed_key() {
        assert!(key().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_token() {
        let mut bad = key();
        bad.token0 = Address::ZERO;
        assert!(matches!(bad.validate(), Err(OptionError::ZeroAddress(_))));
    }

    #[test]
    fn test_validate_rejects_unordered_pair() {
        let mut bad = key();
        core::mem::swap(&mut bad.token0, &mut bad.token1);
        assert!(matches!(
            bad.validate(),
            Err(OptionError::InvalidTokenPair(_))
        ));

        bad.token0 = bad.token1;
        assert!(matches!(
            bad.validate(),
            Err(OptionError::InvalidTokenPair(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_strike() {
        let mut bad = key();
        bad.strike = U256::ZERO;
        assert!(matches!(bad.validate(), Err(OptionError::ZeroStrike(_))));
    }

    #[test]
    fn test_validate_rejects_maturity_out_of_range() {
        let mut bad = key();
        bad.maturity = MATURITY_LIMIT;
        assert!(matches!(
            bad.validate(),
            Err(OptionError::InvalidMaturity(_))
        ));

        bad.maturity = U256::ZERO;
        assert!(matches!(
            bad.validate(),
            Err(OptionError::InvalidMaturity(_))
        ));
    }

    #[test]
    fn test_duration_and_maturity() {
        let key = key();
        assert!(!key.is_matured(1_699_999_999));
        assert!(key.is_matured(1_700_000_000));
        assert_eq!(key.duration(1_699_999_000), U256::from(1_000));
        assert_eq!(key.duration(1_800_000_000), U256::ZERO);
    }

    #[test]
    fn test_position_type_round_trip() {
        for position in PositionType::ALL {
            assert_eq!(PositionType::try_from(position.to_u8()).unwrap(), position);
        }
    }

    #[test]
    fn test_position_type_invalid_tag() {
        assert!(matches!(
            PositionType::try_from(3),
            Err(OptionError::InvalidPosition(_))
        ));
    }
}
