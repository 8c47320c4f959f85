use alloy_sol_types::sol;
use stylus_sdk::prelude::*;

sol! {
    /// The 512-bit sum does not fit in 512 bits.
    #[derive(Debug, PartialEq, Eq)]
    error AddOverflow(uint256 augend0, uint256 augend1, uint256 addend0, uint256 addend1);

    /// The subtrahend is larger than the minuend.
    #[derive(Debug, PartialEq, Eq)]
    error SubUnderflow(uint256 minuend0, uint256 minuend1, uint256 subtrahend0, uint256 subtrahend1);

    #[derive(Debug, PartialEq, Eq)]
    error DivideByZero();

    /// The quotient of a 512-bit division does not fit in 256 bits.
    #[derive(Debug, PartialEq, Eq)]
    error DivideOverflow(uint256 dividend0, uint256 dividend1, uint256 divisor);

    /// `multiplicand * multiplier / divisor` does not fit in 256 bits.
    #[derive(Debug, PartialEq, Eq)]
    error MulDivOverflow(uint256 multiplicand, uint256 multiplier, uint256 divisor);

    /// The rounded-up square root of a 512-bit value is `2^256`.
    #[derive(Debug, PartialEq, Eq)]
    error SqrtOverflow(uint256 value0, uint256 value1);

    /// A value does not fit the narrower integer it is cast to.
    #[derive(Debug, PartialEq, Eq)]
    error CastOverflow(uint256 value, uint16 bits);
}

#[derive(SolidityError, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    AddOverflow(AddOverflow),
    SubUnderflow(SubUnderflow),
    DivideByZero(DivideByZero),
    DivideOverflow(DivideOverflow),
    MulDivOverflow(MulDivOverflow),
    SqrtOverflow(SqrtOverflow),
    CastOverflow(CastOverflow),
}

impl stylus_sdk::call::MethodError for MathError {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}
