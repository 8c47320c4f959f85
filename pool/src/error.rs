use alloy_sol_types::sol;
use math::MathError;
use options::OptionError;
use stylus_sdk::prelude::*;

sol! {
    /// Errors that can occur in the pool engine.
    #[derive(Debug, PartialEq, Eq)]
    error Uninitialized(bytes32 market);
    #[derive(Debug, PartialEq, Eq)]
    error AlreadyInitialized(bytes32 market);
    #[derive(Debug, PartialEq, Eq)]
    error ZeroSqrtInterestRate();
    #[derive(Debug, PartialEq, Eq)]
    error ZeroInput();
    /// The request rounds to nothing.
    #[derive(Debug, PartialEq, Eq)]
    error ZeroOutput();
    #[derive(Debug, PartialEq, Eq)]
    error ZeroAddress();
    #[derive(Debug, PartialEq, Eq)]
    error AlreadyMatured(uint256 maturity, uint256 block_timestamp);
    /// The settlement callback left the pool short of a position.
    #[derive(Debug, PartialEq, Eq)]
    error NotEnoughReceived(bytes32 market, uint8 position, uint256 required, uint256 balance);
    #[derive(Debug, PartialEq, Eq)]
    error NotEnoughLiquidity(address owner, uint256 liquidity, uint256 required);
    /// Fee-charging operations need liquidity to distribute fees to.
    #[derive(Debug, PartialEq, Eq)]
    error NoLiquidity(bytes32 market);
    /// The long split returned by a choice callback does not cover the requirement.
    #[derive(Debug, PartialEq, Eq)]
    error InvalidChoice(uint256 long_amount, uint256 long0_amount, uint256 long1_amount);
    #[derive(Debug, PartialEq, Eq)]
    error ExceedsPoolBalance(uint8 position, uint256 balance, uint256 required);
    /// The curve holds less long than requested.
    #[derive(Debug, PartialEq, Eq)]
    error ExceedsCurve(uint256 available, uint256 required);
    #[derive(Debug, PartialEq, Eq)]
    error OnlyOwner(address caller);
    /// The square-root interest rate would leave its valid range.
    #[derive(Debug, PartialEq, Eq)]
    error InvalidSqrtInterestRate(uint256 current, uint256 next);
}

#[derive(SolidityError, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    Uninitialized(Uninitialized),
    AlreadyInitialized(AlreadyInitialized),
    ZeroSqrtInterestRate(ZeroSqrtInterestRate),
    ZeroInput(ZeroInput),
    ZeroOutput(ZeroOutput),
    ZeroAddress(ZeroAddress),
    AlreadyMatured(AlreadyMatured),
    NotEnoughReceived(NotEnoughReceived),
    NotEnoughLiquidity(NotEnoughLiquidity),
    NoLiquidity(NoLiquidity),
    InvalidChoice(InvalidChoice),
    ExceedsPoolBalance(ExceedsPoolBalance),
    ExceedsCurve(ExceedsCurve),
    OnlyOwner(OnlyOwner),
    InvalidSqrtInterestRate(InvalidSqrtInterestRate),
    /// Failure inside the option ledger, propagated unmodified.
    Option(OptionError),
    Math(MathError),
}
