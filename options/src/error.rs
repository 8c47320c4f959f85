use alloy_sol_types::sol;
use math::MathError;
use stylus_sdk::prelude::*;

sol! {
    /// Errors that can occur in the option ledger.
    #[derive(Debug, PartialEq, Eq)]
    error ZeroAddress();
    #[derive(Debug, PartialEq, Eq)]
    error ZeroStrike();
    #[derive(Debug, PartialEq, Eq)]
    error ZeroInput();
    #[derive(Debug, PartialEq, Eq)]
    error InvalidTokenPair(address token0, address token1);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidMaturity(uint256 maturity);
    #[derive(Debug, PartialEq, Eq)]
    error InvalidPosition(uint8 position);
    /// Operation requires the option to be active, but it has matured.
    #[derive(Debug, PartialEq, Eq)]
    error AlreadyMatured(uint256 maturity, uint256 block_timestamp);
    /// Operation requires the option to have matured.
    #[derive(Debug, PartialEq, Eq)]
    error NotYetMatured(uint256 maturity, uint256 block_timestamp);
    /// The settlement callback left the ledger short of tokens.
    #[derive(Debug, PartialEq, Eq)]
    error NotEnoughReceived(address token, uint256 required, uint256 balance);
    #[derive(Debug, PartialEq, Eq)]
    error InsufficientPosition(address owner, uint8 position, uint256 balance, uint256 required);
    #[derive(Debug, PartialEq, Eq)]
    error TransferFailed(address token, address to, uint256 amount);
}

#[derive(SolidityError, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// A token or recipient is the zero address.
    ZeroAddress(ZeroAddress),
    ZeroStrike(ZeroStrike),
    /// Every amount of the request is zero.
    ZeroInput(ZeroInput),
    InvalidTokenPair(InvalidTokenPair),
    InvalidMaturity(InvalidMaturity),
    InvalidPosition(InvalidPosition),
    AlreadyMatured(AlreadyMatured),
    NotYetMatured(NotYetMatured),
    NotEnoughReceived(NotEnoughReceived),
    InsufficientPosition(InsufficientPosition),
    TransferFailed(TransferFailed),
    /// Arithmetic failure, propagated unmodified.
    Math(MathError),
}

impl stylus_sdk::call::MethodError for OptionError {
    fn encode(self) -> alloc::vec::Vec<u8> {
        self.into()
    }
}
