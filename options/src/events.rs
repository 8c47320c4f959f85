use alloy_sol_types::sol;

sol! {
    /// Emitted when long and short positions are issued against deposited tokens.
    event Mint(
        bytes32 indexed market,
        address indexed long0_to,
        address indexed long1_to,
        address short_to,
        uint256 token0_and_long0_amount,
        uint256 token1_and_long1_amount,
        uint256 short_amount
    );

    /// Emitted when long and short positions are redeemed before maturity.
    event Burn(
        bytes32 indexed market,
        address indexed token0_to,
        address indexed token1_to,
        uint256 token0_and_long0_amount,
        uint256 token1_and_long1_amount,
        uint256 short_amount
    );

    /// Emitted when one long type is exchanged for the other.
    event Swap(
        bytes32 indexed market,
        address indexed token_to,
        address indexed long_to,
        bool is_long0_to_long1,
        uint256 token0_and_long0_amount,
        uint256 token1_and_long1_amount
    );

    /// Emitted when short positions are redeemed after maturity.
    event Collect(
        bytes32 indexed market,
        address indexed token0_to,
        address indexed token1_to,
        uint256 token0_amount,
        uint256 token1_amount,
        uint256 short_amount
    );

    event TransferPosition(
        bytes32 indexed market,
        address indexed from,
        address indexed to,
        uint8 position,
        uint256 amount
    );
}
