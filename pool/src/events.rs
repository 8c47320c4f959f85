use alloy_sol_types::sol;

sol! {
    event Initialize(bytes32 indexed market, uint160 sqrt_interest_rate);

    event Mint(
        bytes32 indexed market,
        address indexed caller,
        address indexed to,
        uint160 liquidity_amount,
        uint256 long0_amount,
        uint256 long1_amount,
        uint256 short_amount
    );

    /// Emitted when liquidity is removed. Fee and short-returned amounts are
    /// non-zero only for a burn after maturity.
    event Burn(
        bytes32 indexed market,
        address indexed caller,
        uint160 liquidity_amount,
        uint256 long0_amount,
        uint256 long1_amount,
        uint256 short_amount,
        uint256 short_returned
    );

    event Leverage(
        bytes32 indexed market,
        address indexed caller,
        uint256 long0_amount,
        uint256 long1_amount,
        uint256 short_amount,
        uint256 short_fees,
        uint160 sqrt_interest_rate
    );

    event Deleverage(
        bytes32 indexed market,
        address indexed caller,
        address indexed to,
        uint256 long0_amount,
        uint256 long1_amount,
        uint256 short_amount,
        uint256 short_fees,
        uint160 sqrt_interest_rate
    );

    event Rebalance(
        bytes32 indexed market,
        address indexed caller,
        address indexed to,
        bool is_long0_to_long1,
        uint256 long0_amount,
        uint256 long1_amount,
        uint256 long_fees
    );

    event AddFees(
        bytes32 indexed market,
        address indexed caller,
        uint256 long0_fees,
        uint256 long1_fees,
        uint256 short_fees
    );

    event CollectProtocolFees(
        bytes32 indexed market,
        address indexed caller,
        uint256 long0_amount,
        uint256 long1_amount,
        uint256 short_amount
    );

    event CollectTransactionFees(
        bytes32 indexed market,
        address indexed caller,
        uint256 long0_fees,
        uint256 long1_fees,
        uint256 short_fees,
        uint256 short_returned
    );

    event TransferLiquidity(
        bytes32 indexed market,
        address indexed from,
        address indexed to,
        uint160 liquidity_amount
    );
}
