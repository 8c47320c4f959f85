
use alloy_primitives::{aliases::U160, Bytes, U256};
use alloy_sol_types::SolEvent;
use fixture::*;
use options::{OptionKey, PositionType};
use pool::events::{Burn, TransferLiquidity};
use pool::params::{
    PoolAddFeesParam, PoolBurn, PoolBurnParam, PoolCollectProtocolFeesParam,
    PoolCollectTransactionFeesParam, PoolLeverageParam, PoolMint, PoolTrade,
};
use pool::{PoolConfig, PoolError};

/// Alice provides 1000 liquidity for 100 seconds: 1000 long and 100000 short.
fn hundred_seconds() -> Env {
    let mut env = setup(100, no_fees());
    env.mint(&mut Trader::new(ALICE), PoolMint::GivenLiquidity, 1_000)
        .unwrap();
    env
}

fn collect_all(key: OptionKey) -> PoolCollectTransactionFeesParam {
    PoolCollectTransactionFeesParam {
        key,
        long0_to: ALICE,
        long1_to: ALICE,
        short_to: ALICE,
        long0_fees_requested: U256::MAX,
        long1_fees_requested: U256::MAX,
        short_fees_requested: U256::MAX,
        short_returned_requested: U256::MAX,
    }
}

#[test]
fn short_returns_to_providers_as_time_passes() {
    let env = hundred_seconds();

    assert_eq!(env.pool.total_short(env.key, NOW).unwrap(), U256::from(100_000));
    assert_eq!(
        env.pool.short_returned_of(env.key, ALICE, NOW + 10).unwrap(),
        U256::from(10_000)
    );
    assert_eq!(
        env.pool.total_short(env.key, NOW + 10).unwrap(),
        U256::from(90_000)
    );
    // nothing decays past maturity
    assert_eq!(
        env.pool.short_returned_of(env.key, ALICE, NOW + 500).unwrap(),
        U256::from(100_000)
    );
    assert!(
        env.pool.short_returned_growth(env.key, NOW + 20).unwrap()
            > env.pool.short_returned_growth(env.key, NOW + 10).unwrap()
    );
}

#[test]
fn providers_collect_short_returned() {
    let mut env = hundred_seconds();
    let before = env.position(ALICE, PositionType::Short);

    let collected = env
        .pool
        .collect_transaction_fees(&mut env.option, at(ALICE, 25), collect_all(env.key))
        .unwrap();

    assert_eq!(collected.short_returned, U256::from(25_000));
    assert_eq!(collected.short_fees, U256::ZERO);
    assert_eq!(
        env.position(ALICE, PositionType::Short),
        before + U256::from(25_000)
    );
    assert_eq!(
        env.pool.short_returned_of(env.key, ALICE, NOW + 25).unwrap(),
        U256::ZERO
    );
    // the curve still owns what has not decayed
    assert_eq!(
        env.pool.total_positions(&env.option, env.key).2,
        U256::from(75_000)
    );
}

#[test]
fn collecting_caps_at_what_is_owed() {
    let mut env = hundred_seconds();
    let mut param = collect_all(env.key);
    param.short_returned_requested = U256::from(4_000);

    let collected = env
        .pool
        .collect_transaction_fees(&mut env.option, at(ALICE, 10), param)
        .unwrap();

    assert_eq!(collected.short_returned, U256::from(4_000));
    assert_eq!(
        env.pool.short_returned_of(env.key, ALICE, NOW + 10).unwrap(),
        U256::from(6_000)
    );
}

#[test]
fn burn_after_maturity_pays_everything_owed() {
    let mut env = hundred_seconds();
    let before = env.position(ALICE, PositionType::Short);
    let param = PoolBurnParam {
        key: env.key,
        long0_to: ALICE,
        long1_to: ALICE,
        short_to: ALICE,
        transaction: PoolBurn::GivenLiquidity,
        delta: U256::from(1_000),
        data: Bytes::new(),
    };

    let burned = env
        .pool
        .burn(
            &mut env.option,
            &mut env.tokens,
            at(ALICE, 100),
            param,
            &mut Trader::new(ALICE),
        )
        .unwrap();

    assert_eq!(burned.liquidity_amount, U160::from(1_000));
    assert_eq!(burned.long0_amount, U256::ZERO);
    assert_eq!(burned.short_amount, U256::ZERO);
    assert_eq!(burned.short_returned, U256::from(100_000));
    assert_eq!(
        env.position(ALICE, PositionType::Short),
        before + U256::from(100_000)
    );
    assert_eq!(env.pool.total_liquidity(env.key), U160::ZERO);
    // longs are worthless after maturity and stay behind
    assert_eq!(
        env.pool.total_positions(&env.option, env.key),
        (U256::from(1_000), U256::ZERO, U256::ZERO)
    );

    let log = env.pool.logs().last().unwrap();
    let event = Burn::decode_log_data(&log.data, true).unwrap();
    assert_eq!(event.short_returned, U256::from(100_000));
}

#[test]
fn only_liquidity_burns_after_maturity() {
    let mut env = hundred_seconds();
    let param = PoolBurnParam {
        key: env.key,
        long0_to: ALICE,
        long1_to: ALICE,
        short_to: ALICE,
        transaction: PoolBurn::GivenLong,
        delta: U256::from(10),
        data: Bytes::new(),
    };

    let result = env.pool.burn(
        &mut env.option,
        &mut env.tokens,
        at(ALICE, 100),
        param,
        &mut Trader::new(ALICE),
    );

    assert!(matches!(result, Err(PoolError::AlreadyMatured(_))));
}

#[test]
fn transferred_liquidity_earns_for_the_receiver() {
    let mut env = hundred_seconds();

    env.pool
        .transfer_liquidity(at(ALICE, 10), env.key, BOB, U160::from(400))
        .unwrap();

    assert_eq!(env.pool.liquidity_of(env.key, ALICE), U160::from(600));
    assert_eq!(env.pool.liquidity_of(env.key, BOB), U160::from(400));
    assert_eq!(
        env.pool.short_returned_of(env.key, ALICE, NOW + 20).unwrap(),
        U256::from(16_000)
    );
    assert_eq!(
        env.pool.short_returned_of(env.key, BOB, NOW + 20).unwrap(),
        U256::from(4_000)
    );

    let log = env.pool.logs().last().unwrap();
    let event = TransferLiquidity::decode_log_data(&log.data, true).unwrap();
    assert_eq!((event.from, event.to), (ALICE, BOB));
}

#[test]
fn transfer_liquidity_checks_the_sender() {
    let mut env = hundred_seconds();
    let pool = env.pool.clone();

    assert!(matches!(
        env.pool
            .transfer_liquidity(at(BOB, 0), env.key, CAROL, U160::from(1)),
        Err(PoolError::NotEnoughLiquidity(_))
    ));
    assert!(matches!(
        env.pool
            .transfer_liquidity(at(ALICE, 0), env.key, BOB, U160::ZERO),
        Err(PoolError::ZeroInput(_))
    ));
    assert_eq!(env.pool, pool);
}

#[test]
fn donations_are_shared_without_protocol_cut() {
    let config = PoolConfig {
        transaction_fee: 0,
        protocol_fee: 1 << 15,
    };
    let mut env = setup(100, config);
    env.mint(&mut Trader::new(ALICE), PoolMint::GivenLiquidity, 1_000)
        .unwrap();
    let param = PoolAddFeesParam {
        key: env.key,
        long0_fees: U256::from(500),
        long1_fees: U256::ZERO,
        short_fees: U256::from(250),
        data: Bytes::new(),
    };

    env.pool
        .add_fees(
            &mut env.option,
            &mut env.tokens,
            at(CAROL, 0),
            param,
            &mut Trader::new(CAROL),
        )
        .unwrap();

    assert_eq!(
        env.pool.fees_earned_of(env.key, ALICE).unwrap(),
        (U256::from(500), U256::ZERO, U256::from(250))
    );
    assert_eq!(
        env.pool.protocol_fees_earned(env.key),
        (U256::ZERO, U256::ZERO, U256::ZERO)
    );
    assert_eq!(
        env.position(CAROL, PositionType::Long0),
        U256::from(STOCK - 500)
    );

    let empty = PoolAddFeesParam {
        key: env.key,
        long0_fees: U256::ZERO,
        long1_fees: U256::ZERO,
        short_fees: U256::ZERO,
        data: Bytes::new(),
    };
    assert!(matches!(
        env.pool.add_fees(
            &mut env.option,
            &mut env.tokens,
            at(CAROL, 0),
            empty,
            &mut Trader::new(CAROL),
        ),
        Err(PoolError::ZeroInput(_))
    ));
}

#[test]
fn only_the_owner_collects_protocol_fees() {
    let config = PoolConfig {
        transaction_fee: 1 << 12,
        protocol_fee: 1 << 14,
    };
    let mut env = setup(1, config);
    env.mint(&mut Trader::new(ALICE), PoolMint::GivenLarger, 10_000)
        .unwrap();
    let leverage = PoolLeverageParam {
        key: env.key,
        long0_to: BOB,
        long1_to: BOB,
        transaction: PoolTrade::GivenShort,
        delta: U256::from(1_600),
        data: Bytes::new(),
    };
    env.pool
        .leverage(
            &mut env.option,
            &mut env.tokens,
            at(BOB, 0),
            leverage,
            &mut Trader::new(BOB),
        )
        .unwrap();
    let param = PoolCollectProtocolFeesParam {
        key: env.key,
        long0_to: OWNER,
        long1_to: OWNER,
        short_to: OWNER,
        long0_requested: U256::MAX,
        long1_requested: U256::MAX,
        short_requested: U256::from(10),
    };

    assert!(matches!(
        env.pool
            .collect_protocol_fees(&mut env.option, at(ALICE, 0), param),
        Err(PoolError::OnlyOwner(_))
    ));

    let collected = env
        .pool
        .collect_protocol_fees(&mut env.option, at(OWNER, 0), param)
        .unwrap();
    assert_eq!(collected.short_amount, U256::from(10));
    assert_eq!(env.position(OWNER, PositionType::Short), U256::from(10));

    let rest = env
        .pool
        .collect_protocol_fees(
            &mut env.option,
            at(OWNER, 0),
            PoolCollectProtocolFeesParam {
                short_requested: U256::MAX,
                ..param
            },
        )
        .unwrap();
    assert_eq!(rest.short_amount, U256::from(15));
    assert_eq!(
        env.pool.protocol_fees_earned(env.key),
        (U256::ZERO, U256::ZERO, U256::ZERO)
    );
}

#[test]
fn providers_collect_trading_fees() {
    let config = PoolConfig {
        transaction_fee: 1 << 12,
        protocol_fee: 0,
    };
    let mut env = setup(1, config);
    env.mint(&mut Trader::new(ALICE), PoolMint::GivenLarger, 1_024)
        .unwrap();
    let leverage = PoolLeverageParam {
        key: env.key,
        long0_to: BOB,
        long1_to: BOB,
        transaction: PoolTrade::GivenShort,
        delta: U256::from(160),
        data: Bytes::new(),
    };
    env.pool
        .leverage(
            &mut env.option,
            &mut env.tokens,
            at(BOB, 0),
            leverage,
            &mut Trader::new(BOB),
        )
        .unwrap();
    let before = env.position(ALICE, PositionType::Short);

    let collected = env
        .pool
        .collect_transaction_fees(&mut env.option, at(ALICE, 0), collect_all(env.key))
        .unwrap();

    assert_eq!(collected.short_fees, U256::from(10));
    assert_eq!(
        env.position(ALICE, PositionType::Short),
        before + U256::from(10)
    );
    assert_eq!(
        env.pool.fees_earned_of(env.key, ALICE).unwrap(),
        (U256::ZERO, U256::ZERO, U256::ZERO)
    );
}
