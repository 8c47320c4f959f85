
use alloy_primitives::{Bytes, U256};
use fixture::*;
use options::{OptionError, PositionType};
use periphery::{LongSplit, Payer};
use pool::params::{
    PoolAddFeesParam, PoolBurn, PoolBurnParam, PoolLeverageParam, PoolRebalance,
    PoolRebalanceParam, PoolTrade,
};
use pool::PoolError;

#[test]
fn payer_funds_option_mints_from_its_tokens() {
    let env = setup();

    assert_eq!(env.balance(TOKEN0, ALICE), U256::from(STOCK - OPTIONS));
    assert_eq!(env.balance(TOKEN1, ALICE), U256::from(STOCK - OPTIONS));
    assert_eq!(env.balance(TOKEN0, LEDGER), U256::from(3 * OPTIONS));
    assert_eq!(env.position(ALICE, PositionType::Short), U256::from(2 * OPTIONS));
}

#[test]
fn payer_without_tokens_fails_the_mint() {
    let mut env = setup();
    let option = env.option.clone();

    let result = env.option.mint(
        &mut env.tokens,
        at(DAVE, 0),
        option_mint(env.key, DAVE, 100, 0),
        &mut payer(DAVE),
    );

    assert!(matches!(result, Err(OptionError::TransferFailed(_))));
    assert_eq!(env.option, option);
}

#[test]
fn payer_provides_liquidity_in_its_chosen_long() {
    let mut env = setup();

    let minted = env
        .provide(&mut Payer::new(ALICE, LongSplit::Long1), 1_000)
        .unwrap();

    assert_eq!((minted.long0_amount, minted.long1_amount), (U256::ZERO, U256::from(1_000)));
    assert_eq!(
        env.pool.total_long_balance(env.key),
        (U256::ZERO, U256::from(1_000))
    );
    assert_eq!(
        env.position(ALICE, PositionType::Long1),
        U256::from(OPTIONS - 1_000)
    );
    assert_eq!(
        env.position(ALICE, PositionType::Short),
        U256::from(2 * OPTIONS - 100_000)
    );
}

#[test]
fn payer_takes_whichever_long_the_pool_holds() {
    let mut env = setup();
    env.provide(&mut Payer::new(ALICE, LongSplit::Long1), 1_000)
        .unwrap();
    let param = PoolLeverageParam {
        key: env.key,
        long0_to: BOB,
        long1_to: BOB,
        transaction: PoolTrade::GivenShort,
        delta: U256::from(10_000),
        data: Bytes::new(),
    };

    let result = env
        .pool
        .leverage(
            &mut env.option,
            &mut env.tokens,
            at(BOB, 0),
            param,
            &mut payer(BOB),
        )
        .unwrap();

    assert_eq!(result.long0_amount, U256::ZERO);
    assert!(!result.long1_amount.is_zero());
    assert_eq!(
        env.position(BOB, PositionType::Long1),
        U256::from(OPTIONS) + result.long1_amount
    );
    assert_eq!(
        env.position(BOB, PositionType::Short),
        U256::from(2 * OPTIONS - 10_000)
    );
}

#[test]
fn payer_rebalances_and_burns() {
    let mut env = setup();
    env.provide(&mut payer(ALICE), 1_000).unwrap();
    let rebalance = PoolRebalanceParam {
        key: env.key,
        to: BOB,
        is_long0_to_long1: false,
        transaction: PoolRebalance::GivenLong0,
        delta: U256::from(200),
        data: Bytes::new(),
    };

    env.pool
        .rebalance(
            &mut env.option,
            &mut env.tokens,
            at(BOB, 0),
            rebalance,
            &mut payer(BOB),
        )
        .unwrap();
    assert_eq!(
        env.position(BOB, PositionType::Long0),
        U256::from(OPTIONS + 200)
    );
    assert_eq!(
        env.position(BOB, PositionType::Long1),
        U256::from(OPTIONS - 200)
    );

    let burn = PoolBurnParam {
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
            at(ALICE, 0),
            burn,
            &mut Payer::new(ALICE, LongSplit::Proportional),
        )
        .unwrap();

    assert_eq!(
        (burned.long0_amount, burned.long1_amount),
        (U256::from(800), U256::from(200))
    );
    assert_eq!(burned.short_amount, U256::from(100_000));
    assert_eq!(
        env.pool.total_positions(&env.option, env.key),
        (U256::ZERO, U256::ZERO, U256::ZERO)
    );
}

#[test]
fn payer_donates_fees() {
    let mut env = setup();
    env.provide(&mut payer(ALICE), 1_000).unwrap();
    let param = PoolAddFeesParam {
        key: env.key,
        long0_fees: U256::ZERO,
        long1_fees: U256::from(500),
        short_fees: U256::from(250),
        data: Bytes::new(),
    };

    env.pool
        .add_fees(
            &mut env.option,
            &mut env.tokens,
            at(CAROL, 0),
            param,
            &mut payer(CAROL),
        )
        .unwrap();

    assert_eq!(
        env.pool.fees_earned_of(env.key, ALICE).unwrap(),
        (U256::ZERO, U256::from(500), U256::from(250))
    );
    assert_eq!(
        env.position(CAROL, PositionType::Long1),
        U256::from(OPTIONS - 500)
    );
}

#[test]
fn payer_short_of_positions_fails_the_pool_mint() {
    let mut env = setup();
    let pool = env.pool.clone();

    let result = env.provide(&mut payer(DAVE), 1_000);

    assert!(matches!(
        result,
        Err(PoolError::Option(OptionError::InsufficientPosition(_)))
    ));
    assert_eq!(env.pool, pool);
}
