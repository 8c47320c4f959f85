
use alloy_primitives::{aliases::U160, Address, Bytes, U256};
use fixture::*;
use options::{OptionError, PositionType};
use pool::curve::{long_of, short_of};
use pool::params::{
    PoolBurn, PoolBurnParam, PoolCollectProtocolFeesParam, PoolDeleverageParam,
    PoolLeverageParam, PoolMint, PoolMintParam, PoolTrade, PoolTradeResult,
};
use pool::{PoolConfig, PoolError};
use proptest::prelude::*;

const DURATION: u64 = 100;

/// The pool's holdings cover the curve and the protocol's share of fees.
fn assert_solvent(env: &Env, seconds: u64) -> Result<(), TestCaseError> {
    let liquidity = math::safe_cast::widen(env.pool.total_liquidity(env.key));
    let rate = math::safe_cast::widen(env.pool.sqrt_interest_rate(env.key));
    let (long0, long1, short) = env.pool.total_positions(&env.option, env.key);
    let (_, _, protocol_short) = env.pool.protocol_fees_earned(env.key);
    let remaining = U256::from(DURATION - seconds);

    prop_assert!(long0 + long1 >= long_of(liquidity, rate, false).unwrap());
    prop_assert!(short >= short_of(liquidity, rate, remaining, false).unwrap() + protocol_short);
    Ok(())
}

/// Short the providers are owed in fees and short returned at `seconds`.
fn owed_to_providers(env: &Env, providers: &[Address], seconds: u64) -> U256 {
    providers
        .iter()
        .map(|&owner| {
            let (_, _, short_fees) = env.pool.fees_earned_of(env.key, owner).unwrap();
            short_fees
                + env
                    .pool
                    .short_returned_of(env.key, owner, NOW + seconds)
                    .unwrap()
        })
        .fold(U256::ZERO, |total, owed| total + owed)
}

/// Bob trades `amount` of short into (leverage) or out of (deleverage) the pool.
fn trade(
    env: &mut Env,
    is_leverage: bool,
    amount: u64,
    seconds: u64,
) -> Result<PoolTradeResult, PoolError> {
    if is_leverage {
        let param = PoolLeverageParam {
            key: env.key,
            long0_to: BOB,
            long1_to: BOB,
            transaction: PoolTrade::GivenShort,
            delta: U256::from(amount),
            data: Bytes::new(),
        };
        env.pool.leverage(
            &mut env.option,
            &mut env.tokens,
            at(BOB, seconds),
            param,
            &mut Trader::new(BOB),
        )
    } else {
        let param = PoolDeleverageParam {
            key: env.key,
            to: BOB,
            transaction: PoolTrade::GivenShort,
            delta: U256::from(amount),
            data: Bytes::new(),
        };
        env.pool.deleverage(
            &mut env.option,
            &mut env.tokens,
            at(BOB, seconds),
            param,
            &mut Trader::new(BOB),
        )
    }
}

/// Trades the curve refuses without anything being wrong with the pool.
fn is_refused(error: &PoolError) -> bool {
    matches!(
        error,
        PoolError::ZeroOutput(_)
            | PoolError::ExceedsCurve(_)
            | PoolError::ExceedsPoolBalance(_)
            | PoolError::InvalidSqrtInterestRate(_)
            | PoolError::Option(OptionError::InsufficientPosition(_))
    )
}

proptest! {
    #[test]
    fn trading_never_leaves_the_curve_uncovered(
        liquidity in 1_000u64..10_000,
        transaction_fee in 0u16..4_096,
        protocol_fee in 0u16..u16::MAX,
        trades in prop::collection::vec((any::<bool>(), 1u64..5_000), 1..20),
    ) {
        let config = PoolConfig { transaction_fee, protocol_fee };
        let mut env = setup(DURATION, config);
        env.mint(&mut Trader::new(ALICE), PoolMint::GivenLiquidity, liquidity).unwrap();
        assert_solvent(&env, 0)?;

        let mut landed = 0u64;
        for (is_leverage, amount) in trades {
            match trade(&mut env, is_leverage, amount, 0) {
                Ok(_) => landed += 1,
                Err(error) => {
                    prop_assert!(is_refused(&error), "unexpected {error:?}");
                }
            }
            assert_solvent(&env, 0)?;
        }
        prop_assume!(landed > 0);
    }

    #[test]
    fn providers_drain_the_pool_after_maturity(
        liquidity in 1_000u64..10_000,
        late_liquidity in 1_000u64..10_000,
        transaction_fee in 1u16..4_096,
        protocol_fee in 0u16..u16::MAX,
        trades in prop::collection::vec((any::<bool>(), 1u64..5_000, 0u64..10), 2..20),
    ) {
        let config = PoolConfig { transaction_fee, protocol_fee };
        let mut env = setup(DURATION, config);
        env.mint(&mut Trader::new(ALICE), PoolMint::GivenLiquidity, liquidity).unwrap();
        // enough to join at whatever rate the trades leave behind
        env.fund(CAROL, 1_000_000_000);

        let joins_at = trades.len() / 2;
        let mut seconds = 0;
        let mut fee_growth = env.pool.fee_growth(env.key);
        let mut returned_growth = env.pool.short_returned_growth(env.key, NOW).unwrap();
        let mut landed = 0u64;

        for (index, (is_leverage, amount, step)) in trades.into_iter().enumerate() {
            seconds = (seconds + step).min(DURATION - 1);

            if index == joins_at {
                let param = PoolMintParam {
                    key: env.key,
                    to: CAROL,
                    transaction: PoolMint::GivenLiquidity,
                    delta: U256::from(late_liquidity),
                    data: Bytes::new(),
                };
                env.pool
                    .mint(
                        &mut env.option,
                        &mut env.tokens,
                        at(CAROL, seconds),
                        param,
                        &mut Trader::new(CAROL),
                    )
                    .unwrap();
            }

            match trade(&mut env, is_leverage, amount, seconds) {
                Ok(_) => landed += 1,
                Err(error) => {
                    prop_assert!(is_refused(&error), "unexpected {error:?}");
                }
            }
            assert_solvent(&env, seconds)?;

            let (_, _, short) = env.pool.total_positions(&env.option, env.key);
            let curve = env.pool.total_short(env.key, NOW + seconds).unwrap();
            let (_, _, protocol_short) = env.pool.protocol_fees_earned(env.key);
            prop_assert!(
                short >= curve + protocol_short + owed_to_providers(&env, &[ALICE, CAROL], seconds)
            );

            let next_fee_growth = env.pool.fee_growth(env.key);
            prop_assert!(next_fee_growth.0 >= fee_growth.0);
            prop_assert!(next_fee_growth.1 >= fee_growth.1);
            prop_assert!(next_fee_growth.2 >= fee_growth.2);
            fee_growth = next_fee_growth;

            let next_returned_growth = env
                .pool
                .short_returned_growth(env.key, NOW + seconds)
                .unwrap();
            prop_assert!(next_returned_growth >= returned_growth);
            returned_growth = next_returned_growth;
        }
        prop_assume!(landed > 0);

        for owner in [ALICE, CAROL] {
            let liquidity = env.pool.liquidity_of(env.key, owner);
            let before = env.position(owner, PositionType::Short);
            let param = PoolBurnParam {
                key: env.key,
                long0_to: owner,
                long1_to: owner,
                short_to: owner,
                transaction: PoolBurn::GivenLiquidity,
                delta: math::safe_cast::widen(liquidity),
                data: Bytes::new(),
            };

            let burned = env
                .pool
                .burn(
                    &mut env.option,
                    &mut env.tokens,
                    at(owner, DURATION),
                    param,
                    &mut Trader::new(owner),
                )
                .unwrap();

            prop_assert_eq!(burned.liquidity_amount, liquidity);
            prop_assert_eq!(
                env.position(owner, PositionType::Short),
                before + burned.short_fees + burned.short_returned
            );
        }
        prop_assert!(
            env.pool.short_returned_growth(env.key, NOW + DURATION).unwrap() >= returned_growth
        );

        let owed = env.pool.protocol_fees_earned(env.key);
        let collected = env
            .pool
            .collect_protocol_fees(
                &mut env.option,
                at(OWNER, DURATION),
                PoolCollectProtocolFeesParam {
                    key: env.key,
                    long0_to: OWNER,
                    long1_to: OWNER,
                    short_to: OWNER,
                    long0_requested: U256::MAX,
                    long1_requested: U256::MAX,
                    short_requested: U256::MAX,
                },
            )
            .unwrap();
        prop_assert_eq!(
            (collected.long0_amount, collected.long1_amount, collected.short_amount),
            owed
        );

        prop_assert_eq!(env.pool.total_liquidity(env.key), U160::ZERO);
        prop_assert_eq!(
            env.pool.protocol_fees_earned(env.key),
            (U256::ZERO, U256::ZERO, U256::ZERO)
        );
        for owner in [ALICE, CAROL] {
            prop_assert_eq!(
                env.pool.fees_earned_of(env.key, owner).unwrap(),
                (U256::ZERO, U256::ZERO, U256::ZERO)
            );
        }
        // only rounding dust of short is left behind
        let (_, _, short) = env.pool.total_positions(&env.option, env.key);
        prop_assert!(short <= U256::from(2 * landed + 8));
    }
}
