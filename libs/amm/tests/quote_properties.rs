//! Constant-Product Quote Property Tests
//!
//! Properties every quote must satisfy for any valid pool and trade size.

use amm::{quote, ConstantProductMath, PoolState, SwapDirection};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::EngineError;

prop_compose! {
    fn reserve()
        (units in 100u64..100_000_000_000u64) -> Decimal {
        Decimal::new(units as i64, 2)
    }
}

prop_compose! {
    fn trade_amount()
        (units in 1u64..1_000_000_000u64) -> Decimal {
        Decimal::new(units as i64, 2)
    }
}

prop_compose! {
    /// Anywhere from 1e-18 to about 1e26
    fn extreme_reserve()
        (units in 1u64..1_000_000u64, exponent in -18i32..=20i32) -> Decimal {
        if exponent < 0 {
            Decimal::new(units as i64, exponent.unsigned_abs())
        } else {
            Decimal::from(units) * Decimal::from_i128_with_scale(10i128.pow(exponent as u32), 0)
        }
    }
}

fn direction() -> impl Strategy<Value = SwapDirection> {
    prop_oneof![Just(SwapDirection::AtoB), Just(SwapDirection::BtoA)]
}

proptest! {
    #[test]
    fn prop_invariant_is_preserved(
        reserve_in in reserve(),
        reserve_out in reserve(),
        amount_in in trade_amount(),
    ) {
        let out = ConstantProductMath::output_amount(amount_in, reserve_in, reserve_out).unwrap();
        prop_assert!(out > Decimal::ZERO);
        prop_assert!(out < reserve_out);

        let k_before = reserve_in * reserve_out;
        let k_after = (reserve_in + amount_in) * (reserve_out - out);
        let tolerance = k_before * dec!(0.000000000000000001);
        prop_assert!(
            (k_after - k_before).abs() <= tolerance,
            "k drifted from {} to {}", k_before, k_after
        );
    }

    #[test]
    fn prop_output_strictly_increases_with_input(
        reserve_in in reserve(),
        reserve_out in reserve(),
        smaller in trade_amount(),
        extra in trade_amount(),
    ) {
        let larger = smaller + extra;
        let out_small = ConstantProductMath::output_amount(smaller, reserve_in, reserve_out).unwrap();
        let out_large = ConstantProductMath::output_amount(larger, reserve_in, reserve_out).unwrap();
        prop_assert!(out_small < out_large);
    }

    #[test]
    fn prop_accepted_quotes_respect_drain_threshold(
        reserve_a in reserve(),
        reserve_b in reserve(),
        amount_in in trade_amount(),
        dir in direction(),
        slippage_bps in 0u32..=10_000u32,
    ) {
        let pool = PoolState::new(reserve_a, reserve_b);
        let (_, reserve_out) = pool.reserves_for(dir);

        match quote(&pool, amount_in, dir, slippage_bps) {
            Ok(q) => {
                prop_assert!(q.amount_out_estimate < reserve_out * dec!(0.99));
                prop_assert!(q.minimum_amount_out <= q.amount_out_estimate);
                prop_assert!(q.minimum_amount_out >= Decimal::ZERO);
                prop_assert!(q.price_impact_pct >= Decimal::ZERO);
            }
            Err(EngineError::InsufficientLiquidity { amount_out, .. }) => {
                prop_assert!(amount_out >= reserve_out * dec!(0.99));
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn prop_zero_slippage_keeps_estimate(
        reserve_a in reserve(),
        reserve_b in reserve(),
        amount_in in trade_amount(),
    ) {
        let pool = PoolState::new(reserve_a, reserve_b);
        if let Ok(q) = quote(&pool, amount_in, SwapDirection::AtoB, 0) {
            prop_assert!(q.amount_out_estimate - q.minimum_amount_out < dec!(0.000000000000000001));
        }
    }

    #[test]
    fn prop_extreme_reserve_ratios_return_typed_results(
        reserve_a in extreme_reserve(),
        reserve_b in extreme_reserve(),
        amount_in in extreme_reserve(),
        dir in direction(),
        slippage_bps in 0u32..=10_000u32,
    ) {
        let pool = PoolState::new(reserve_a, reserve_b);
        match quote(&pool, amount_in, dir, slippage_bps) {
            Ok(q) => {
                prop_assert!(q.amount_out_estimate >= Decimal::ZERO);
                prop_assert!(q.minimum_amount_out <= q.amount_out_estimate);
                prop_assert!(q.price_impact_pct >= Decimal::ZERO);
                prop_assert!(q.price_impact_pct <= dec!(100));
            }
            Err(EngineError::InsufficientLiquidity { .. })
            | Err(EngineError::ArithmeticOverflow { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
