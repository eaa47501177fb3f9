//! Constant-product (x*y=k) AMM math with exact calculations
//!
//! Preserves full precision using the Decimal type. No fee is applied:
//! the venue is fee-less, or the caller has already netted the fee out of
//! `amount_in`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use types::EngineError;

/// Constant-product math functions with zero precision loss
pub struct ConstantProductMath;

impl ConstantProductMath {
    /// Output amount preserving `reserve_in * reserve_out`
    ///
    /// Evaluates `reserve_out - k / (reserve_in + amount_in)` in the
    /// algebraically identical form
    /// `reserve_out * (amount_in / (reserve_in + amount_in))`, which cannot
    /// overflow and does not cancel digits when the output is a tiny
    /// fraction of a large reserve.
    ///
    /// # Arguments
    /// * `amount_in` - Input token amount
    /// * `reserve_in` - Input token reserve
    /// * `reserve_out` - Output token reserve
    pub fn output_amount(
        amount_in: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
    ) -> Result<Decimal, EngineError> {
        // Validate inputs
        if reserve_in <= dec!(0) || reserve_out <= dec!(0) {
            return Err(EngineError::InvalidPoolState {
                reserve_a: reserve_in,
                reserve_b: reserve_out,
            });
        }
        if amount_in <= dec!(0) {
            return Err(EngineError::invalid_input(format!(
                "input amount must be positive, got {}",
                amount_in
            )));
        }

        let new_reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or_else(|| EngineError::overflow("new input reserve"))?;

        let share_of_pool = amount_in
            .checked_div(new_reserve_in)
            .ok_or_else(|| EngineError::overflow("input share of pool"))?;

        reserve_out
            .checked_mul(share_of_pool)
            .ok_or_else(|| EngineError::overflow("output amount"))
    }

    /// Price impact of a trade as a percentage of the pre-trade marginal price
    ///
    /// `price_after / price_before` is evaluated as
    /// `(new_reserve_out / reserve_out) * (reserve_in / new_reserve_in)`. Both
    /// factors lie in (0, 1], so reserves many orders of magnitude apart
    /// cannot overflow the way `reserve_out / reserve_in` would.
    pub fn price_impact_pct(
        amount_in: Decimal,
        reserve_in: Decimal,
        reserve_out: Decimal,
    ) -> Result<Decimal, EngineError> {
        let amount_out = Self::output_amount(amount_in, reserve_in, reserve_out)?;

        let new_reserve_in = reserve_in
            .checked_add(amount_in)
            .ok_or_else(|| EngineError::overflow("new input reserve"))?;
        let out_retained = amount_out
            .checked_div(reserve_out)
            .map(|taken| Decimal::ONE - taken)
            .ok_or_else(|| EngineError::overflow("retained output reserve"))?;
        let in_dilution = reserve_in
            .checked_div(new_reserve_in)
            .ok_or_else(|| EngineError::overflow("input reserve dilution"))?;

        let price_ratio = out_retained
            .checked_mul(in_dilution)
            .ok_or_else(|| EngineError::overflow("post-trade price ratio"))?;

        // Price impact as percentage
        (Decimal::ONE - price_ratio)
            .abs()
            .checked_mul(dec!(100))
            .ok_or_else(|| EngineError::overflow("price impact"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_calculation() {
        // 100 in against 1000:2000, no fee: 2000 * 100 / 1100
        let output = ConstantProductMath::output_amount(dec!(100), dec!(1000), dec!(2000)).unwrap();
        assert!((output - dec!(181.8181818181)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_output_matches_invariant_form() {
        let (reserve_in, reserve_out, amount_in) = (dec!(40000), dec!(0.04), dec!(100));
        let output = ConstantProductMath::output_amount(amount_in, reserve_in, reserve_out).unwrap();

        let k = reserve_in * reserve_out;
        let via_invariant = reserve_out - k / (reserve_in + amount_in);
        assert!((output - via_invariant).abs() < dec!(0.0000000000000000000001));
    }

    #[test]
    fn test_tiny_output_keeps_precision() {
        // Output nine orders of magnitude below the reserve
        let output =
            ConstantProductMath::output_amount(dec!(0.000001), dec!(1000000), dec!(1000000000))
                .unwrap();
        assert!((output - dec!(0.000999999999999)).abs() < dec!(0.000000000000001));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            ConstantProductMath::output_amount(dec!(1), dec!(0), dec!(10)),
            Err(EngineError::InvalidPoolState { .. })
        ));
        assert!(matches!(
            ConstantProductMath::output_amount(dec!(0), dec!(10), dec!(10)),
            Err(EngineError::InvalidQuoteInput { .. })
        ));
    }

    #[test]
    fn test_price_impact() {
        let impact =
            ConstantProductMath::price_impact_pct(dec!(100), dec!(1000), dec!(2000)).unwrap();

        // Large trade should have noticeable impact
        assert!(impact > dec!(0));
        assert!(impact < dec!(20)); // But not extreme for 10% of reserves

        // 1 - (1000/1100)^2 for a fee-less pool
        let expected = (dec!(1) - (dec!(1000) / dec!(1100)) * (dec!(1000) / dec!(1100))) * dec!(100);
        assert!((impact - expected).abs() < dec!(0.0000000000000000001));
    }

    #[test]
    fn test_price_impact_with_extreme_reserve_ratio() {
        // reserve_out / reserve_in is 1e30, beyond Decimal's range
        let impact = ConstantProductMath::price_impact_pct(
            dec!(0.000000000001),
            dec!(0.0000000001),
            dec!(100000000000000000000),
        )
        .unwrap();
        assert!(impact > dec!(0) && impact < dec!(100));
    }
}
