use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// computed totals for a loan: what the client owes in all and per cuota
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTotals {
    /// principal * (1 + rate), exact
    pub total_payable: Money,
    /// total payable split evenly across the installments; zero when the
    /// installment count is zero
    pub installment_value: Money,
}

impl LoanTotals {
    /// total payable truncated toward zero to whole pesos
    ///
    /// Only the status checks on payment create and edit compare against
    /// this value; the delete path and all display math use the exact
    /// total. See [`crate::status::TotalRounding`].
    pub fn total_payable_truncated(&self) -> Money {
        self.total_payable.trunc_to_unit()
    }
}

/// compute total payable and per-installment value for a flat-rate loan
///
/// The rate is applied once over the full term, not compounding. No
/// rounding happens here; an installment count of zero yields a zero
/// installment value rather than an error.
pub fn loan_totals(principal: Money, rate: Rate, installment_count: u32) -> LoanTotals {
    let total_payable = principal * rate.gross_factor();
    let installment_value = if installment_count > 0 {
        total_payable / Decimal::from(installment_count)
    } else {
        Money::ZERO
    };

    LoanTotals {
        total_payable,
        installment_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_totals_scenario_a() {
        // 500,000 at 30% over 5 cuotas
        let totals = loan_totals(Money::from_major(500_000), Rate::from_decimal(dec!(0.3)), 5);
        assert_eq!(totals.total_payable, Money::from_major(650_000));
        assert_eq!(totals.installment_value, Money::from_major(130_000));
    }

    #[test]
    fn test_total_is_exact_product() {
        let totals = loan_totals(
            Money::from_major(1_000_000),
            Rate::from_decimal(dec!(0.2)),
            10,
        );
        assert_eq!(totals.total_payable, Money::from_major(1_200_000));
        assert_eq!(totals.installment_value, Money::from_major(120_000));
    }

    #[test]
    fn test_installments_reassemble_total() {
        // installment_value * count == total_payable within display rounding
        let totals = loan_totals(Money::from_major(700_000), Rate::from_decimal(dec!(0.25)), 7);
        let reassembled = totals.installment_value * dec!(7);
        assert_eq!(
            reassembled.round_dp(2),
            totals.total_payable.round_dp(2)
        );
    }

    #[test]
    fn test_zero_installments_guard() {
        let totals = loan_totals(Money::from_major(100_000), Rate::from_decimal(dec!(0.2)), 0);
        assert_eq!(totals.total_payable, Money::from_major(120_000));
        assert_eq!(totals.installment_value, Money::ZERO);
    }

    #[test]
    fn test_truncated_total() {
        // 100,001 at 10.5% -> 110,501.105; truncation drops the fraction
        let totals = loan_totals(
            Money::from_major(100_001),
            Rate::from_decimal(dec!(0.105)),
            3,
        );
        assert_eq!(totals.total_payable, Money::from_decimal(dec!(110501.105)));
        assert_eq!(totals.total_payable_truncated(), Money::from_major(110_501));
    }

    #[test]
    fn test_zero_rate() {
        let totals = loan_totals(Money::from_major(50_000), Rate::ZERO, 5);
        assert_eq!(totals.total_payable, Money::from_major(50_000));
        assert_eq!(totals.installment_value, Money::from_major(10_000));
    }
}
