use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::amortization::LoanTotals;
use crate::decimal::Money;

/// how far along a loan is: whole installments covered and remaining balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstallmentProgress {
    /// floor(cumulative_paid / installment_value); the "cuota actual"
    pub installments_paid_off: u32,
    /// total payable minus cumulative paid; negative when overpaid
    pub balance: Money,
}

/// pure arithmetic over the cumulative paid amount and the loan totals
pub fn installment_progress(cumulative_paid: Money, totals: &LoanTotals) -> InstallmentProgress {
    let installments_paid_off = if totals.installment_value.is_positive() {
        let quotient = cumulative_paid.as_decimal() / totals.installment_value.as_decimal();
        // floor division; negative quotients (bad data) clamp to zero
        quotient.floor().to_u32().unwrap_or(0)
    } else {
        0
    };

    InstallmentProgress {
        installments_paid_off,
        balance: totals.total_payable - cumulative_paid,
    }
}
