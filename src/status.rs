use crate::amortization::loan_totals;
use crate::decimal::Money;
use crate::records::{Loan, Payment};
use crate::types::LoanStatus;

/// which rendition of the total payable the status comparison uses
///
/// The payment create and edit paths compare against the total truncated
/// toward zero; the delete path compares against the exact value. Both
/// behaviors are deliberate and pinned by regression tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalRounding {
    /// compare against the exact total payable
    Exact,
    /// compare against the total truncated to whole pesos
    Truncate,
}

/// decide the loan's status from its current payment set
///
/// Pure function of the cumulative payment sum: Inactive once the sum
/// reaches the total payable, Active otherwise. Re-evaluated after every
/// payment create, edit, and delete — reversible in both directions, so a
/// deleted payment can flip an Inactive loan back to Active.
pub fn reevaluate(loan: &Loan, payments: &[Payment], rounding: TotalRounding) -> LoanStatus {
    let cumulative: Money = payments
        .iter()
        .filter(|p| p.loan_id == loan.id)
        .map(|p| p.amount)
        .sum();

    let totals = loan_totals(loan.principal, loan.rate, loan.installment_count);
    let threshold = match rounding {
        TotalRounding::Exact => totals.total_payable,
        TotalRounding::Truncate => totals.total_payable_truncated(),
    };

    if cumulative >= threshold {
        LoanStatus::Inactive
    } else {
        LoanStatus::Active
    }
}
