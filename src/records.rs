use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{
    CashCategory, CashEntryId, ClientId, LoanId, LoanStatus, PaymentId, PaymentType, UserId,
};

/// a loan (préstamo)
///
/// `status` is a cached derived field: Inactive exactly when cumulative
/// payments reached the total payable at the last evaluation. It is stored
/// so listings and reports read it cheaply, and recomputed inside the same
/// mutation as any payment create/edit/delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub client_id: ClientId,
    pub collector_id: UserId,
    /// amount lent (monto prestado)
    pub principal: Money,
    /// flat fractional rate applied once over the full term
    pub rate: Rate,
    /// number of installments (cuotas), at least 1
    pub installment_count: u32,
    /// first collection day is the first non-Sunday after this date
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    /// position in the collection route, swappable by the admin
    pub route_order: u32,
    pub notes: Option<String>,
    /// bumped on every mutation touching this loan or its payments
    pub version: u64,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

/// an installment payment (abono)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    /// who recorded it
    pub collector_id: UserId,
    /// always positive
    pub amount: Money,
    pub payment_type: PaymentType,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// a manual cash-box movement (caja); independent of loans and payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashEntry {
    pub id: CashEntryId,
    pub date: DateTime<Utc>,
    pub category: CashCategory,
    /// always positive; the category decides the sign in the ledger
    pub amount: Money,
    pub note: Option<String>,
}
