use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::{loan_totals, LoanTotals};
use crate::calendar::{maturity_date, overdue_installments};
use crate::decimal::{Money, Rate};
use crate::errors::{CobroError, Result};
use crate::events::{Event, EventStore};
use crate::ledger::{self, DailyLedgerRow, LedgerCalendar};
use crate::progress::{installment_progress, InstallmentProgress};
use crate::records::{CashEntry, Loan, Payment};
use crate::reports::{self, ConsignacionesReport, DailySummary, WeeklySummary};
use crate::status::{reevaluate, TotalRounding};
use crate::types::{
    Actor, CashCategory, CashEntryId, ClientId, LoanId, LoanStatus, PaymentId, PaymentType, Role,
    UserId,
};

/// request to register a loan
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub client_id: ClientId,
    pub collector_id: UserId,
    pub principal: Money,
    pub rate: Rate,
    pub installment_count: u32,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

/// request to register a payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub loan_id: LoanId,
    pub amount: Money,
    pub payment_type: PaymentType,
    /// defaults to the provided clock's now
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// date edit on an existing payment
///
/// Payments carry a full timestamp, but edit forms often post only a
/// date. A date-only edit keeps the stored timestamp so the time
/// component is not silently lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDateEdit {
    /// replace the stored instant
    Instant(DateTime<Utc>),
    /// keep the stored instant, the caller only knew the day
    DateOnly(NaiveDate),
}

/// admin edit of an existing payment; None leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct PaymentEdit {
    pub loan_id: Option<LoanId>,
    pub amount: Option<Money>,
    pub payment_type: Option<PaymentType>,
    pub date: Option<PaymentDateEdit>,
    pub notes: Option<Option<String>>,
}

/// admin edit of a cash entry; None leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct CashEntryEdit {
    pub date: Option<DateTime<Utc>>,
    pub category: Option<CashCategory>,
    pub amount: Option<Money>,
    pub note: Option<Option<String>>,
}

/// snapshot view of a loan for the client card: totals, progress, and
/// the collection-calendar numbers, all computed from current payments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanCard {
    pub loan: Loan,
    pub totals: LoanTotals,
    pub cumulative_paid: Money,
    pub progress: InstallmentProgress,
    pub overdue_installments: u32,
    pub maturity_date: NaiveDate,
}

impl LoanCard {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// in-process aggregate over loans, payments, and the cash box
///
/// Mutations take an explicit [`Actor`] for role checks and an optional
/// expected loan version: the compare-and-set stand-in for the row lock
/// the storage layer would take, so two concurrent payments against a
/// loan sitting at the status boundary cannot both land.
#[derive(Debug, Default)]
pub struct LoanBook {
    loans: BTreeMap<LoanId, Loan>,
    payments: BTreeMap<PaymentId, Payment>,
    cash_entries: BTreeMap<CashEntryId, CashEntry>,
    pub events: EventStore,
}

fn require_admin(actor: Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CobroError::NotAuthorized {
            required: Role::Admin,
            actual: actor.role,
        })
    }
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- reads ----

    pub fn loan(&self, id: LoanId) -> Result<&Loan> {
        self.loans.get(&id).ok_or(CobroError::LoanNotFound { id })
    }

    /// loans in collection-route order
    pub fn loans_by_route(&self) -> Vec<&Loan> {
        let mut loans: Vec<&Loan> = self.loans.values().collect();
        loans.sort_by_key(|l| l.route_order);
        loans
    }

    pub fn payment(&self, id: PaymentId) -> Result<&Payment> {
        self.payments
            .get(&id)
            .ok_or(CobroError::PaymentNotFound { id })
    }

    /// payments of one loan, oldest first
    pub fn payments_for(&self, loan_id: LoanId) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments
            .values()
            .filter(|p| p.loan_id == loan_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.date);
        payments
    }

    pub fn cash_entry(&self, id: CashEntryId) -> Result<&CashEntry> {
        self.cash_entries
            .get(&id)
            .ok_or(CobroError::CashEntryNotFound { id })
    }

    fn cumulative_paid(&self, loan_id: LoanId) -> Money {
        self.payments
            .values()
            .filter(|p| p.loan_id == loan_id)
            .map(|p| p.amount)
            .sum()
    }

    /// everything the client card shows, as of `today`
    pub fn loan_card(&self, loan_id: LoanId, today: NaiveDate) -> Result<LoanCard> {
        let loan = self.loan(loan_id)?.clone();
        let totals = loan_totals(loan.principal, loan.rate, loan.installment_count);
        let cumulative_paid = self.cumulative_paid(loan_id);
        let progress = installment_progress(cumulative_paid, &totals);
        let overdue =
            overdue_installments(loan.start_date, today, progress.installments_paid_off);
        let maturity = maturity_date(loan.start_date, loan.installment_count);

        Ok(LoanCard {
            totals,
            cumulative_paid,
            progress,
            overdue_installments: overdue,
            maturity_date: maturity,
            loan,
        })
    }

    // ---- loan mutations ----

    pub fn create_loan(
        &mut self,
        actor: Actor,
        new_loan: NewLoan,
        time: &SafeTimeProvider,
    ) -> Result<LoanId> {
        require_admin(actor)?;

        if new_loan.installment_count == 0 {
            return Err(CobroError::validation("cuotas must be at least 1"));
        }
        if !new_loan.principal.is_positive() {
            return Err(CobroError::validation("principal must be positive"));
        }
        if new_loan.rate.as_decimal().is_sign_negative() {
            return Err(CobroError::validation("rate must not be negative"));
        }

        let id = Uuid::new_v4();
        let route_order = self
            .loans
            .values()
            .map(|l| l.route_order)
            .max()
            .map_or(1, |max| max + 1);

        let loan = Loan {
            id,
            client_id: new_loan.client_id,
            collector_id: new_loan.collector_id,
            principal: new_loan.principal,
            rate: new_loan.rate,
            installment_count: new_loan.installment_count,
            start_date: new_loan.start_date,
            status: LoanStatus::Active,
            route_order,
            notes: new_loan.notes,
            version: 0,
        };

        self.events.emit(Event::LoanCreated {
            loan_id: id,
            principal: loan.principal,
            installment_count: loan.installment_count,
            timestamp: time.now(),
        });
        self.loans.insert(id, loan);

        Ok(id)
    }

    /// referential guard: a loan with payments cannot be deleted
    pub fn delete_loan(&mut self, actor: Actor, id: LoanId, time: &SafeTimeProvider) -> Result<()> {
        require_admin(actor)?;
        self.loan(id)?;

        let payment_count = self.payments.values().filter(|p| p.loan_id == id).count();
        if payment_count > 0 {
            return Err(CobroError::LoanHasPayments { id, payment_count });
        }

        self.loans.remove(&id);
        self.events.emit(Event::LoanDeleted {
            loan_id: id,
            timestamp: time.now(),
        });
        Ok(())
    }

    /// exchange the route positions of two loans (drag-and-drop reorder)
    pub fn swap_route_order(
        &mut self,
        actor: Actor,
        a: LoanId,
        b: LoanId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        require_admin(actor)?;
        let order_a = self.loan(a)?.route_order;
        let order_b = self.loan(b)?.route_order;

        if let Some(loan) = self.loans.get_mut(&a) {
            loan.route_order = order_b;
        }
        if let Some(loan) = self.loans.get_mut(&b) {
            loan.route_order = order_a;
        }
        self.events.emit(Event::RouteOrderSwapped {
            loan_id: a,
            other_loan_id: b,
            timestamp: time.now(),
        });
        Ok(())
    }

    // ---- payment mutations ----

    /// register an abono against an active loan
    ///
    /// The whole check-insert-reevaluate sequence runs against one loan
    /// version: callers racing on the same loan must present the version
    /// they read, and the loser gets a retryable conflict instead of
    /// slipping a payment past the status boundary.
    pub fn create_payment(
        &mut self,
        actor: Actor,
        new_payment: NewPayment,
        expected_version: Option<u64>,
        time: &SafeTimeProvider,
    ) -> Result<PaymentId> {
        let loan = self.loan(new_payment.loan_id)?;

        if let Some(expected) = expected_version {
            if loan.version != expected {
                return Err(CobroError::ConcurrencyConflict {
                    expected,
                    found: loan.version,
                });
            }
        }
        if loan.status == LoanStatus::Inactive {
            return Err(CobroError::LoanInactive { id: loan.id });
        }
        if !new_payment.amount.is_positive() {
            return Err(CobroError::validation("payment amount must be positive"));
        }

        let id = Uuid::new_v4();
        let payment = Payment {
            id,
            loan_id: new_payment.loan_id,
            collector_id: actor.user_id,
            amount: new_payment.amount,
            payment_type: new_payment.payment_type,
            date: new_payment.date.unwrap_or_else(|| time.now()),
            notes: new_payment.notes,
        };
        self.payments.insert(id, payment);

        self.events.emit(Event::PaymentReceived {
            payment_id: id,
            loan_id: new_payment.loan_id,
            amount: new_payment.amount,
            payment_type: new_payment.payment_type,
            collector_id: actor.user_id,
            timestamp: time.now(),
        });

        self.apply_status(new_payment.loan_id, TotalRounding::Truncate, time)?;
        self.bump_version(new_payment.loan_id);
        Ok(id)
    }

    /// admin edit; re-evaluates status of every loan the payment touches
    pub fn update_payment(
        &mut self,
        actor: Actor,
        id: PaymentId,
        edit: PaymentEdit,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        require_admin(actor)?;
        let old = self.payment(id)?.clone();

        if let Some(amount) = edit.amount {
            if !amount.is_positive() {
                return Err(CobroError::validation("payment amount must be positive"));
            }
        }
        if let Some(target) = edit.loan_id {
            self.loan(target)?;
        }

        let payment = self
            .payments
            .get_mut(&id)
            .ok_or(CobroError::PaymentNotFound { id })?;
        if let Some(loan_id) = edit.loan_id {
            payment.loan_id = loan_id;
        }
        if let Some(amount) = edit.amount {
            payment.amount = amount;
        }
        if let Some(payment_type) = edit.payment_type {
            payment.payment_type = payment_type;
        }
        match edit.date {
            Some(PaymentDateEdit::Instant(instant)) => payment.date = instant,
            // date-only input: the stored timestamp wins
            Some(PaymentDateEdit::DateOnly(_)) | None => {}
        }
        if let Some(notes) = edit.notes {
            payment.notes = notes;
        }
        let new_loan_id = payment.loan_id;
        let new_amount = payment.amount;

        self.events.emit(Event::PaymentUpdated {
            payment_id: id,
            loan_id: new_loan_id,
            old_amount: old.amount,
            new_amount,
            timestamp: time.now(),
        });

        self.apply_status(new_loan_id, TotalRounding::Truncate, time)?;
        self.bump_version(new_loan_id);
        if old.loan_id != new_loan_id {
            self.apply_status(old.loan_id, TotalRounding::Truncate, time)?;
            self.bump_version(old.loan_id);
        }
        Ok(())
    }

    /// admin delete; can flip an inactive loan back to active
    pub fn delete_payment(
        &mut self,
        actor: Actor,
        id: PaymentId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        require_admin(actor)?;
        let payment = self.payment(id)?.clone();

        self.payments.remove(&id);
        self.events.emit(Event::PaymentDeleted {
            payment_id: id,
            loan_id: payment.loan_id,
            amount: payment.amount,
            timestamp: time.now(),
        });

        // the delete path compares against the exact total, not the
        // truncated one the create/edit paths use
        self.apply_status(payment.loan_id, TotalRounding::Exact, time)?;
        self.bump_version(payment.loan_id);
        Ok(())
    }

    fn apply_status(
        &mut self,
        loan_id: LoanId,
        rounding: TotalRounding,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let loan = self.loan(loan_id)?;
        let payments = self.payments_for(loan_id);
        let new_status = reevaluate(loan, &payments, rounding);

        if new_status != loan.status {
            let old_status = loan.status;
            let cumulative_paid = self.cumulative_paid(loan_id);
            if let Some(loan) = self.loans.get_mut(&loan_id) {
                loan.status = new_status;
            }
            self.events.emit(Event::StatusChanged {
                loan_id,
                old_status,
                new_status,
                cumulative_paid,
                timestamp: time.now(),
            });
        }
        Ok(())
    }

    fn bump_version(&mut self, loan_id: LoanId) {
        if let Some(loan) = self.loans.get_mut(&loan_id) {
            loan.version += 1;
        }
    }

    // ---- cash-box mutations ----

    pub fn create_cash_entry(
        &mut self,
        actor: Actor,
        date: DateTime<Utc>,
        category: CashCategory,
        amount: Money,
        note: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<CashEntryId> {
        require_admin(actor)?;
        if !amount.is_positive() {
            return Err(CobroError::validation("cash amount must be positive"));
        }

        let id = Uuid::new_v4();
        self.cash_entries.insert(
            id,
            CashEntry {
                id,
                date,
                category,
                amount,
                note,
            },
        );
        self.events.emit(Event::CashEntryRecorded {
            entry_id: id,
            category,
            amount,
            timestamp: time.now(),
        });
        Ok(id)
    }

    pub fn update_cash_entry(
        &mut self,
        actor: Actor,
        id: CashEntryId,
        edit: CashEntryEdit,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        require_admin(actor)?;
        if let Some(amount) = edit.amount {
            if !amount.is_positive() {
                return Err(CobroError::validation("cash amount must be positive"));
            }
        }

        let entry = self
            .cash_entries
            .get_mut(&id)
            .ok_or(CobroError::CashEntryNotFound { id })?;
        if let Some(date) = edit.date {
            entry.date = date;
        }
        if let Some(category) = edit.category {
            entry.category = category;
        }
        if let Some(amount) = edit.amount {
            entry.amount = amount;
        }
        if let Some(note) = edit.note {
            entry.note = note;
        }

        self.events.emit(Event::CashEntryUpdated {
            entry_id: id,
            timestamp: time.now(),
        });
        Ok(())
    }

    pub fn delete_cash_entry(
        &mut self,
        actor: Actor,
        id: CashEntryId,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        require_admin(actor)?;
        self.cash_entry(id)?;
        self.cash_entries.remove(&id);
        self.events.emit(Event::CashEntryDeleted {
            entry_id: id,
            timestamp: time.now(),
        });
        Ok(())
    }

    // ---- reports ----

    fn loan_rows(&self) -> Vec<Loan> {
        self.loans.values().cloned().collect()
    }

    fn payment_rows(&self) -> Vec<Payment> {
        self.payments.values().cloned().collect()
    }

    fn cash_rows(&self) -> Vec<CashEntry> {
        self.cash_entries.values().cloned().collect()
    }

    /// full cash history, newest first, with today's in-progress bucket
    pub fn cash_history(
        &self,
        calendar: LedgerCalendar,
        time: &SafeTimeProvider,
    ) -> Vec<DailyLedgerRow> {
        ledger::build_history(
            calendar,
            calendar.bucket(time.now()),
            &self.loan_rows(),
            &self.payment_rows(),
            &self.cash_rows(),
        )
    }

    /// bounded window with an absolute running balance
    pub fn cash_window(
        &self,
        calendar: LedgerCalendar,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Vec<DailyLedgerRow> {
        let loans = self.loan_rows();
        let payments = self.payment_rows();
        let entries = self.cash_rows();
        let prior = ledger::prior_balance(calendar, range_start, &loans, &payments, &entries);
        ledger::build_window(
            calendar,
            range_start,
            range_end,
            prior,
            &loans,
            &payments,
            &entries,
        )
    }

    pub fn daily_summary(&self, calendar: LedgerCalendar, date: NaiveDate) -> DailySummary {
        reports::daily_summary(
            calendar,
            date,
            &self.loan_rows(),
            &self.payment_rows(),
            &self.cash_rows(),
        )
    }

    pub fn weekly_summary(&self, calendar: LedgerCalendar, reference: NaiveDate) -> WeeklySummary {
        reports::weekly_summary(calendar, reference, &self.loan_rows(), &self.payment_rows())
    }

    pub fn consignaciones(
        &self,
        calendar: LedgerCalendar,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> ConsignacionesReport {
        reports::consignaciones(calendar, range_start, range_end, &self.payment_rows())
    }

    /// take events collected since the last call
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}
