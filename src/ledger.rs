use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::records::{CashEntry, Loan, Payment};
use crate::types::CashCategory;

/// day-bucketing calendar with an explicit UTC offset
///
/// Every bucketing call goes through a caller-supplied offset; nothing in
/// the crate infers a timezone from the server locale. Bucket boundaries
/// are midnight in the supplied offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCalendar {
    offset: FixedOffset,
}

impl LedgerCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// calendar with UTC day boundaries
    pub fn utc() -> Self {
        Self {
            offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
        }
    }

    /// Colombia (UTC-5), the business's home offset
    pub fn bogota() -> Self {
        Self {
            offset: FixedOffset::west_opt(5 * 3600).expect("UTC-5 is valid"),
        }
    }

    /// local calendar day an instant falls on
    pub fn bucket(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

/// one day of the cash report: loan money out, collections and manual
/// movements in/out, the day's net, and the cumulative box balance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLedgerRow {
    pub date: NaiveDate,
    /// sum of principals of loans started this day
    pub disbursed: Money,
    /// sum of payments received this day
    pub collected: Money,
    pub entradas: Money,
    pub salidas: Money,
    pub gastos: Money,
    pub entradas_ruta: Money,
    pub salidas_ruta: Money,
    /// collected + entradas + entradas_ruta
    /// − disbursed − salidas − gastos − salidas_ruta
    pub net_change: Money,
    /// previous day's balance plus this day's net ("caja fin del día")
    pub running_balance: Money,
}

#[derive(Debug, Clone, Copy, Default)]
struct DayBucket {
    disbursed: Money,
    collected: Money,
    entradas: Money,
    salidas: Money,
    gastos: Money,
    entradas_ruta: Money,
    salidas_ruta: Money,
}

impl DayBucket {
    fn net_change(&self) -> Money {
        self.collected + self.entradas + self.entradas_ruta
            - self.disbursed
            - self.salidas
            - self.gastos
            - self.salidas_ruta
    }

    fn add_entry(&mut self, entry: &CashEntry) {
        match entry.category {
            CashCategory::Entrada => self.entradas += entry.amount,
            CashCategory::Salida => self.salidas += entry.amount,
            CashCategory::Gasto => self.gastos += entry.amount,
            CashCategory::EntradaRuta => self.entradas_ruta += entry.amount,
            CashCategory::SalidaRuta => self.salidas_ruta += entry.amount,
        }
    }

    fn into_row(self, date: NaiveDate, running_balance: Money) -> DailyLedgerRow {
        DailyLedgerRow {
            date,
            disbursed: self.disbursed,
            collected: self.collected,
            entradas: self.entradas,
            salidas: self.salidas,
            gastos: self.gastos,
            entradas_ruta: self.entradas_ruta,
            salidas_ruta: self.salidas_ruta,
            net_change: self.net_change(),
            running_balance,
        }
    }
}

/// bucket every record by its local calendar day
fn bucket_activity(
    calendar: LedgerCalendar,
    loans: &[Loan],
    payments: &[Payment],
    entries: &[CashEntry],
) -> BTreeMap<NaiveDate, DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for loan in loans {
        // start dates are already calendar days, no instant to convert
        let bucket = buckets.entry(loan.start_date).or_default();
        bucket.disbursed += loan.principal;
    }
    for payment in payments {
        let bucket = buckets.entry(calendar.bucket(payment.date)).or_default();
        bucket.collected += payment.amount;
    }
    for entry in entries {
        buckets
            .entry(calendar.bucket(entry.date))
            .or_default()
            .add_entry(entry);
    }

    buckets
}

/// ledger for a bounded window [range_start, range_end)
///
/// Every day in the window materializes, zero-activity days included.
/// `prior_balance` seeds the running balance; callers that only need a
/// relative view may pass zero. Rows are ordered oldest to newest.
pub fn build_window(
    calendar: LedgerCalendar,
    range_start: NaiveDate,
    range_end: NaiveDate,
    prior_balance: Money,
    loans: &[Loan],
    payments: &[Payment],
    entries: &[CashEntry],
) -> Vec<DailyLedgerRow> {
    let buckets = bucket_activity(calendar, loans, payments, entries);

    let mut rows = Vec::new();
    let mut balance = prior_balance;
    let mut cursor = range_start;
    while cursor < range_end {
        let bucket = buckets.get(&cursor).copied().unwrap_or_default();
        balance += bucket.net_change();
        rows.push(bucket.into_row(cursor, balance));
        cursor += Duration::days(1);
    }
    rows
}

/// unbounded historical ledger as of a reference day
///
/// Only days with at least one underlying record materialize (union of
/// distinct activity days across loans, payments, and cash entries),
/// except `as_of` itself, which is always included so a live view can show
/// the in-progress day. Days after `as_of` are dropped. The running
/// balance accumulates chronologically from zero at the dawn of recorded
/// history; rows come back newest-first for presentation.
pub fn build_history(
    calendar: LedgerCalendar,
    as_of: NaiveDate,
    loans: &[Loan],
    payments: &[Payment],
    entries: &[CashEntry],
) -> Vec<DailyLedgerRow> {
    let mut buckets = bucket_activity(calendar, loans, payments, entries);
    buckets.retain(|day, _| *day <= as_of);
    buckets.entry(as_of).or_default();

    let mut rows = Vec::with_capacity(buckets.len());
    let mut balance = Money::ZERO;
    for (day, bucket) in buckets {
        balance += bucket.net_change();
        rows.push(bucket.into_row(day, balance));
    }
    rows.reverse();
    rows
}

/// net change accumulated over all activity strictly before a date
///
/// Same formula as the daily rows; callers use this to seed
/// [`build_window`] with an absolute balance instead of a relative one.
pub fn prior_balance(
    calendar: LedgerCalendar,
    before: NaiveDate,
    loans: &[Loan],
    payments: &[Payment],
    entries: &[CashEntry],
) -> Money {
    bucket_activity(calendar, loans, payments, entries)
        .into_iter()
        .filter(|(day, _)| *day < before)
        .map(|(_, bucket)| bucket.net_change())
        .sum()
}
