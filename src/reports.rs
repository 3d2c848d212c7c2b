use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::ledger::LedgerCalendar;
use crate::records::{CashEntry, Loan, Payment};
use crate::types::{CashCategory, UserId};

/// per-collector slice of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorTotal {
    pub collector_id: UserId,
    pub amount: Money,
    pub count: usize,
}

/// per-category slice of the cash box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: CashCategory,
    pub amount: Money,
    pub count: usize,
}

/// per-day slice of the weekly report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub amount: Money,
    pub count: usize,
}

/// end-of-day summary: what came in, who collected it, what moved in caja
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub payments_sum: Money,
    pub payments_count: usize,
    pub loans_started: usize,
    pub by_collector: Vec<CollectorTotal>,
    pub cash_by_category: Vec<CategoryTotal>,
}

impl DailySummary {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// Monday-start week summary with a per-day breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    /// last day of the week, inclusive
    pub week_end: NaiveDate,
    pub week_number: u32,
    pub payments_sum: Money,
    pub payments_count: usize,
    pub loans_started: usize,
    pub by_collector: Vec<CollectorTotal>,
    pub by_day: Vec<DayTotal>,
}

impl WeeklySummary {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// bank-deposit payments (con-supervisor / con-jefe) for a day range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsignacionesReport {
    pub range_start: NaiveDate,
    /// exclusive
    pub range_end: NaiveDate,
    pub total: Money,
    pub payments: Vec<Payment>,
}

/// Monday of the reference date's week and the following Monday
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days_from_monday = reference.weekday().num_days_from_monday() as i64;
    let monday = reference - Duration::days(days_from_monday);
    (monday, monday + Duration::days(7))
}

fn collector_totals(payments: &[Payment]) -> Vec<CollectorTotal> {
    let mut by_collector: BTreeMap<UserId, (Money, usize)> = BTreeMap::new();
    for p in payments {
        let slot = by_collector.entry(p.collector_id).or_default();
        slot.0 += p.amount;
        slot.1 += 1;
    }
    by_collector
        .into_iter()
        .map(|(collector_id, (amount, count))| CollectorTotal {
            collector_id,
            amount,
            count,
        })
        .collect()
}

/// summary of one calendar day
pub fn daily_summary(
    calendar: LedgerCalendar,
    date: NaiveDate,
    loans: &[Loan],
    payments: &[Payment],
    entries: &[CashEntry],
) -> DailySummary {
    let day_payments: Vec<Payment> = payments
        .iter()
        .filter(|p| calendar.bucket(p.date) == date)
        .cloned()
        .collect();

    let mut cash: BTreeMap<&'static str, CategoryTotal> = BTreeMap::new();
    for entry in entries.iter().filter(|e| calendar.bucket(e.date) == date) {
        let key = match entry.category {
            CashCategory::Entrada => "ENTRADA",
            CashCategory::Salida => "SALIDA",
            CashCategory::Gasto => "GASTO",
            CashCategory::EntradaRuta => "ENTRADA_RUTA",
            CashCategory::SalidaRuta => "SALIDA_RUTA",
        };
        let slot = cash.entry(key).or_insert(CategoryTotal {
            category: entry.category,
            amount: Money::ZERO,
            count: 0,
        });
        slot.amount += entry.amount;
        slot.count += 1;
    }

    DailySummary {
        date,
        payments_sum: day_payments.iter().map(|p| p.amount).sum(),
        payments_count: day_payments.len(),
        loans_started: loans.iter().filter(|l| l.start_date == date).count(),
        by_collector: collector_totals(&day_payments),
        cash_by_category: cash.into_values().collect(),
    }
}

/// summary of the Monday-start week containing the reference date
pub fn weekly_summary(
    calendar: LedgerCalendar,
    reference: NaiveDate,
    loans: &[Loan],
    payments: &[Payment],
) -> WeeklySummary {
    let (week_start, next_monday) = week_bounds(reference);

    let week_payments: Vec<Payment> = payments
        .iter()
        .filter(|p| {
            let day = calendar.bucket(p.date);
            day >= week_start && day < next_monday
        })
        .cloned()
        .collect();

    let mut by_day: BTreeMap<NaiveDate, (Money, usize)> = BTreeMap::new();
    for p in &week_payments {
        let slot = by_day.entry(calendar.bucket(p.date)).or_default();
        slot.0 += p.amount;
        slot.1 += 1;
    }

    WeeklySummary {
        week_start,
        week_end: next_monday - Duration::days(1),
        week_number: week_start.iso_week().week(),
        payments_sum: week_payments.iter().map(|p| p.amount).sum(),
        payments_count: week_payments.len(),
        loans_started: loans
            .iter()
            .filter(|l| l.start_date >= week_start && l.start_date < next_monday)
            .count(),
        by_collector: collector_totals(&week_payments),
        by_day: by_day
            .into_iter()
            .map(|(date, (amount, count))| DayTotal {
                date,
                amount,
                count,
            })
            .collect(),
    }
}

/// bank-deposit payments for [range_start, range_end)
pub fn consignaciones(
    calendar: LedgerCalendar,
    range_start: NaiveDate,
    range_end: NaiveDate,
    payments: &[Payment],
) -> ConsignacionesReport {
    let matching: Vec<Payment> = payments
        .iter()
        .filter(|p| {
            let day = calendar.bucket(p.date);
            p.payment_type.is_consignacion() && day >= range_start && day < range_end
        })
        .cloned()
        .collect();

    ConsignacionesReport {
        range_start,
        range_end,
        total: matching.iter().map(|p| p.amount).sum(),
        payments: matching,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::{LoanStatus, PaymentType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(day: NaiveDate, amount: i64, ptype: PaymentType, collector: UserId) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            loan_id: Uuid::new_v4(),
            collector_id: collector,
            amount: Money::from_major(amount),
            payment_type: ptype,
            date: Utc
                .with_ymd_and_hms(day.year(), day.month(), day.day(), 14, 0, 0)
                .unwrap(),
            notes: None,
        }
    }

    fn loan_started(day: NaiveDate) -> Loan {
        Loan {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            collector_id: Uuid::new_v4(),
            principal: Money::from_major(200_000),
            rate: Rate::from_percentage(20),
            installment_count: 10,
            start_date: day,
            status: LoanStatus::Active,
            route_order: 1,
            notes: None,
            version: 0,
        }
    }

    #[test]
    fn test_week_bounds_monday_start() {
        // Thursday 2024-03-07 belongs to the week of Monday 2024-03-04
        let (start, end) = week_bounds(date(2024, 3, 7));
        assert_eq!(start, date(2024, 3, 4));
        assert_eq!(end, date(2024, 3, 11));
        assert_eq!(start.weekday(), Weekday::Mon);

        // a Monday is its own week start; a Sunday closes the prior week
        assert_eq!(week_bounds(date(2024, 3, 4)).0, date(2024, 3, 4));
        assert_eq!(week_bounds(date(2024, 3, 10)).0, date(2024, 3, 4));
    }

    #[test]
    fn test_daily_summary_groups_by_collector() {
        let ana = Uuid::new_v4();
        let luis = Uuid::new_v4();
        let day = date(2024, 3, 5);
        let payments = vec![
            payment(day, 50_000, PaymentType::Cash, ana),
            payment(day, 30_000, PaymentType::Cash, ana),
            payment(day, 20_000, PaymentType::WithBoss, luis),
            payment(date(2024, 3, 6), 99_000, PaymentType::Cash, ana),
        ];
        let loans = vec![loan_started(day), loan_started(date(2024, 3, 6))];

        let summary = daily_summary(LedgerCalendar::utc(), day, &loans, &payments, &[]);
        assert_eq!(summary.payments_sum, Money::from_major(100_000));
        assert_eq!(summary.payments_count, 3);
        assert_eq!(summary.loans_started, 1);
        assert_eq!(summary.by_collector.len(), 2);
        let ana_total = summary
            .by_collector
            .iter()
            .find(|c| c.collector_id == ana)
            .unwrap();
        assert_eq!(ana_total.amount, Money::from_major(80_000));
        assert_eq!(ana_total.count, 2);
    }

    #[test]
    fn test_daily_summary_cash_by_category() {
        let day = date(2024, 3, 5);
        let entries = vec![
            CashEntry {
                id: Uuid::new_v4(),
                date: Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
                category: CashCategory::Gasto,
                amount: Money::from_major(7_000),
                note: Some("gasolina".to_string()),
            },
            CashEntry {
                id: Uuid::new_v4(),
                date: Utc.with_ymd_and_hms(2024, 3, 5, 17, 0, 0).unwrap(),
                category: CashCategory::Gasto,
                amount: Money::from_major(3_000),
                note: None,
            },
        ];
        let summary = daily_summary(LedgerCalendar::utc(), day, &[], &[], &entries);
        assert_eq!(summary.cash_by_category.len(), 1);
        assert_eq!(summary.cash_by_category[0].amount, Money::from_major(10_000));
        assert_eq!(summary.cash_by_category[0].count, 2);
    }

    #[test]
    fn test_weekly_summary_by_day() {
        let collector = Uuid::new_v4();
        let payments = vec![
            payment(date(2024, 3, 4), 10_000, PaymentType::Cash, collector),
            payment(date(2024, 3, 6), 20_000, PaymentType::Cash, collector),
            payment(date(2024, 3, 6), 5_000, PaymentType::Cash, collector),
            // next week, excluded
            payment(date(2024, 3, 11), 99_000, PaymentType::Cash, collector),
        ];

        let summary = weekly_summary(LedgerCalendar::utc(), date(2024, 3, 7), &[], &payments);
        assert_eq!(summary.week_start, date(2024, 3, 4));
        assert_eq!(summary.week_end, date(2024, 3, 10));
        assert_eq!(summary.week_number, 10);
        assert_eq!(summary.payments_sum, Money::from_major(35_000));
        assert_eq!(summary.by_day.len(), 2);
        assert_eq!(summary.by_day[1].date, date(2024, 3, 6));
        assert_eq!(summary.by_day[1].amount, Money::from_major(25_000));
        assert_eq!(summary.by_day[1].count, 2);
    }

    #[test]
    fn test_consignaciones_filters_cash() {
        let collector = Uuid::new_v4();
        let day = date(2024, 3, 5);
        let payments = vec![
            payment(day, 50_000, PaymentType::Cash, collector),
            payment(day, 30_000, PaymentType::WithSupervisor, collector),
            payment(day, 20_000, PaymentType::WithBoss, collector),
        ];

        let report = consignaciones(
            LedgerCalendar::utc(),
            day,
            day + Duration::days(1),
            &payments,
        );
        assert_eq!(report.total, Money::from_major(50_000));
        assert_eq!(report.payments.len(), 2);
    }

    #[test]
    fn test_summary_json_view() {
        let summary = daily_summary(LedgerCalendar::utc(), date(2024, 3, 5), &[], &[], &[]);
        let json = summary.to_json_pretty();
        assert!(json.contains("\"payments_count\": 0"));
    }
}
