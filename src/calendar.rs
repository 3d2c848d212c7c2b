use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Sunday is the sole non-collection day. Saturdays and holidays count;
/// this is the business's deliberate simplification, preserved exactly.
pub fn is_collection_day(date: NaiveDate) -> bool {
    date.weekday() != Weekday::Sun
}

/// count of non-Sunday days in the inclusive range [start, today]
///
/// A Sunday start date is still scanned as part of the range; the Sunday
/// rule decides which days count toward the total, not whether the start
/// is included. Returns 0 when `today < start`.
pub fn collection_days_elapsed(start: NaiveDate, today: NaiveDate) -> u32 {
    if today < start {
        return 0;
    }
    let mut count = 0;
    let mut cursor = start;
    while cursor <= today {
        if is_collection_day(cursor) {
            count += 1;
        }
        cursor += Duration::days(1);
    }
    count
}

/// installments that should have been covered by today
///
/// The start date itself is not a due installment; the first falls on the
/// first collection day after the start.
pub fn expected_installments(start: NaiveDate, today: NaiveDate) -> u32 {
    collection_days_elapsed(start, today).saturating_sub(1)
}

/// installments past due given how many are already paid off; never negative
pub fn overdue_installments(start: NaiveDate, today: NaiveDate, installments_paid_off: u32) -> u32 {
    expected_installments(start, today).saturating_sub(installments_paid_off)
}

/// projected final-installment date
///
/// Advances one calendar day at a time from the start, counting only
/// non-Sunday days, until `installment_count` have been added. The start
/// date is never one of the added days. Same Sunday semantics as
/// [`collection_days_elapsed`].
pub fn maturity_date(start: NaiveDate, installment_count: u32) -> NaiveDate {
    let mut cursor = start;
    let mut added = 0;
    while added < installment_count {
        cursor += Duration::days(1);
        if is_collection_day(cursor) {
            added += 1;
        }
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_elapsed_scenario_b() {
        // Monday 2024-03-04 through the following Sunday 2024-03-10:
        // 7 calendar days, one Sunday -> 6 collection days, 5 expected
        let start = date(2024, 3, 4);
        let today = date(2024, 3, 10);
        assert_eq!(collection_days_elapsed(start, today), 6);
        assert_eq!(expected_installments(start, today), 5);
        assert_eq!(overdue_installments(start, today, 3), 2);
    }

    #[test]
    fn test_no_installment_due_on_start_date() {
        let start = date(2024, 3, 4);
        assert_eq!(collection_days_elapsed(start, start), 1);
        assert_eq!(expected_installments(start, start), 0);
        assert_eq!(overdue_installments(start, start, 0), 0);
    }

    #[test]
    fn test_today_before_start() {
        let start = date(2024, 3, 4);
        assert_eq!(collection_days_elapsed(start, date(2024, 3, 1)), 0);
        assert_eq!(overdue_installments(start, date(2024, 3, 1), 0), 0);
    }

    #[test]
    fn test_sunday_start_is_scanned_but_not_counted() {
        // 2024-03-03 is a Sunday; Sunday through Monday has one counting day
        let sunday = date(2024, 3, 3);
        assert_eq!(collection_days_elapsed(sunday, sunday), 0);
        assert_eq!(collection_days_elapsed(sunday, date(2024, 3, 4)), 1);
    }

    #[test]
    fn test_overdue_never_negative() {
        let start = date(2024, 3, 4);
        let today = date(2024, 3, 10);
        // paid far ahead of schedule
        assert_eq!(overdue_installments(start, today, 50), 0);
    }

    #[test]
    fn test_full_week_counts_six_days() {
        // any Monday..Sunday window has exactly 6 collection days
        let start = date(2024, 1, 1); // Monday
        assert_eq!(collection_days_elapsed(start, date(2024, 1, 7)), 6);
        // two full weeks
        assert_eq!(collection_days_elapsed(start, date(2024, 1, 14)), 12);
    }

    #[test]
    fn test_maturity_date_skips_sundays() {
        // start Monday 2024-03-04, 6 cuotas: Tue..Sat then skip Sunday,
        // sixth lands Monday 2024-03-11
        assert_eq!(maturity_date(date(2024, 3, 4), 6), date(2024, 3, 11));
        // one cuota from a Saturday start skips the Sunday
        assert_eq!(maturity_date(date(2024, 3, 9), 1), date(2024, 3, 11));
    }

    #[test]
    fn test_maturity_date_start_never_counted() {
        let start = date(2024, 3, 4);
        assert_eq!(maturity_date(start, 0), start);
        assert_eq!(maturity_date(start, 1), date(2024, 3, 5));
    }

    #[test]
    fn test_maturity_consistent_with_elapsed() {
        // advancing n cuotas and counting back must agree: elapsed days on
        // the maturity date equal n + 1 when the start is a collection day
        let start = date(2024, 3, 4);
        for n in 1..30 {
            let due = maturity_date(start, n);
            assert_eq!(collection_days_elapsed(start, due), n + 1);
        }
    }
}
