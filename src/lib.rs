pub mod amortization;
pub mod book;
pub mod calendar;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod progress;
pub mod records;
pub mod reports;
pub mod status;
pub mod types;

// re-export key types
pub use amortization::{loan_totals, LoanTotals};
pub use book::{
    CashEntryEdit, LoanBook, LoanCard, NewLoan, NewPayment, PaymentDateEdit, PaymentEdit,
};
pub use calendar::{
    collection_days_elapsed, expected_installments, is_collection_day, maturity_date,
    overdue_installments,
};
pub use decimal::{Money, Rate};
pub use errors::{CobroError, Result};
pub use events::{Event, EventStore};
pub use ledger::{DailyLedgerRow, LedgerCalendar};
pub use progress::{installment_progress, InstallmentProgress};
pub use records::{CashEntry, Loan, Payment};
pub use reports::{ConsignacionesReport, DailySummary, WeeklySummary};
pub use status::{reevaluate, TotalRounding};
pub use types::{
    Actor, CashCategory, CashEntryId, ClientId, LoanId, LoanStatus, PaymentId, PaymentType, Role,
    UserId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
