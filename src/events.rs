use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CashCategory, CashEntryId, LoanId, LoanStatus, PaymentId, PaymentType, UserId};

/// all events emitted by loan-book mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // loan lifecycle
    LoanCreated {
        loan_id: LoanId,
        principal: Money,
        installment_count: u32,
        timestamp: DateTime<Utc>,
    },
    LoanDeleted {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    RouteOrderSwapped {
        loan_id: LoanId,
        other_loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentReceived {
        payment_id: PaymentId,
        loan_id: LoanId,
        amount: Money,
        payment_type: PaymentType,
        collector_id: UserId,
        timestamp: DateTime<Utc>,
    },
    PaymentUpdated {
        payment_id: PaymentId,
        loan_id: LoanId,
        old_amount: Money,
        new_amount: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentDeleted {
        payment_id: PaymentId,
        loan_id: LoanId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },

    // status change as a payment side-effect
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        cumulative_paid: Money,
        timestamp: DateTime<Utc>,
    },

    // cash-box events
    CashEntryRecorded {
        entry_id: CashEntryId,
        category: CashCategory,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    CashEntryUpdated {
        entry_id: CashEntryId,
        timestamp: DateTime<Utc>,
    },
    CashEntryDeleted {
        entry_id: CashEntryId,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
