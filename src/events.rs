use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{PaymentId, ScheduleId, StudentId};

/// events emitted by collaborator operations run through the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    PaymentRecorded {
        payment_id: PaymentId,
        student_id: StudentId,
        amount: Money,
        excess: Money,
        timestamp: DateTime<Utc>,
    },
    StudentPromoted {
        student_id: StudentId,
        from_schedule: ScheduleId,
        to_schedule: ScheduleId,
        effective_from: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    BulkFeeApplied {
        schedule_id: ScheduleId,
        title: String,
        amount: Money,
        students: usize,
        timestamp: DateTime<Utc>,
    },
    StudentDeactivated {
        student_id: StudentId,
        inactive_since: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    StudentReactivated {
        student_id: StudentId,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
