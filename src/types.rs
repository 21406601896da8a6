use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::timeline::MonthKey;

/// unique identifier for a student
pub type StudentId = Uuid;

/// unique identifier for a class fee schedule
pub type ScheduleId = Uuid;

/// unique identifier for a one-off fee item
pub type FeeItemId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// coverage state of a billing period or one-off item after allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// nothing allocated yet
    Unpaid,
    /// some but not all of the expected amount allocated
    Partial,
    /// expected amount fully allocated
    Paid,
}

impl PeriodStatus {
    /// classify an allocated amount against what was expected
    pub fn classify(allocated: Money, expected: Money) -> Self {
        if allocated >= expected {
            PeriodStatus::Paid
        } else if allocated.is_positive() {
            PeriodStatus::Partial
        } else {
            PeriodStatus::Unpaid
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PeriodStatus::Paid)
    }
}

/// category tag of a one-off fee item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeCategory {
    Tuition,
    Exam,
    Event,
    Transport,
    Other,
}

/// how a payment was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Online,
}

/// one line of an allocation breakdown or outstanding list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub description: String,
    pub amount: Money,
}

impl BreakdownLine {
    pub fn new(description: impl Into<String>, amount: Money) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// a fallback path the engine took instead of failing on malformed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// no history entry starts on or before the month, earliest entry used
    HistoryFallbackToEarliest { month: MonthKey },
    /// resolved schedule no longer exists, current schedule fee used
    ScheduleMissing { schedule_id: ScheduleId, month: MonthKey },
    /// timeline hit the period cap and was cut short
    TimelineTruncated { cap: usize },
    /// student went inactive before being admitted
    InactivationBeforeAdmission,
}

/// sum of a sequence of breakdown lines
pub fn breakdown_total(lines: &[BreakdownLine]) -> Money {
    lines.iter().map(|line| line.amount).sum()
}
