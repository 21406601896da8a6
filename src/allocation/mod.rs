pub mod waterfall;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::timeline::MonthKey;
use crate::types::{breakdown_total, BreakdownLine, FeeItemId, PeriodStatus};

pub use waterfall::{AllocationEngine, AllocationPriority};

pub const PARTIAL_SUFFIX: &str = " (Partial)";
pub const PERIOD_PREVIEW_SUFFIX: &str = " (Tuit.+Trans.)";
pub const DEFAULT_EXCESS_LABEL: &str = "Excess / Advance Credit";

/// what an obligation is owed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObligationKind {
    Period(MonthKey),
    Item(FeeItemId),
}

/// an amount owed, with whatever has already been applied to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub kind: ObligationKind,
    /// base description, e.g. "January 2024 Fee" or the item title
    pub label: String,
    pub expected: Money,
    pub settled: Money,
}

impl Obligation {
    pub fn period(month: MonthKey, expected: Money) -> Self {
        Self {
            kind: ObligationKind::Period(month),
            label: format!("{} Fee", month.long_name()),
            expected,
            settled: Money::ZERO,
        }
    }

    pub fn item(id: FeeItemId, title: impl Into<String>, amount: Money) -> Self {
        Self {
            kind: ObligationKind::Item(id),
            label: title.into(),
            expected: amount,
            settled: Money::ZERO,
        }
    }

    pub fn with_settled(mut self, settled: Money) -> Self {
        self.settled = settled;
        self
    }

    /// still owed, never below zero
    pub fn remaining(&self) -> Money {
        self.expected.saturating_sub(self.settled)
    }

    pub fn status(&self) -> PeriodStatus {
        PeriodStatus::classify(self.settled, self.expected)
    }

    /// description used on a payment breakdown line
    pub fn payment_label(&self) -> String {
        match self.kind {
            ObligationKind::Period(_) => format!("{}{}", self.label, PERIOD_PREVIEW_SUFFIX),
            ObligationKind::Item(_) => self.label.clone(),
        }
    }
}

/// result of allocating one candidate payment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationBreakdown {
    pub lines: Vec<BreakdownLine>,
    /// portion absorbed by obligations
    pub allocated: Money,
    /// portion left after every obligation was covered
    pub excess: Money,
}

impl AllocationBreakdown {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// total across all lines, equal to the allocated amount plus excess
    pub fn total(&self) -> Money {
        breakdown_total(&self.lines)
    }

    pub fn into_lines(self) -> Vec<BreakdownLine> {
        self.lines
    }
}

/// one obligation after the full paid-to-date total was replayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedObligation {
    pub kind: ObligationKind,
    pub label: String,
    pub expected: Money,
    pub applied: Money,
    pub status: PeriodStatus,
}

impl AppliedObligation {
    pub fn outstanding(&self) -> Money {
        self.expected.saturating_sub(self.applied)
    }
}

/// result of replaying a cumulative total against every obligation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settlement {
    /// obligations in allocation order
    pub applied: Vec<AppliedObligation>,
    /// unmet remainder of every partial or unpaid obligation
    pub outstanding: Vec<BreakdownLine>,
    pub allocated: Money,
    pub excess: Money,
}

impl Settlement {
    pub fn outstanding_total(&self) -> Money {
        breakdown_total(&self.outstanding)
    }

    pub fn statuses(&self) -> Vec<PeriodStatus> {
        self.applied.iter().map(|a| a.status).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_obligation_labels() {
        let month = MonthKey::from_ymd(2024, 1).unwrap();
        let period = Obligation::period(month, Money::from_major(1200));
        assert_eq!(period.label, "January 2024 Fee");
        assert_eq!(period.payment_label(), "January 2024 Fee (Tuit.+Trans.)");

        let item = Obligation::item(Uuid::new_v4(), "Exam Fee", Money::from_major(500));
        assert_eq!(item.payment_label(), "Exam Fee");
    }

    #[test]
    fn test_remaining_never_negative() {
        let month = MonthKey::from_ymd(2024, 1).unwrap();
        let period = Obligation::period(month, Money::from_major(1200))
            .with_settled(Money::from_major(1500));
        assert_eq!(period.remaining(), Money::ZERO);
        assert_eq!(period.status(), PeriodStatus::Paid);
    }
}
