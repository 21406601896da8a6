use tracing::debug;

use crate::allocation::{
    AllocationBreakdown, AppliedObligation, Obligation, ObligationKind, Settlement,
    DEFAULT_EXCESS_LABEL, PARTIAL_SUFFIX,
};
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::timeline::MonthKey;
use crate::types::{BreakdownLine, PeriodStatus};

/// allocation priority levels, fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AllocationPriority {
    /// billing periods, oldest first
    Periods = 1,
    /// one-off items, in stored order
    OneOffItems = 2,
}

impl AllocationPriority {
    pub fn of(kind: &ObligationKind) -> Self {
        match kind {
            ObligationKind::Period(_) => AllocationPriority::Periods,
            ObligationKind::Item(_) => AllocationPriority::OneOffItems,
        }
    }
}

/// distributes money across obligations: periods, then items, then excess
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    excess_label: String,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self {
            excess_label: DEFAULT_EXCESS_LABEL.to_string(),
        }
    }
}

impl AllocationEngine {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            excess_label: config.excess_credit_label.clone(),
        }
    }

    pub fn excess_label(&self) -> &str {
        &self.excess_label
    }

    /// obligations in allocation order; periods chronological, items as given
    pub fn ordered(obligations: &[Obligation]) -> Vec<&Obligation> {
        let mut ordered: Vec<&Obligation> = obligations.iter().collect();
        // stable sort keeps item order and equal-month order untouched
        ordered.sort_by_key(|obligation| {
            let month: Option<MonthKey> = match obligation.kind {
                ObligationKind::Period(month) => Some(month),
                ObligationKind::Item(_) => None,
            };
            (AllocationPriority::of(&obligation.kind), month)
        });
        ordered
    }

    /// greedy walk: each obligation absorbs up to what it still needs
    fn waterfall(amount: Money, ordered: &[&Obligation]) -> (Vec<Money>, Money) {
        let mut remaining = amount.max(Money::ZERO);
        let mut taken = Vec::with_capacity(ordered.len());

        for obligation in ordered {
            let portion = remaining.min(obligation.remaining());
            remaining -= portion;
            taken.push(portion);
        }

        (taken, remaining)
    }

    /// replay a cumulative paid-to-date total against every obligation.
    ///
    /// Allocation is against the total, not matched payment by payment, so
    /// which payment covered which month is irrelevant to the result.
    pub fn replay(&self, total_paid: Money, obligations: &[Obligation]) -> Settlement {
        let ordered = Self::ordered(obligations);
        let (taken, excess) = Self::waterfall(total_paid, &ordered);

        let mut applied = Vec::with_capacity(ordered.len());
        let mut outstanding = Vec::new();
        let mut allocated = Money::ZERO;

        for (obligation, portion) in ordered.iter().zip(taken) {
            allocated += portion;
            let total_applied = obligation.settled + portion;
            let status = PeriodStatus::classify(total_applied, obligation.expected);
            let owed = obligation.expected.saturating_sub(total_applied);

            match status {
                PeriodStatus::Paid => {}
                PeriodStatus::Partial => outstanding.push(BreakdownLine::new(
                    format!("{}{}", obligation.label, PARTIAL_SUFFIX),
                    owed,
                )),
                PeriodStatus::Unpaid => {
                    outstanding.push(BreakdownLine::new(obligation.label.clone(), owed))
                }
            }

            applied.push(AppliedObligation {
                kind: obligation.kind,
                label: obligation.label.clone(),
                expected: obligation.expected,
                applied: total_applied,
                status,
            });
        }

        debug!(
            total_paid = %total_paid,
            obligations = applied.len(),
            outstanding = outstanding.len(),
            excess = %excess,
            "replayed paid-to-date total"
        );

        Settlement {
            applied,
            outstanding,
            allocated,
            excess,
        }
    }

    /// breakdown of what a candidate payment would cover.
    ///
    /// Zero or negative amounts give an empty breakdown. With no obligations
    /// left the whole amount becomes one excess line.
    pub fn preview(&self, amount: Money, obligations: &[Obligation]) -> AllocationBreakdown {
        if !amount.is_positive() {
            return AllocationBreakdown::default();
        }

        let ordered = Self::ordered(obligations);
        let (taken, excess) = Self::waterfall(amount, &ordered);

        let mut lines = Vec::new();
        let mut allocated = Money::ZERO;

        for (obligation, portion) in ordered.iter().zip(taken) {
            if !portion.is_positive() {
                continue;
            }
            allocated += portion;
            let mut description = obligation.payment_label();
            if portion < obligation.remaining() {
                description.push_str(PARTIAL_SUFFIX);
            }
            lines.push(BreakdownLine::new(description, portion));
        }

        if excess.is_positive() {
            lines.push(BreakdownLine::new(self.excess_label.clone(), excess));
        }

        debug!(amount = %amount, lines = lines.len(), excess = %excess, "previewed allocation");

        AllocationBreakdown {
            lines,
            allocated,
            excess,
        }
    }
}
