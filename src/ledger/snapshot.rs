use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accrual::{AccrualCalculator, BillingPeriod, ScheduleLookup};
use crate::allocation::{AllocationEngine, AppliedObligation, Obligation};
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::records::{ClassFeeSchedule, OneOffFeeItem, Payment, Student};
use crate::timeline::{MonthKey, TimelineResolver};
use crate::types::{
    breakdown_total, BreakdownLine, DataQualityIssue, FeeCategory, FeeItemId, PeriodStatus,
    ScheduleId, StudentId,
};

/// one billing period with its replayed coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodLedgerLine {
    pub month: MonthKey,
    pub schedule_id: ScheduleId,
    pub tuition: Money,
    pub transport: Money,
    pub expected: Money,
    pub paid: Money,
    pub status: PeriodStatus,
}

impl PeriodLedgerLine {
    fn from_applied(period: &BillingPeriod, applied: &AppliedObligation) -> Self {
        Self {
            month: period.month,
            schedule_id: period.schedule_id,
            tuition: period.tuition,
            transport: period.transport,
            expected: period.expected,
            paid: applied.applied,
            status: applied.status,
        }
    }

    pub fn outstanding(&self) -> Money {
        self.expected.saturating_sub(self.paid)
    }

    /// obligation carrying what has already been covered
    pub fn obligation(&self) -> Obligation {
        Obligation::period(self.month, self.expected).with_settled(self.paid)
    }
}

/// one one-off item with its replayed coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLedgerLine {
    pub item_id: FeeItemId,
    pub title: String,
    pub category: FeeCategory,
    pub amount: Money,
    pub paid: Money,
    pub status: PeriodStatus,
}

impl ItemLedgerLine {
    fn from_applied(item: &OneOffFeeItem, applied: &AppliedObligation) -> Self {
        Self {
            item_id: item.id,
            title: item.title.clone(),
            category: item.category,
            amount: item.amount,
            paid: applied.applied,
            status: applied.status,
        }
    }

    pub fn outstanding(&self) -> Money {
        self.amount.saturating_sub(self.paid)
    }

    pub fn obligation(&self) -> Obligation {
        Obligation::item(self.item_id, self.title.clone(), self.amount).with_settled(self.paid)
    }
}

/// point-in-time view of what a student owes, has paid and still owes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuesSnapshot {
    pub student_id: StudentId,
    pub as_of: NaiveDate,
    /// last billed month
    pub calculation_end: MonthKey,
    pub total_expected: Money,
    pub total_paid: Money,
    /// negative when the student has paid ahead
    pub balance: Money,
    /// paid-to-date beyond every known obligation
    pub excess_credit: Money,
    pub periods: Vec<PeriodLedgerLine>,
    pub items: Vec<ItemLedgerLine>,
    /// unmet remainder per period and item, periods first
    pub outstanding: Vec<BreakdownLine>,
    pub issues: Vec<DataQualityIssue>,
}

impl DuesSnapshot {
    /// recompute everything from the inputs; payments and items belonging to
    /// other students are ignored
    pub fn compute<S>(
        config: &LedgerConfig,
        student: &Student,
        resolved_schedule: &ClassFeeSchedule,
        payments: &[Payment],
        items: &[OneOffFeeItem],
        schedules: &S,
        as_of: NaiveDate,
    ) -> Self
    where
        S: ScheduleLookup + ?Sized,
    {
        let timeline = TimelineResolver::new(config.max_periods).resolve(student, as_of);

        let student_items: Vec<OneOffFeeItem> = items
            .iter()
            .filter(|item| item.student_id == student.id)
            .cloned()
            .collect();

        let accrual = AccrualCalculator::accrue(
            &timeline,
            resolved_schedule,
            schedules,
            student.transport_fee(),
            &student_items,
        );

        let total_paid: Money = payments
            .iter()
            .filter(|payment| payment.student_id == student.id)
            .map(|payment| payment.amount)
            .sum();

        // periods are chronological and items keep stored order, so this list
        // is already in allocation order and the replay output lines up with it
        let obligations: Vec<Obligation> = accrual
            .periods
            .iter()
            .map(|period| Obligation::period(period.month, period.expected))
            .chain(
                accrual
                    .items
                    .iter()
                    .map(|item| Obligation::item(item.id, item.title.clone(), item.amount)),
            )
            .collect();

        let settlement = AllocationEngine::new(config).replay(total_paid, &obligations);
        let (applied_periods, applied_items) = settlement.applied.split_at(accrual.periods.len());

        let periods: Vec<PeriodLedgerLine> = accrual
            .periods
            .iter()
            .zip(applied_periods)
            .map(|(period, applied)| PeriodLedgerLine::from_applied(period, applied))
            .collect();

        let item_lines: Vec<ItemLedgerLine> = accrual
            .items
            .iter()
            .zip(applied_items)
            .map(|(item, applied)| ItemLedgerLine::from_applied(item, applied))
            .collect();

        let mut issues = timeline.issues;
        issues.extend(accrual.issues);

        let balance = accrual.total_expected - total_paid;

        debug!(
            student_id = %student.id,
            periods = periods.len(),
            total_expected = %accrual.total_expected,
            total_paid = %total_paid,
            balance = %balance,
            "computed dues snapshot"
        );

        Self {
            student_id: student.id,
            as_of,
            calculation_end: timeline.end_month,
            total_expected: accrual.total_expected,
            total_paid,
            balance,
            excess_credit: settlement.excess,
            periods,
            items: item_lines,
            outstanding: settlement.outstanding,
            issues,
        }
    }

    /// periods not yet fully paid
    pub fn pending_periods(&self) -> Vec<&PeriodLedgerLine> {
        self.periods
            .iter()
            .filter(|period| !period.status.is_paid())
            .collect()
    }

    /// items not yet fully paid
    pub fn pending_items(&self) -> Vec<&ItemLedgerLine> {
        self.items
            .iter()
            .filter(|item| !item.status.is_paid())
            .collect()
    }

    pub fn period(&self, month: MonthKey) -> Option<&PeriodLedgerLine> {
        self.periods.iter().find(|period| period.month == month)
    }

    /// obligations a new payment can still absorb, in allocation order
    pub fn outstanding_obligations(&self) -> Vec<Obligation> {
        self.pending_periods()
            .into_iter()
            .map(PeriodLedgerLine::obligation)
            .chain(self.pending_items().into_iter().map(ItemLedgerLine::obligation))
            .collect()
    }

    pub fn outstanding_total(&self) -> Money {
        breakdown_total(&self.outstanding)
    }

    /// nothing left owing
    pub fn is_settled(&self) -> bool {
        !self.balance.is_positive()
    }

    /// paid ahead of what has accrued
    pub fn has_credit(&self) -> bool {
        self.balance.is_negative()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// get json representation of the snapshot
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}
