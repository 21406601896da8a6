pub mod snapshot;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::info;

use crate::accrual::ScheduleLookup;
use crate::allocation::{AllocationBreakdown, AllocationEngine, Obligation};
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::enrollment;
use crate::errors::{LedgerError, Result};
use crate::events::{EventStore, LedgerEvent};
use crate::overview::{self, SchoolOverview};
use crate::records::{ClassFeeSchedule, FeeTemplate, OneOffFeeItem, Payment, Student};
use crate::types::{PaymentMethod, ScheduleId, StudentId};

pub use snapshot::{DuesSnapshot, ItemLedgerLine, PeriodLedgerLine};

/// compute a dues snapshot with the standard configuration.
///
/// `as_of` defaults to the current system time. Nothing is cached, every
/// call replays the complete payment history.
pub fn compute_dues_snapshot(
    student: &Student,
    resolved_schedule: &ClassFeeSchedule,
    payments: &[Payment],
    items: &[OneOffFeeItem],
    schedules: &[ClassFeeSchedule],
    as_of: Option<DateTime<Utc>>,
) -> DuesSnapshot {
    compute_dues_snapshot_with(
        &LedgerConfig::standard(),
        student,
        resolved_schedule,
        payments,
        items,
        schedules,
        as_of,
    )
}

/// compute a dues snapshot with an explicit configuration
pub fn compute_dues_snapshot_with(
    config: &LedgerConfig,
    student: &Student,
    resolved_schedule: &ClassFeeSchedule,
    payments: &[Payment],
    items: &[OneOffFeeItem],
    schedules: &[ClassFeeSchedule],
    as_of: Option<DateTime<Utc>>,
) -> DuesSnapshot {
    let as_of = as_of.unwrap_or_else(Utc::now).date_naive();
    DuesSnapshot::compute(
        config,
        student,
        resolved_schedule,
        payments,
        items,
        schedules,
        as_of,
    )
}

/// what a candidate amount would cover among the given outstanding lines
pub fn preview_allocation(
    amount: Money,
    periods: &[PeriodLedgerLine],
    items: &[ItemLedgerLine],
) -> AllocationBreakdown {
    preview_allocation_with(&LedgerConfig::standard(), amount, periods, items)
}

pub fn preview_allocation_with(
    config: &LedgerConfig,
    amount: Money,
    periods: &[PeriodLedgerLine],
    items: &[ItemLedgerLine],
) -> AllocationBreakdown {
    let obligations: Vec<Obligation> = periods
        .iter()
        .map(PeriodLedgerLine::obligation)
        .chain(items.iter().map(ItemLedgerLine::obligation))
        .collect();
    AllocationEngine::new(config).preview(amount, &obligations)
}

/// ledger facade bound to a time source
pub struct Ledger<'t> {
    config: LedgerConfig,
    time: &'t SafeTimeProvider,
}

impl<'t> Ledger<'t> {
    pub fn new(time: &'t SafeTimeProvider) -> Self {
        Self {
            config: LedgerConfig::standard(),
            time,
        }
    }

    pub fn with_config(config: LedgerConfig, time: &'t SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, time })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.time.now()
    }

    /// dues for a student as of the provider's current time
    pub fn snapshot(
        &self,
        student: &Student,
        resolved_schedule: &ClassFeeSchedule,
        payments: &[Payment],
        items: &[OneOffFeeItem],
        schedules: &[ClassFeeSchedule],
    ) -> DuesSnapshot {
        DuesSnapshot::compute(
            &self.config,
            student,
            resolved_schedule,
            payments,
            items,
            schedules,
            self.now().date_naive(),
        )
    }

    /// dues for a student, looking the current schedule up by reference
    pub fn snapshot_for(
        &self,
        student: &Student,
        payments: &[Payment],
        items: &[OneOffFeeItem],
        schedules: &[ClassFeeSchedule],
    ) -> Result<DuesSnapshot> {
        let current = schedules
            .find_schedule(student.schedule_id)
            .ok_or(LedgerError::ScheduleNotFound {
                id: student.schedule_id,
            })?;
        Ok(self.snapshot(student, current, payments, items, schedules))
    }

    /// live preview while a payment amount is being entered
    pub fn preview(&self, snapshot: &DuesSnapshot, amount: Money) -> AllocationBreakdown {
        AllocationEngine::new(&self.config).preview(amount, &snapshot.outstanding_obligations())
    }

    /// commit a payment, capturing the preview as its breakdown
    pub fn record_payment(
        &self,
        snapshot: &DuesSnapshot,
        amount: Money,
        method: PaymentMethod,
        note: impl Into<String>,
        events: &mut EventStore,
    ) -> Result<Payment> {
        let now = self.now();
        let (payment, breakdown) =
            enrollment::record_payment(&self.config, snapshot, amount, method, note, now)?;

        events.emit(LedgerEvent::PaymentRecorded {
            payment_id: payment.id,
            student_id: payment.student_id,
            amount: payment.amount,
            excess: breakdown.excess,
            timestamp: now,
        });

        Ok(payment)
    }

    /// promote a student effective from the start of next month
    pub fn promote(
        &self,
        student: &Student,
        target: ScheduleId,
        schedules: &[ClassFeeSchedule],
        events: &mut EventStore,
    ) -> Result<Student> {
        let now = self.now();
        let promoted = enrollment::promote(student, target, schedules, now.date_naive())?;
        let effective_from = enrollment::promotion_effective_date(now.date_naive())?;

        info!(
            student_id = %student.id,
            from = %student.schedule_id,
            to = %target,
            effective_from = %effective_from,
            "student promoted"
        );
        events.emit(LedgerEvent::StudentPromoted {
            student_id: student.id,
            from_schedule: student.schedule_id,
            to_schedule: target,
            effective_from,
            timestamp: now,
        });

        Ok(promoted)
    }

    /// promote several students to the same schedule
    pub fn promote_many(
        &self,
        students: &[Student],
        student_ids: &[StudentId],
        target: ScheduleId,
        schedules: &[ClassFeeSchedule],
        events: &mut EventStore,
    ) -> Result<Vec<Student>> {
        let now = self.now();
        let promoted =
            enrollment::promote_many(students, student_ids, target, schedules, now.date_naive())?;
        let effective_from = enrollment::promotion_effective_date(now.date_naive())?;

        for (before, after) in student_ids
            .iter()
            .filter_map(|id| students.iter().find(|s| s.id == *id))
            .zip(&promoted)
        {
            events.emit(LedgerEvent::StudentPromoted {
                student_id: after.id,
                from_schedule: before.schedule_id,
                to_schedule: target,
                effective_from,
                timestamp: now,
            });
        }
        info!(students = promoted.len(), to = %target, "students promoted");

        Ok(promoted)
    }

    /// create a one-off fee for every active student in a class
    pub fn apply_bulk_fee(
        &self,
        schedule_id: ScheduleId,
        template: &FeeTemplate,
        students: &[Student],
        schedules: &[ClassFeeSchedule],
        events: &mut EventStore,
    ) -> Result<Vec<OneOffFeeItem>> {
        let items = enrollment::apply_bulk_fee(schedule_id, template, students, schedules)?;

        info!(
            schedule_id = %schedule_id,
            title = %template.title,
            students = items.len(),
            "bulk fee applied"
        );
        events.emit(LedgerEvent::BulkFeeApplied {
            schedule_id,
            title: template.title.clone(),
            amount: template.amount,
            students: items.len(),
            timestamp: self.now(),
        });

        Ok(items)
    }

    /// stop accrual from today
    pub fn deactivate(&self, student: &Student, events: &mut EventStore) -> Result<Student> {
        let now = self.now();
        let updated = enrollment::deactivate(student, now.date_naive())?;

        info!(student_id = %student.id, "student deactivated");
        events.emit(LedgerEvent::StudentDeactivated {
            student_id: student.id,
            inactive_since: now.date_naive(),
            timestamp: now,
        });

        Ok(updated)
    }

    pub fn reactivate(&self, student: &Student, events: &mut EventStore) -> Student {
        info!(student_id = %student.id, "student reactivated");
        events.emit(LedgerEvent::StudentReactivated {
            student_id: student.id,
            timestamp: self.now(),
        });
        enrollment::reactivate(student)
    }

    /// school-wide collection and dues figures
    pub fn overview(
        &self,
        students: &[Student],
        schedules: &[ClassFeeSchedule],
        payments: &[Payment],
        items: &[OneOffFeeItem],
    ) -> SchoolOverview {
        overview::school_overview(
            &self.config,
            students,
            schedules,
            payments,
            items,
            self.now().date_naive(),
        )
    }
}
