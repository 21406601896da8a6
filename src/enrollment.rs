use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::accrual::ScheduleLookup;
use crate::allocation::{AllocationBreakdown, AllocationEngine};
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::ledger::DuesSnapshot;
use crate::records::{ClassHistoryEntry, FeeTemplate, OneOffFeeItem, Payment, Student};
use crate::timeline::MonthKey;
use crate::types::{PaymentMethod, ScheduleId, StudentId};

/// promotions take effect from the first day of the following month
pub fn promotion_effective_date(promoted_on: NaiveDate) -> Result<NaiveDate> {
    MonthKey::from_date(promoted_on)
        .next()
        .map(|month| month.first_day())
        .ok_or_else(|| LedgerError::InvalidDate {
            message: format!("no month follows {}", promoted_on),
        })
}

/// move a student to another class schedule.
///
/// Appends a history entry rather than rewriting one, so months before the
/// effective date keep the schedule they were billed under.
pub fn promote<S>(
    student: &Student,
    target: ScheduleId,
    schedules: &S,
    promoted_on: NaiveDate,
) -> Result<Student>
where
    S: ScheduleLookup + ?Sized,
{
    if schedules.find_schedule(target).is_none() {
        return Err(LedgerError::ScheduleNotFound { id: target });
    }
    let effective_from = promotion_effective_date(promoted_on)?;

    let mut promoted = student.clone();
    if promoted.class_history.is_empty() {
        promoted.class_history.push(student.implicit_history_entry());
    }
    promoted
        .class_history
        .push(ClassHistoryEntry::new(target, effective_from));
    promoted.schedule_id = target;

    Ok(promoted)
}

/// promote every listed student; fails without partial output if any id is
/// unknown
pub fn promote_many<S>(
    students: &[Student],
    student_ids: &[StudentId],
    target: ScheduleId,
    schedules: &S,
    promoted_on: NaiveDate,
) -> Result<Vec<Student>>
where
    S: ScheduleLookup + ?Sized,
{
    student_ids
        .iter()
        .map(|id| {
            let student = students
                .iter()
                .find(|s| s.id == *id)
                .ok_or(LedgerError::StudentNotFound { id: *id })?;
            promote(student, target, schedules, promoted_on)
        })
        .collect()
}

/// one fee item per active student currently in the schedule
pub fn apply_bulk_fee<S>(
    schedule_id: ScheduleId,
    template: &FeeTemplate,
    students: &[Student],
    schedules: &S,
) -> Result<Vec<OneOffFeeItem>>
where
    S: ScheduleLookup + ?Sized,
{
    template.validate()?;
    if schedules.find_schedule(schedule_id).is_none() {
        return Err(LedgerError::ScheduleNotFound { id: schedule_id });
    }

    Ok(students
        .iter()
        .filter(|student| student.active && student.schedule_id == schedule_id)
        .map(|student| OneOffFeeItem::from_template(student.id, template))
        .collect())
}

/// stop fee accrual after the month of `on`
pub fn deactivate(student: &Student, on: NaiveDate) -> Result<Student> {
    if on < student.admission_date {
        return Err(LedgerError::InactivationBeforeAdmission {
            admission: student.admission_date,
            inactive_since: on,
        });
    }
    let mut updated = student.clone();
    updated.active = false;
    updated.inactive_since = Some(on);
    Ok(updated)
}

/// resume accrual; the inactivation date is cleared
pub fn reactivate(student: &Student) -> Student {
    let mut updated = student.clone();
    updated.active = true;
    updated.inactive_since = None;
    updated
}

/// commit a payment against the obligations still open in `snapshot`.
///
/// The breakdown is the allocation preview at this moment and is frozen into
/// the payment record; it always sums to `amount`.
pub fn record_payment(
    config: &LedgerConfig,
    snapshot: &DuesSnapshot,
    amount: Money,
    method: PaymentMethod,
    note: impl Into<String>,
    paid_at: DateTime<Utc>,
) -> Result<(Payment, AllocationBreakdown)> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidPaymentAmount { amount });
    }

    let breakdown = AllocationEngine::new(config).preview(amount, &snapshot.outstanding_obligations());

    let payment = Payment {
        id: Uuid::new_v4(),
        student_id: snapshot.student_id,
        amount,
        paid_at,
        method,
        note: note.into(),
        breakdown: breakdown.lines.clone(),
    };

    info!(
        payment_id = %payment.id,
        student_id = %payment.student_id,
        amount = %amount,
        lines = payment.breakdown.len(),
        "payment recorded"
    );

    Ok((payment, breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ClassFeeSchedule;
    use crate::types::{BreakdownLine, FeeCategory};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn student(name: &str, schedule: &ClassFeeSchedule) -> Student {
        Student::builder()
            .name(name)
            .admitted_on(date(2024, 1, 1))
            .schedule(schedule.id)
            .build()
            .unwrap()
    }

    #[test]
    fn test_effective_date_is_next_month_start() {
        assert_eq!(promotion_effective_date(date(2024, 2, 20)).unwrap(), date(2024, 3, 1));
        assert_eq!(promotion_effective_date(date(2024, 12, 1)).unwrap(), date(2025, 1, 1));
    }

    #[test]
    fn test_promote_materializes_implicit_entry() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let b = ClassFeeSchedule::new("Class 5", Money::from_major(1500));
        let schedules = vec![a.clone(), b.clone()];
        let original = student("Asha", &a);

        let promoted = promote(&original, b.id, &schedules, date(2024, 2, 20)).unwrap();

        assert_eq!(promoted.schedule_id, b.id);
        assert_eq!(
            promoted.class_history,
            vec![
                ClassHistoryEntry::new(a.id, date(2024, 1, 1)),
                ClassHistoryEntry::new(b.id, date(2024, 3, 1)),
            ]
        );
        // input untouched
        assert!(original.class_history.is_empty());
        assert_eq!(original.schedule_id, a.id);
    }

    #[test]
    fn test_promote_appends_to_existing_history() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let b = ClassFeeSchedule::new("Class 5", Money::from_major(1500));
        let c = ClassFeeSchedule::new("Class 6", Money::from_major(1800));
        let schedules = vec![a.clone(), b.clone(), c.clone()];

        let once = promote(&student("Asha", &a), b.id, &schedules, date(2024, 2, 20)).unwrap();
        let twice = promote(&once, c.id, &schedules, date(2024, 6, 3)).unwrap();

        assert_eq!(twice.class_history.len(), 3);
        assert_eq!(twice.class_history[..2], once.class_history[..]);
        assert_eq!(twice.class_history[2], ClassHistoryEntry::new(c.id, date(2024, 7, 1)));
    }

    #[test]
    fn test_promote_unknown_schedule() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let schedules = vec![a.clone()];
        let missing = Uuid::new_v4();

        assert_eq!(
            promote(&student("Asha", &a), missing, &schedules, date(2024, 2, 1)),
            Err(LedgerError::ScheduleNotFound { id: missing })
        );
    }

    #[test]
    fn test_promote_many_rejects_unknown_student() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let b = ClassFeeSchedule::new("Class 5", Money::from_major(1500));
        let schedules = vec![a.clone(), b.clone()];
        let students = vec![student("Asha", &a), student("Ravi", &a)];

        let promoted = promote_many(
            &students,
            &[students[0].id, students[1].id],
            b.id,
            &schedules,
            date(2024, 2, 1),
        )
        .unwrap();
        assert!(promoted.iter().all(|s| s.schedule_id == b.id));

        let stranger = Uuid::new_v4();
        assert_eq!(
            promote_many(&students, &[stranger], b.id, &schedules, date(2024, 2, 1)),
            Err(LedgerError::StudentNotFound { id: stranger })
        );
    }

    #[test]
    fn test_bulk_fee_targets_active_students_in_class() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let b = ClassFeeSchedule::new("Class 5", Money::from_major(1500));
        let schedules = vec![a.clone(), b.clone()];
        let left = deactivate(&student("Meera", &a), date(2024, 2, 1)).unwrap();
        let students = vec![student("Asha", &a), student("Ravi", &b), left];

        let template = FeeTemplate {
            category: FeeCategory::Exam,
            title: "Term Exam".to_string(),
            amount: Money::from_major(500),
            period: MonthKey::from_ymd(2024, 3).unwrap(),
            due_date: date(2024, 3, 10),
        };
        let items = apply_bulk_fee(a.id, &template, &students, &schedules).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].student_id, students[0].id);
        assert_eq!(items[0].title, "Term Exam");
    }

    #[test]
    fn test_bulk_fee_rejects_bad_template() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let template = FeeTemplate {
            category: FeeCategory::Event,
            title: "  ".to_string(),
            amount: Money::from_major(100),
            period: MonthKey::from_ymd(2024, 3).unwrap(),
            due_date: date(2024, 3, 10),
        };
        assert!(apply_bulk_fee(a.id, &template, &[], &vec![a.clone()]).is_err());
    }

    #[test]
    fn test_deactivate_and_reactivate() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let s = student("Asha", &a);

        assert!(matches!(
            deactivate(&s, date(2023, 12, 31)),
            Err(LedgerError::InactivationBeforeAdmission { .. })
        ));

        let inactive = deactivate(&s, date(2024, 2, 10)).unwrap();
        assert!(!inactive.active);
        assert_eq!(inactive.inactive_since, Some(date(2024, 2, 10)));

        let back = reactivate(&inactive);
        assert!(back.active);
        assert_eq!(back.inactive_since, None);
    }

    #[test]
    fn test_record_payment_freezes_preview() {
        let config = LedgerConfig::default();
        let a = ClassFeeSchedule::new("Class 5", Money::from_major(1000));
        let s = Student::builder()
            .name("Asha")
            .admitted_on(date(2024, 1, 15))
            .schedule(a.id)
            .transport_fee(Money::from_major(200))
            .build()
            .unwrap();
        let snapshot = DuesSnapshot::compute(&config, &s, &a, &[], &[], &vec![a.clone()], date(2024, 3, 1));
        let paid_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        let (payment, breakdown) = record_payment(
            &config,
            &snapshot,
            Money::from_major(1500),
            PaymentMethod::Online,
            "first instalment",
            paid_at,
        )
        .unwrap();

        assert!(payment.is_reconciled());
        assert_eq!(payment.breakdown, breakdown.lines);
        assert_eq!(payment.student_id, s.id);
        assert_eq!(
            payment.breakdown[1],
            BreakdownLine::new("February 2024 Fee (Tuit.+Trans.) (Partial)", Money::from_major(300))
        );
    }

    #[test]
    fn test_record_payment_rejects_non_positive() {
        let config = LedgerConfig::default();
        let a = ClassFeeSchedule::new("Class 5", Money::from_major(1000));
        let s = student("Asha", &a);
        let snapshot = DuesSnapshot::compute(&config, &s, &a, &[], &[], &vec![a.clone()], date(2024, 3, 1));

        assert_eq!(
            record_payment(&config, &snapshot, Money::ZERO, PaymentMethod::Cash, "", Utc::now()),
            Err(LedgerError::InvalidPaymentAmount { amount: Money::ZERO })
        );
    }
}
