use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accrual::ScheduleLookup;
use crate::config::LedgerConfig;
use crate::decimal::Money;
use crate::ledger::DuesSnapshot;
use crate::records::{ClassFeeSchedule, OneOffFeeItem, Payment, Student};
use crate::types::ScheduleId;

/// students currently placed in one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEnrollment {
    pub schedule_id: ScheduleId,
    pub name: String,
    pub students: usize,
}

/// school-wide headline figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolOverview {
    /// every payment ever recorded
    pub total_collection: Money,
    /// sum of student balances; credits offset dues
    pub pending_dues: Money,
    pub active_students: usize,
    pub class_count: usize,
    /// in schedule order
    pub enrollment: Vec<ClassEnrollment>,
    /// students skipped because their current schedule is missing
    pub unresolved_students: usize,
}

/// aggregate dues across the whole roster.
///
/// Students whose current schedule cannot be found are left out of the dues
/// total and counted in `unresolved_students`.
pub fn school_overview(
    config: &LedgerConfig,
    students: &[Student],
    schedules: &[ClassFeeSchedule],
    payments: &[Payment],
    items: &[OneOffFeeItem],
    as_of: NaiveDate,
) -> SchoolOverview {
    let total_collection: Money = payments.iter().map(|payment| payment.amount).sum();

    let mut pending_dues = Money::ZERO;
    let mut unresolved_students = 0;
    for student in students {
        match schedules.find_schedule(student.schedule_id) {
            Some(current) => {
                let snapshot =
                    DuesSnapshot::compute(config, student, current, payments, items, schedules, as_of);
                pending_dues += snapshot.balance;
            }
            None => unresolved_students += 1,
        }
    }

    let enrollment = schedules
        .iter()
        .map(|schedule| ClassEnrollment {
            schedule_id: schedule.id,
            name: schedule.name.clone(),
            students: students
                .iter()
                .filter(|student| student.schedule_id == schedule.id)
                .count(),
        })
        .collect();

    debug!(
        students = students.len(),
        total_collection = %total_collection,
        pending_dues = %pending_dues,
        "computed school overview"
    );

    SchoolOverview {
        total_collection,
        pending_dues,
        active_students: students.iter().filter(|student| student.active).count(),
        class_count: schedules.len(),
        enrollment,
        unresolved_students,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(student: &Student, amount: i64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            student_id: student.id,
            amount: Money::from_major(amount),
            paid_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            method: PaymentMethod::Cash,
            note: String::new(),
            breakdown: Vec::new(),
        }
    }

    #[test]
    fn test_overview_figures() {
        let a = ClassFeeSchedule::new("Class 4", Money::from_major(1000));
        let b = ClassFeeSchedule::new("Class 5", Money::from_major(1500));
        let schedules = vec![a.clone(), b.clone()];

        let asha = Student::builder()
            .name("Asha")
            .admitted_on(date(2024, 1, 1))
            .schedule(a.id)
            .build()
            .unwrap();
        let ravi = Student::builder()
            .name("Ravi")
            .admitted_on(date(2024, 3, 1))
            .schedule(b.id)
            .inactive_since(date(2024, 3, 20))
            .build()
            .unwrap();
        let orphan = Student::builder()
            .name("Meera")
            .admitted_on(date(2024, 1, 1))
            .schedule(Uuid::new_v4())
            .build()
            .unwrap();
        let students = vec![asha.clone(), ravi.clone(), orphan];
        // asha pays ahead, ravi owes one month
        let payments = vec![payment(&asha, 3500)];

        let overview = school_overview(
            &LedgerConfig::default(),
            &students,
            &schedules,
            &payments,
            &[],
            date(2024, 3, 15),
        );

        assert_eq!(overview.total_collection, Money::from_major(3500));
        // asha: 3000 - 3500 = -500, ravi: 1500
        assert_eq!(overview.pending_dues, Money::from_major(1000));
        assert_eq!(overview.active_students, 2);
        assert_eq!(overview.class_count, 2);
        assert_eq!(overview.enrollment[0].students, 1);
        assert_eq!(overview.enrollment[1].students, 1);
        assert_eq!(overview.unresolved_students, 1);
    }
}
