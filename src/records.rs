use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::timeline::MonthKey;
use crate::types::{
    breakdown_total, BreakdownLine, FeeCategory, FeeItemId, PaymentId, PaymentMethod,
    ScheduleId, StudentId,
};

/// a class with its fixed monthly tuition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFeeSchedule {
    pub id: ScheduleId,
    pub name: String,
    pub monthly_fee: Money,
}

impl ClassFeeSchedule {
    pub fn new(name: impl Into<String>, monthly_fee: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            monthly_fee,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::EmptyField { field: "class name" });
        }
        if self.monthly_fee.is_negative() {
            return Err(LedgerError::NegativeAmount {
                field: "monthly fee",
                amount: self.monthly_fee,
            });
        }
        Ok(())
    }
}

/// the date a student started being billed under a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHistoryEntry {
    pub schedule_id: ScheduleId,
    pub effective_from: NaiveDate,
}

impl ClassHistoryEntry {
    pub fn new(schedule_id: ScheduleId, effective_from: NaiveDate) -> Self {
        Self {
            schedule_id,
            effective_from,
        }
    }
}

/// student record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_no: String,
    pub admission_date: NaiveDate,
    /// current class schedule
    pub schedule_id: ScheduleId,
    pub active: bool,
    pub inactive_since: Option<NaiveDate>,
    /// flat monthly transport surcharge
    pub transport_fee: Option<Money>,
    /// class transfers in insertion order; empty means one implicit entry
    #[serde(default)]
    pub class_history: Vec<ClassHistoryEntry>,
}

impl Student {
    pub fn builder() -> StudentBuilder {
        StudentBuilder::new()
    }

    /// monthly transport surcharge, zero when not set
    pub fn transport_fee(&self) -> Money {
        self.transport_fee.unwrap_or(Money::ZERO)
    }

    /// class history with the implicit admission entry filled in when empty
    pub fn effective_history(&self) -> Cow<'_, [ClassHistoryEntry]> {
        if self.class_history.is_empty() {
            Cow::Owned(vec![self.implicit_history_entry()])
        } else {
            Cow::Borrowed(&self.class_history)
        }
    }

    /// entry standing in for an empty history: current schedule from admission
    pub fn implicit_history_entry(&self) -> ClassHistoryEntry {
        ClassHistoryEntry::new(self.schedule_id, self.admission_date)
    }

    /// date fee accrual stops, if the student has left
    pub fn billing_stop_date(&self) -> Option<NaiveDate> {
        if self.active {
            None
        } else {
            self.inactive_since
        }
    }

    /// checks for collaborators; the timeline resolver still copes with
    /// records that never went through here
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::EmptyField { field: "student name" });
        }
        if let Some(since) = self.inactive_since {
            if since < self.admission_date {
                return Err(LedgerError::InvalidDate {
                    message: format!(
                        "inactive since {} but admitted on {}",
                        since, self.admission_date
                    ),
                });
            }
        }
        if let Some(fee) = self.transport_fee {
            if fee.is_negative() {
                return Err(LedgerError::NegativeAmount {
                    field: "transport fee",
                    amount: fee,
                });
            }
        }
        Ok(())
    }
}

/// builder for student records
#[derive(Debug, Default)]
pub struct StudentBuilder {
    id: Option<StudentId>,
    name: Option<String>,
    roll_no: Option<String>,
    admission_date: Option<NaiveDate>,
    schedule_id: Option<ScheduleId>,
    inactive_since: Option<NaiveDate>,
    transport_fee: Option<Money>,
    class_history: Vec<ClassHistoryEntry>,
}

impl StudentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: StudentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn roll_no(mut self, roll_no: impl Into<String>) -> Self {
        self.roll_no = Some(roll_no.into());
        self
    }

    pub fn admitted_on(mut self, date: NaiveDate) -> Self {
        self.admission_date = Some(date);
        self
    }

    pub fn schedule(mut self, schedule_id: ScheduleId) -> Self {
        self.schedule_id = Some(schedule_id);
        self
    }

    /// mark the student inactive from the given date
    pub fn inactive_since(mut self, date: NaiveDate) -> Self {
        self.inactive_since = Some(date);
        self
    }

    pub fn transport_fee(mut self, fee: Money) -> Self {
        self.transport_fee = Some(fee);
        self
    }

    pub fn history_entry(mut self, schedule_id: ScheduleId, effective_from: NaiveDate) -> Self {
        self.class_history
            .push(ClassHistoryEntry::new(schedule_id, effective_from));
        self
    }

    pub fn build(self) -> Result<Student> {
        let admission_date = self.admission_date.ok_or(LedgerError::InvalidDate {
            message: "admission date is required".to_string(),
        })?;
        let schedule_id = self.schedule_id.ok_or(LedgerError::EmptyField {
            field: "class schedule",
        })?;

        let student = Student {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name.unwrap_or_default(),
            roll_no: self.roll_no.unwrap_or_default(),
            admission_date,
            schedule_id,
            active: self.inactive_since.is_none(),
            inactive_since: self.inactive_since,
            transport_fee: self.transport_fee,
            class_history: self.class_history,
        };
        student.validate()?;
        Ok(student)
    }
}

/// fields shared by every item of a bulk one-off fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTemplate {
    pub category: FeeCategory,
    pub title: String,
    pub amount: Money,
    pub period: MonthKey,
    pub due_date: NaiveDate,
}

impl FeeTemplate {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LedgerError::EmptyField { field: "fee title" });
        }
        if self.amount.is_negative() {
            return Err(LedgerError::NegativeAmount {
                field: "fee amount",
                amount: self.amount,
            });
        }
        Ok(())
    }
}

/// non-recurring charge for one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneOffFeeItem {
    pub id: FeeItemId,
    pub student_id: StudentId,
    pub category: FeeCategory,
    pub title: String,
    pub amount: Money,
    /// descriptive only, never used for ordering
    pub period: MonthKey,
    /// metadata only, no overdue logic hangs off it
    pub due_date: NaiveDate,
}

impl OneOffFeeItem {
    pub fn from_template(student_id: StudentId, template: &FeeTemplate) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            category: template.category,
            title: template.title.clone(),
            amount: template.amount,
            period: template.period,
            due_date: template.due_date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LedgerError::EmptyField { field: "fee title" });
        }
        if self.amount.is_negative() {
            return Err(LedgerError::NegativeAmount {
                field: "fee amount",
                amount: self.amount,
            });
        }
        Ok(())
    }

    /// validate and check the item is charged to `student`
    pub fn validate_for(&self, student: &Student) -> Result<()> {
        ensure_owner(student, self.student_id)?;
        self.validate()
    }
}

/// a committed payment with the breakdown captured when it was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
    pub method: PaymentMethod,
    pub note: String,
    pub breakdown: Vec<BreakdownLine>,
}

impl Payment {
    /// breakdown sums exactly to the amount paid
    pub fn is_reconciled(&self) -> bool {
        breakdown_total(&self.breakdown) == self.amount
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidPaymentAmount {
                amount: self.amount,
            });
        }
        if !self.is_reconciled() {
            return Err(LedgerError::InvalidPaymentAmount {
                amount: breakdown_total(&self.breakdown),
            });
        }
        Ok(())
    }

    /// validate and check the payment was made by `student`
    pub fn validate_for(&self, student: &Student) -> Result<()> {
        ensure_owner(student, self.student_id)?;
        self.validate()
    }
}

fn ensure_owner(student: &Student, owner: StudentId) -> Result<()> {
    if owner != student.id {
        return Err(LedgerError::StudentMismatch {
            expected: student.id,
            found: owner,
        });
    }
    Ok(())
}
