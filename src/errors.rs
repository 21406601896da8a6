use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::Money;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("negative amount for {field}: {amount}")]
    NegativeAmount {
        field: &'static str,
        amount: Money,
    },

    #[error("{field} must not be empty")]
    EmptyField {
        field: &'static str,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid month key: {value}")]
    InvalidMonthKey {
        value: String,
    },

    #[error("class fee schedule not found: {id}")]
    ScheduleNotFound {
        id: Uuid,
    },

    #[error("student not found: {id}")]
    StudentNotFound {
        id: Uuid,
    },

    #[error("record belongs to student {found}, expected {expected}")]
    StudentMismatch {
        expected: Uuid,
        found: Uuid,
    },

    #[error("inactivation date {inactive_since} precedes admission date {admission}")]
    InactivationBeforeAdmission {
        admission: NaiveDate,
        inactive_since: NaiveDate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
