pub mod resolver;

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::types::{DataQualityIssue, ScheduleId};

pub use resolver::{EntryResolution, TimelineResolver, DEFAULT_MAX_PERIODS};

/// one calendar month, held as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        // day 1 exists in every month chrono can represent
        MonthKey(date - chrono::Days::new(u64::from(date.day0())))
    }

    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(MonthKey)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// following month, `None` past the end of the representable calendar
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(MonthKey)
    }

    /// human label, e.g. "January 2024"
    pub fn long_name(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthKey {
    type Err = LedgerError;

    /// parse "YYYY-MM"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidMonthKey {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::from_ymd(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(month: MonthKey) -> Self {
        month.to_string()
    }
}

/// a month the student is liable for and the schedule billed for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMonth {
    pub month: MonthKey,
    pub schedule_id: ScheduleId,
    /// resolved through the earliest-entry fallback
    pub fell_back: bool,
}

/// ordered, gap-free run of billing months for one student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub months: Vec<ResolvedMonth>,
    pub end_month: MonthKey,
    pub issues: Vec<DataQualityIssue>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn first_month(&self) -> Option<MonthKey> {
        self.months.first().map(|m| m.month)
    }

    pub fn is_truncated(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, DataQualityIssue::TimelineTruncated { .. }))
    }
}
