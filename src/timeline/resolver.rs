use chrono::NaiveDate;
use tracing::warn;

use crate::records::{ClassHistoryEntry, Student};
use crate::timeline::{MonthKey, ResolvedMonth, Timeline};
use crate::types::{DataQualityIssue, ScheduleId};

/// roughly 41 years of monthly billing
pub const DEFAULT_MAX_PERIODS: usize = 500;

/// which history entry governs a month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryResolution {
    /// latest entry starting on or before the month
    Active(ScheduleId),
    /// every entry starts after the month, earliest entry used
    EarliestFallback(ScheduleId),
}

impl EntryResolution {
    pub fn schedule_id(&self) -> ScheduleId {
        match self {
            EntryResolution::Active(id) | EntryResolution::EarliestFallback(id) => *id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, EntryResolution::EarliestFallback(_))
    }
}

/// expands a student's enrollment into billing months
#[derive(Debug, Clone, Copy)]
pub struct TimelineResolver {
    max_periods: usize,
}

impl Default for TimelineResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PERIODS)
    }
}

impl TimelineResolver {
    pub fn new(max_periods: usize) -> Self {
        Self {
            max_periods: max_periods.max(1),
        }
    }

    pub fn max_periods(&self) -> usize {
        self.max_periods
    }

    /// inactivation month for a student who left, otherwise the as-of month
    pub fn end_month(&self, student: &Student, as_of: NaiveDate) -> MonthKey {
        MonthKey::from_date(student.billing_stop_date().unwrap_or(as_of))
    }

    /// pick the history entry governing `month`.
    ///
    /// The latest entry whose start is on or before the first day of the
    /// month wins; equal start dates go to the entry recorded last. When no
    /// entry qualifies the chronologically earliest one is used instead.
    /// Returns `None` only for an empty history.
    pub fn resolve_entry(history: &[ClassHistoryEntry], month: MonthKey) -> Option<EntryResolution> {
        let target = month.first_day();

        let active = history
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.effective_from <= target)
            .max_by_key(|(index, entry)| (entry.effective_from, *index));

        if let Some((_, entry)) = active {
            return Some(EntryResolution::Active(entry.schedule_id));
        }

        history
            .iter()
            .enumerate()
            .min_by_key(|(index, entry)| (entry.effective_from, std::cmp::Reverse(*index)))
            .map(|(_, entry)| EntryResolution::EarliestFallback(entry.schedule_id))
    }

    /// build the month-by-month timeline from admission through the end month
    pub fn resolve(&self, student: &Student, as_of: NaiveDate) -> Timeline {
        let mut issues = Vec::new();
        let start = MonthKey::from_date(student.admission_date);
        let end_month = self.end_month(student, as_of);

        if let Some(stop) = student.billing_stop_date() {
            if stop < student.admission_date {
                warn!(
                    student_id = %student.id,
                    admission = %student.admission_date,
                    inactive_since = %stop,
                    "inactivation precedes admission, billing admission month only"
                );
                issues.push(DataQualityIssue::InactivationBeforeAdmission);
            }
        }

        let history = student.effective_history();
        let mut months: Vec<ResolvedMonth> = Vec::new();
        let mut fallback_months = 0usize;
        let mut cursor = Some(start);

        while let Some(month) = cursor {
            // at least one period even when the end precedes admission
            if !months.is_empty() && month > end_month {
                break;
            }
            if months.len() == self.max_periods {
                warn!(
                    student_id = %student.id,
                    cap = self.max_periods,
                    "billing timeline exceeds cap, truncating"
                );
                issues.push(DataQualityIssue::TimelineTruncated {
                    cap: self.max_periods,
                });
                break;
            }

            // history is never empty here, the implicit entry covers that case
            let Some(resolution) = Self::resolve_entry(&history, month) else {
                break;
            };
            if resolution.is_fallback() {
                fallback_months += 1;
                issues.push(DataQualityIssue::HistoryFallbackToEarliest { month });
            }

            months.push(ResolvedMonth {
                month,
                schedule_id: resolution.schedule_id(),
                fell_back: resolution.is_fallback(),
            });
            cursor = month.next();
        }

        if fallback_months > 0 {
            warn!(
                student_id = %student.id,
                months = fallback_months,
                "class history has no entry covering some months, using earliest entry"
            );
        }

        Timeline {
            months,
            end_month,
            issues,
        }
    }
}
