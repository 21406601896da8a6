pub mod calculator;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::records::{ClassFeeSchedule, OneOffFeeItem};
use crate::timeline::MonthKey;
use crate::types::{DataQualityIssue, ScheduleId};

pub use calculator::AccrualCalculator;

/// read-through lookup of live class fee schedules by identity
pub trait ScheduleLookup {
    fn find_schedule(&self, id: ScheduleId) -> Option<&ClassFeeSchedule>;
}

impl ScheduleLookup for [ClassFeeSchedule] {
    fn find_schedule(&self, id: ScheduleId) -> Option<&ClassFeeSchedule> {
        self.iter().find(|schedule| schedule.id == id)
    }
}

impl ScheduleLookup for Vec<ClassFeeSchedule> {
    fn find_schedule(&self, id: ScheduleId) -> Option<&ClassFeeSchedule> {
        self.as_slice().find_schedule(id)
    }
}

impl ScheduleLookup for HashMap<ScheduleId, ClassFeeSchedule> {
    fn find_schedule(&self, id: ScheduleId) -> Option<&ClassFeeSchedule> {
        self.get(&id)
    }
}

/// one month of tuition plus transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub month: MonthKey,
    /// schedule whose fee was charged
    pub schedule_id: ScheduleId,
    pub tuition: Money,
    pub transport: Money,
    pub expected: Money,
}

/// everything a student has accrued up to the timeline end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accrual {
    pub periods: Vec<BillingPeriod>,
    /// one-off items in stored order
    pub items: Vec<OneOffFeeItem>,
    pub total_tuition: Money,
    pub total_transport: Money,
    pub total_items: Money,
    pub total_expected: Money,
    pub issues: Vec<DataQualityIssue>,
}

impl Accrual {
    pub fn period(&self, month: MonthKey) -> Option<&BillingPeriod> {
        self.periods.iter().find(|period| period.month == month)
    }

    pub fn total_periods_expected(&self) -> Money {
        self.total_tuition + self.total_transport
    }
}
