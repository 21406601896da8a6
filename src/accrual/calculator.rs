use tracing::warn;

use crate::accrual::{Accrual, BillingPeriod, ScheduleLookup};
use crate::decimal::Money;
use crate::records::{ClassFeeSchedule, OneOffFeeItem};
use crate::timeline::Timeline;
use crate::types::DataQualityIssue;

/// prices a resolved timeline against live schedules
pub struct AccrualCalculator;

impl AccrualCalculator {
    /// accrue tuition and transport for every timeline month and add the
    /// one-off items.
    ///
    /// `current` is the student's present schedule. It prices any month whose
    /// resolved schedule is missing from `schedules`.
    pub fn accrue<S>(
        timeline: &Timeline,
        current: &ClassFeeSchedule,
        schedules: &S,
        transport: Money,
        items: &[OneOffFeeItem],
    ) -> Accrual
    where
        S: ScheduleLookup + ?Sized,
    {
        let mut issues = Vec::new();
        let mut periods = Vec::with_capacity(timeline.len());

        for resolved in &timeline.months {
            let schedule = match schedules.find_schedule(resolved.schedule_id) {
                Some(schedule) => schedule,
                None => {
                    issues.push(DataQualityIssue::ScheduleMissing {
                        schedule_id: resolved.schedule_id,
                        month: resolved.month,
                    });
                    current
                }
            };

            periods.push(BillingPeriod {
                month: resolved.month,
                schedule_id: schedule.id,
                tuition: schedule.monthly_fee,
                transport,
                expected: schedule.monthly_fee + transport,
            });
        }

        if !issues.is_empty() {
            warn!(
                schedule_id = %current.id,
                months = issues.len(),
                "class history references unknown schedules, billing current schedule fee"
            );
        }

        let total_tuition: Money = periods.iter().map(|p| p.tuition).sum();
        let total_transport = transport * periods.len() as u32;
        let total_items: Money = items.iter().map(|item| item.amount).sum();

        Accrual {
            total_expected: total_tuition + total_transport + total_items,
            periods,
            items: items.to_vec(),
            total_tuition,
            total_transport,
            total_items,
            issues,
        }
    }
}
