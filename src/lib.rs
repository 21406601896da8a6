pub mod accrual;
pub mod allocation;
pub mod config;
pub mod decimal;
pub mod enrollment;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod overview;
pub mod records;
pub mod timeline;
pub mod types;

// re-export key types
pub use accrual::{Accrual, AccrualCalculator, BillingPeriod, ScheduleLookup};
pub use allocation::{
    AllocationBreakdown, AllocationEngine, AllocationPriority, Obligation, ObligationKind,
    Settlement,
};
pub use config::LedgerConfig;
pub use decimal::Money;
pub use errors::{LedgerError, Result};
pub use events::{EventStore, LedgerEvent};
pub use ledger::{
    compute_dues_snapshot, compute_dues_snapshot_with, preview_allocation,
    preview_allocation_with, DuesSnapshot, ItemLedgerLine, Ledger, PeriodLedgerLine,
};
pub use overview::{school_overview, ClassEnrollment, SchoolOverview};
pub use records::{
    ClassFeeSchedule, ClassHistoryEntry, FeeTemplate, OneOffFeeItem, Payment, Student,
    StudentBuilder,
};
pub use timeline::{MonthKey, ResolvedMonth, Timeline, TimelineResolver};
pub use types::{
    BreakdownLine, DataQualityIssue, FeeCategory, FeeItemId, PaymentId, PaymentMethod,
    PeriodStatus, ScheduleId, StudentId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
