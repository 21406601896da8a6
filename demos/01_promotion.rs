/// promotion - moving a student between classes without rewriting past months
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use fee_ledger_rs::{ClassFeeSchedule, EventStore, Ledger, Money, SafeTimeProvider, Student, TimeSource};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    println!("=== promotion example ===\n");

    let class_4 = ClassFeeSchedule::new("Class 4", Money::from_major(1_000));
    let class_5 = ClassFeeSchedule::new("Class 5", Money::from_major(1_500));
    let schedules = vec![class_4.clone(), class_5.clone()];

    // controlled time, starting mid-february
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 2, 12, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let ledger = Ledger::new(&time);
    let mut events = EventStore::new();

    let student = Student::builder()
        .name("Ravi")
        .admitted_on(NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?)
        .schedule(class_4.id)
        .build()?;

    // promoted on 2024-02-12, takes effect 2024-03-01
    let promoted = ledger.promote(&student, class_5.id, &schedules, &mut events)?;
    println!("promoted on {}", time.now().format("%Y-%m-%d"));

    // advance three months
    controller.advance(Duration::days(90));
    println!("advanced to: {}\n", time.now().format("%Y-%m-%d"));

    let snapshot = ledger.snapshot_for(&promoted, &[], &[], &schedules)?;
    for period in &snapshot.periods {
        println!("{}  {}  {:?}", period.month, period.tuition, period.status);
    }
    println!("\ntotal expected: {}", snapshot.total_expected);
    println!("events emitted: {}", events.len());

    Ok(())
}
