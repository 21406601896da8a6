/// payment preview - live breakdown while an amount is typed, then commit
use chrono::{NaiveDate, TimeZone, Utc};
use fee_ledger_rs::{
    ClassFeeSchedule, EventStore, FeeCategory, Ledger, Money, OneOffFeeItem, MonthKey,
    PaymentMethod, SafeTimeProvider, Student, TimeSource, Uuid,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    println!("=== payment preview example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap(),
    ));
    let ledger = Ledger::new(&time);
    let mut events = EventStore::new();

    let schedule = ClassFeeSchedule::new("Class 5", Money::from_major(1_000));
    let schedules = vec![schedule.clone()];
    let student = Student::builder()
        .name("Asha")
        .admitted_on(NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad date")?)
        .schedule(schedule.id)
        .transport_fee(Money::from_major(200))
        .build()?;

    let exam = OneOffFeeItem {
        id: Uuid::new_v4(),
        student_id: student.id,
        category: FeeCategory::Exam,
        title: "Term 1 Exam".to_string(),
        amount: Money::from_major(500),
        period: MonthKey::from_ymd(2024, 3).ok_or("bad month")?,
        due_date: NaiveDate::from_ymd_opt(2024, 3, 20).ok_or("bad date")?,
    };
    let items = vec![exam];
    let mut payments = Vec::new();

    // what would different amounts cover?
    let snapshot = ledger.snapshot_for(&student, &payments, &items, &schedules)?;
    for typed in [500, 1_500, 5_000] {
        let preview = ledger.preview(&snapshot, Money::from_major(typed));
        println!("preview for {}:", typed);
        for line in &preview.lines {
            println!("  {:<45} {}", line.description, line.amount);
        }
    }

    // commit a payment
    let payment = ledger.record_payment(
        &snapshot,
        Money::from_major(1_500),
        PaymentMethod::Cash,
        "counter receipt",
        &mut events,
    )?;
    println!("\nrecorded payment {} for {}", payment.id, payment.amount);
    payments.push(payment);

    // balances are always replayed from the full history
    let snapshot = ledger.snapshot_for(&student, &payments, &items, &schedules)?;
    println!("balance after payment: {}", snapshot.balance);
    for line in &snapshot.outstanding {
        println!("  outstanding: {:<35} {}", line.description, line.amount);
    }

    Ok(())
}
