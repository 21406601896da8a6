/// quick start - minimal example to get started
use chrono::{NaiveDate, TimeZone, Utc};
use fee_ledger_rs::{compute_dues_snapshot, ClassFeeSchedule, Money, Student};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a class billed 1,000 a month
    let schedule = ClassFeeSchedule::new("Class 5", Money::from_major(1_000));

    // admitted mid-january, with a 200 transport fee
    let student = Student::builder()
        .name("Asha")
        .roll_no("12")
        .admitted_on(NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad date")?)
        .schedule(schedule.id)
        .transport_fee(Money::from_major(200))
        .build()?;

    let as_of = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let snapshot = compute_dues_snapshot(
        &student,
        &schedule,
        &[],
        &[],
        &[schedule.clone()],
        Some(as_of),
    );

    // print current dues
    println!("{}", snapshot.to_json_pretty());

    Ok(())
}
