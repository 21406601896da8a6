/// school overview - collection and pending dues across every student
use chrono::{NaiveDate, TimeZone, Utc};
use fee_ledger_rs::{
    ClassFeeSchedule, EventStore, FeeCategory, FeeTemplate, Ledger, Money, MonthKey, Payment,
    PaymentMethod, SafeTimeProvider, Student, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== school overview example ===\n");

    let now = Utc.with_ymd_and_hms(2024, 4, 5, 8, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(now));
    let ledger = Ledger::new(&time);
    let mut events = EventStore::new();

    let class_4 = ClassFeeSchedule::new("Class 4", Money::from_major(900));
    let class_5 = ClassFeeSchedule::new("Class 5", Money::from_major(1_100));
    let schedules = vec![class_4.clone(), class_5.clone()];

    let admitted = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let students = vec![
        Student::builder().name("Asha").admitted_on(admitted).schedule(class_4.id).build()?,
        Student::builder().name("Ravi").admitted_on(admitted).schedule(class_5.id).build()?,
        Student::builder()
            .name("Meera")
            .admitted_on(admitted)
            .schedule(class_5.id)
            .inactive_since(NaiveDate::from_ymd_opt(2024, 2, 15).ok_or("bad date")?)
            .build()?,
    ];

    // annual day fee for everyone active in class 5
    let template = FeeTemplate {
        category: FeeCategory::Event,
        title: "Annual Day".to_string(),
        amount: Money::from_major(300),
        period: MonthKey::from_ymd(2024, 4).ok_or("bad month")?,
        due_date: NaiveDate::from_ymd_opt(2024, 4, 30).ok_or("bad date")?,
    };
    let items = ledger.apply_bulk_fee(class_5.id, &template, &students, &schedules, &mut events)?;
    println!("annual day fee applied to {} student(s)", items.len());

    let payments = vec![Payment {
        id: Uuid::new_v4(),
        student_id: students[0].id,
        amount: Money::from_major(2_000),
        paid_at: now,
        method: PaymentMethod::Online,
        note: String::new(),
        breakdown: Vec::new(),
    }];

    let overview = ledger.overview(&students, &schedules, &payments, &items);
    println!("\n{}", serde_json::to_string_pretty(&overview)?);

    Ok(())
}
