/// quick start - register a customer and check a loan request
use credit_approval_rs::serialization::RegisterRequest;
use credit_approval_rs::serialization::to_json_pretty;
use credit_approval_rs::{InMemoryStore, LoanRequest, LoanService, Money, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let service = LoanService::new(InMemoryStore::new());

    // register with a monthly income of 50,000
    let registered = service.register(
        RegisterRequest {
            first_name: "Ana".to_string(),
            last_name: "Mesa".to_string(),
            age: 25,
            monthly_income: Money::from_major(50_000),
            phone_number: 9953004088,
        },
        &SafeTimeProvider::new(TimeSource::System),
    )?;
    println!("approved limit: {}", registered.approved_limit);

    // a brand new customer has no history, so the score is zero
    let request = LoanRequest::new(registered.customer_id, Money::from_major(100_000), Rate::from_percentage(12), 12);
    let eligibility = service.check_eligibility_now(&request)?;
    println!("{}", to_json_pretty(&eligibility)?);

    Ok(())
}
