/// json views - responses as an http adapter would return them
use std::io::Cursor;

use chrono::{TimeZone, Utc};
use credit_approval_rs::serialization::to_json_pretty;
use credit_approval_rs::{InMemoryStore, LoanRequest, LoanService, SafeTimeProvider, TimeSource};

const CUSTOMERS: &str = "Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary,Approved Limit
1,Aaron,Garcia,63,9629317944,178000,6400000
";

const LOANS: &str = "Customer ID,Loan ID,Loan Amount,Tenure,Interest Rate,Monthly payment,EMIs paid on Time,Date of Approval,End Date
1,7798,900000,12,16.93,20489,12,2023-07-24,2024-07-24
1,7799,600000,24,9.5,27500,24,2022-01-01,2024-01-01
1,7800,400000,12,10,3500,12,2025-01-01,2025-02-01
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json views ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
    let service = LoanService::new(InMemoryStore::new());
    let mapping = service.ingest_customers_csv(Cursor::new(CUSTOMERS))?;
    service.ingest_loans_csv(Cursor::new(LOANS), &mapping)?;
    let customer_id = mapping.get(1).ok_or("customer 1 was not ingested")?;

    // payload exactly as posted to create-loan
    let body = format!(
        r#"{{"customer_id": "{}", "loan_amount": 100000, "interest_rate": 12, "tenure": 12}}"#,
        customer_id
    );
    let request: LoanRequest = serde_json::from_str(&body)?;

    println!("check-eligibility:");
    println!("{}\n", to_json_pretty(&service.check_eligibility(&request, &time)?)?);

    let created = service.create_loan(&request, &time)?;
    println!("create-loan:");
    println!("{}\n", to_json_pretty(&created)?);

    if let Some(loan_id) = created.loan_id {
        println!("view-loan:");
        println!("{}\n", to_json_pretty(&service.view_loan(loan_id)?)?);
    }

    println!("view-loans:");
    println!("{}\n", to_json_pretty(&service.view_loans(customer_id)?)?);

    println!("events:");
    for event in service.take_events()? {
        println!("  {:?}", event);
    }

    Ok(())
}
