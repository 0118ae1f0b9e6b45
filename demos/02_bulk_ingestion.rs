/// bulk ingestion - load customer and loan sheets, then score the customers
use std::io::Cursor;

use chrono::{TimeZone, Utc};
use credit_approval_rs::{InMemoryStore, LoanRequest, LoanService, Money, Rate, SafeTimeProvider, TimeSource};
use tracing_subscriber::EnvFilter;

const CUSTOMERS: &str = "Customer ID,First Name,Last Name,Age,Phone Number,Monthly Salary,Approved Limit
1,Aaron,Garcia,63,9629317944,178000,6400000
2,Adna,Cross,41,9842826536,65000,2300000
";

const LOANS: &str = "Customer ID,Loan ID,Loan Amount,Tenure,Interest Rate,Monthly payment,EMIs paid on Time,Date of Approval,End Date
1,7798,900000,12,16.93,20489,12,2023-07-24,2024-07-24
1,7799,600000,24,9.5,27500,24,2022-01-01,2024-01-01
2,7800,300000,24,14,15000,3,2024-06-01,2026-06-01
7,7801,50000,12,10,4500,12,2024-01-01,2025-01-01
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
    let service = LoanService::new(InMemoryStore::new());

    // customers first: the mapping they return is what loans are matched against
    let mapping = service.ingest_customers_csv(Cursor::new(CUSTOMERS))?;
    let report = service.ingest_loans_csv(Cursor::new(LOANS), &mapping)?;
    println!("loans created: {}, skipped: {}\n", report.created, report.skipped.len());

    for external_id in [1, 2] {
        let Some(customer_id) = mapping.get(external_id) else {
            continue;
        };
        let request = LoanRequest::new(customer_id, Money::from_major(200_000), Rate::from_percentage(11), 24);
        let eligibility = service.check_eligibility(&request, &time)?;
        println!(
            "customer {}: score {}, approved {}, rate {}",
            external_id,
            eligibility.credit_score,
            eligibility.approval,
            eligibility.corrected_interest_rate.unwrap_or(eligibility.interest_rate),
        );
    }

    Ok(())
}
