/// eligibility tiers - how score and rate interact
use credit_approval_rs::{Customer, EligibilityEngine, LoanRequest, Money, Rate, Score, Uuid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== approval tiers ===\n");

    let engine = EligibilityEngine::default();
    let customer = Customer {
        id: Uuid::new_v4(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        age: 30,
        phone_number: 8093707370,
        monthly_salary: Money::from_major(50_000),
        approved_limit: Money::from_major(1_800_000),
    };

    for score in [80, 50, 40, 30, 20, 10] {
        for rate in [10, 14, 18] {
            let request = LoanRequest::new(customer.id, Money::from_major(100_000), Rate::from_percentage(rate), 12);
            let result = engine.decide(Score::from(score), Money::ZERO, &customer, &request)?;
            println!(
                "score {:>3}  requested {:>3}  approved {:<5}  rate {:>3}{}  installment {}",
                score,
                result.requested_rate,
                result.approved,
                result.corrected_rate,
                if result.rate_corrected { " (corrected)" } else { "" },
                result.monthly_installment.round_dp(2),
            );
        }
    }

    println!("\n=== affordability gate ===\n");

    // active repayments above half the salary block even the best score
    let request = LoanRequest::new(customer.id, Money::from_major(100_000), Rate::from_percentage(14), 12);
    let result = engine.decide(Score::MAX, Money::from_major(30_000), &customer, &request)?;
    println!("score 100 with 30,000 active repayments: approved {} ({:?})", result.approved, result.reason);

    Ok(())
}
