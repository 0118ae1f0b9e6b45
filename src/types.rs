use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{percent, Money, Rate};

/// unique identifier for a customer
pub type CustomerId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// registered customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: u64,
    pub monthly_salary: Money,
    /// set at registration, never changed afterwards
    pub approved_limit: Money,
}

/// customer fields before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub phone_number: u64,
    pub monthly_salary: Money,
    pub approved_limit: Money,
}

/// historical or newly created loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    pub tenure_months: u32,
    pub interest_rate: Rate,
    pub monthly_repayment: Money,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LoanRecord {
    /// every scheduled installment was paid on time
    pub fn is_paid_on_time(&self) -> bool {
        self.emis_paid_on_time >= self.tenure_months
    }

    /// end date has not passed as of the reference date
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.end_date >= as_of
    }

    pub fn started_in_year(&self, year: i32) -> bool {
        self.start_date.year() == year
    }

    pub fn repayments_left(&self) -> u32 {
        self.tenure_months.saturating_sub(self.emis_paid_on_time)
    }
}

/// loan fields before the store assigns an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    pub tenure_months: u32,
    pub interest_rate: Rate,
    pub monthly_repayment: Money,
    pub emis_paid_on_time: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// proposed loan, not persisted until approved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    #[serde(rename = "tenure")]
    pub tenure_months: u32,
}

impl LoanRequest {
    pub fn new(customer_id: CustomerId, loan_amount: Money, interest_rate: Rate, tenure_months: u32) -> Self {
        Self {
            customer_id,
            loan_amount,
            interest_rate,
            tenure_months,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(tenure: u32, paid: u32, start: NaiveDate, end: NaiveDate) -> LoanRecord {
        LoanRecord {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            loan_amount: Money::from_major(100_000),
            tenure_months: tenure,
            interest_rate: Rate::from_percentage(12),
            monthly_repayment: Money::from_major(10_000),
            emis_paid_on_time: paid,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_loan_record_predicates() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let record = loan(12, 12, start, end);

        assert!(record.is_paid_on_time());
        assert!(record.is_active(end));
        assert!(!record.is_active(end.succ_opt().unwrap()));
        assert!(record.started_in_year(2024));
        assert_eq!(record.repayments_left(), 0);
    }

    #[test]
    fn test_repayments_left_never_negative() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let record = loan(6, 9, start, start);
        assert_eq!(record.repayments_left(), 0);

        let partial = loan(12, 4, start, start);
        assert_eq!(partial.repayments_left(), 8);
        assert!(!partial.is_paid_on_time());
    }

    #[test]
    fn test_loan_request_wire_format() {
        let customer_id = Uuid::new_v4();
        let json = format!(
            r#"{{"customer_id": "{}", "loan_amount": 100000, "interest_rate": 12, "tenure": 12}}"#,
            customer_id
        );
        let request: LoanRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(request.customer_id, customer_id);
        assert_eq!(request.loan_amount, Money::from_major(100_000));
        assert_eq!(request.interest_rate, Rate::from_percentage(12));
        assert_eq!(request.tenure_months, 12);
    }
}
