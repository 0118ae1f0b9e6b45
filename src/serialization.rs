/// json request and response views of the loan service
use serde::{Deserialize, Deserializer, Serialize};

use crate::decimal::{percent, Money, Rate, Score};
use crate::engine::EligibilityResult;
use crate::errors::Result;
use crate::types::{Customer, CustomerId, LoanId, LoanRecord};

/// registration payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub monthly_income: Money,
    #[serde(deserialize_with = "phone_number")]
    pub phone_number: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub customer_id: CustomerId,
    pub approved_limit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResponse {
    pub customer_id: CustomerId,
    pub approval: bool,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    /// present only when a tier floor replaced the requested rate
    #[serde(with = "percent::option")]
    pub corrected_interest_rate: Option<Rate>,
    pub rate_corrected: bool,
    pub tenure: u32,
    pub monthly_installment: Money,
    pub credit_score: Score,
}

impl From<&EligibilityResult> for EligibilityResponse {
    fn from(result: &EligibilityResult) -> Self {
        EligibilityResponse {
            customer_id: result.customer_id,
            approval: result.approved,
            interest_rate: result.requested_rate,
            corrected_interest_rate: result.rate_corrected.then_some(result.corrected_rate),
            rate_corrected: result.rate_corrected,
            tenure: result.tenure_months,
            monthly_installment: result.monthly_installment,
            credit_score: result.credit_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLoanResponse {
    pub loan_id: Option<LoanId>,
    pub customer_id: CustomerId,
    pub loan_approved: bool,
    pub message: String,
    pub monthly_installment: Money,
}

impl CreateLoanResponse {
    pub fn approved(loan: &LoanRecord) -> Self {
        CreateLoanResponse {
            loan_id: Some(loan.id),
            customer_id: loan.customer_id,
            loan_approved: true,
            message: "Loan approved!".to_string(),
            monthly_installment: loan.monthly_repayment,
        }
    }

    pub fn rejected(customer_id: CustomerId) -> Self {
        CreateLoanResponse {
            loan_id: None,
            customer_id,
            loan_approved: false,
            message: "Loan not approved due to eligibility criteria.".to_string(),
            monthly_installment: Money::ZERO,
        }
    }
}

/// customer block embedded in loan details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: u64,
    pub age: u32,
}

impl From<&Customer> for CustomerSummary {
    fn from(customer: &Customer) -> Self {
        CustomerSummary {
            id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone_number: customer.phone_number,
            age: customer.age,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetailView {
    pub id: LoanId,
    pub customer: CustomerSummary,
    pub loan_amount: Money,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub monthly_repayment: Money,
    pub tenure: u32,
}

impl LoanDetailView {
    pub fn new(loan: &LoanRecord, customer: &Customer) -> Self {
        LoanDetailView {
            id: loan.id,
            customer: CustomerSummary::from(customer),
            loan_amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_repayment: loan.monthly_repayment,
            tenure: loan.tenure_months,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummaryView {
    pub id: LoanId,
    pub loan_amount: Money,
    /// stored loans were all approved when created
    pub loan_approved: bool,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub monthly_repayment: Money,
    pub repayments_left: u32,
}

impl From<&LoanRecord> for LoanSummaryView {
    fn from(loan: &LoanRecord) -> Self {
        LoanSummaryView {
            id: loan.id,
            loan_amount: loan.loan_amount,
            loan_approved: true,
            interest_rate: loan.interest_rate,
            monthly_repayment: loan.monthly_repayment,
            repayments_left: loan.repayments_left(),
        }
    }
}

/// convert any view to a pretty-printed json string
pub fn to_json_pretty<T: Serialize>(view: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// phone numbers arrive as json numbers or digit strings
fn phone_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Phone {
        Number(u64),
        Text(String),
    }

    match Phone::deserialize(deserializer)? {
        Phone::Number(n) => Ok(n),
        Phone::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid phone number: {s:?}"))),
    }
}
