use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{AffordabilityConfig, ApprovalTiers};
use crate::decimal::{percent, Money, Rate, Score};
use crate::errors::{ApprovalError, Result};
use crate::types::{Customer, CustomerId, LoanRequest};

/// why a request was approved or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionReason {
    Approved,
    /// score at or below the lowest tier bound
    ScoreTooLow,
    /// active repayments exceed the allowed share of salary
    AffordabilityExceeded,
}

/// outcome of one eligibility decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub customer_id: CustomerId,
    pub credit_score: Score,
    pub approved: bool,
    pub reason: DecisionReason,
    #[serde(with = "percent")]
    pub requested_rate: Rate,
    /// equals `requested_rate` unless a tier floor replaced it
    #[serde(with = "percent")]
    pub corrected_rate: Rate,
    pub rate_corrected: bool,
    pub tenure_months: u32,
    /// computed at the corrected rate, even when rejected
    pub monthly_installment: Money,
    pub current_active_loans_sum: Money,
}

/// monthly installment as simple interest spread evenly over the tenure
///
/// `amount * rate / tenure`. This is not an amortizing EMI; the formula is
/// kept as is for compatibility with stored repayments.
pub fn monthly_installment(loan_amount: Money, rate: Rate, tenure_months: u32) -> Result<Money> {
    if tenure_months == 0 {
        return Err(ApprovalError::invalid_input("tenure must be at least one month"));
    }
    if loan_amount.is_negative() {
        return Err(ApprovalError::invalid_input(format!(
            "loan amount must not be negative: {}",
            loan_amount
        )));
    }

    loan_amount
        .as_decimal()
        .checked_mul(rate.as_decimal())
        .and_then(|interest| interest.checked_div(Decimal::from(tenure_months)))
        .map(Money::from_decimal)
        .ok_or_else(|| {
            ApprovalError::invalid_input(format!(
                "installment out of range for {} at {}",
                loan_amount, rate
            ))
        })
}

/// applies approval tiers and the affordability gate to a scored customer
#[derive(Debug, Clone, Default)]
pub struct DecisionRules {
    tiers: ApprovalTiers,
    affordability: AffordabilityConfig,
}

impl DecisionRules {
    pub fn new(tiers: ApprovalTiers, affordability: AffordabilityConfig) -> Self {
        Self { tiers, affordability }
    }

    /// decide on a loan request
    ///
    /// The affordability gate overrides any tier approval, but the rate
    /// correction from the tier is still reported.
    pub fn decide(
        &self,
        score: Score,
        active_loans_sum: Money,
        customer: &Customer,
        request: &LoanRequest,
    ) -> Result<EligibilityResult> {
        if request.customer_id != customer.id {
            return Err(ApprovalError::invalid_input(format!(
                "request for customer {} evaluated against customer {}",
                request.customer_id, customer.id
            )));
        }

        let requested_rate = request.interest_rate;
        let (mut approved, corrected_rate, rate_corrected) =
            match self.tiers.tier_for(score.as_decimal()) {
                None => (false, requested_rate, false),
                Some(tier) => match tier.rate_floor {
                    Some(floor) if requested_rate <= floor.minimum_exclusive => {
                        (true, floor.corrected_rate, true)
                    }
                    _ => (true, requested_rate, false),
                },
            };

        let mut reason = if approved {
            DecisionReason::Approved
        } else {
            DecisionReason::ScoreTooLow
        };

        let allowed = customer
            .monthly_salary
            .fraction(self.affordability.max_repayment_to_salary);
        if active_loans_sum > allowed {
            if approved {
                reason = DecisionReason::AffordabilityExceeded;
            }
            approved = false;
        }

        let installment = monthly_installment(request.loan_amount, corrected_rate, request.tenure_months)?;

        Ok(EligibilityResult {
            customer_id: customer.id,
            credit_score: score,
            approved,
            reason,
            requested_rate,
            corrected_rate,
            rate_corrected,
            tenure_months: request.tenure_months,
            monthly_installment: installment,
            current_active_loans_sum: active_loans_sum,
        })
    }
}
