use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScoringWeights;
use crate::decimal::{Money, Score};
use crate::types::{Customer, LoanRecord};

/// raw inputs to the score, counted over a customer's loan history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScoreFactors {
    pub paid_on_time: u32,
    pub total_loans: u32,
    pub loans_this_year: u32,
    pub total_volume: Money,
    /// sum of monthly repayments on loans still running
    pub active_loans_sum: Money,
}

impl ScoreFactors {
    /// count factors as of the reference date
    pub fn collect(loans: &[LoanRecord], as_of: NaiveDate) -> Self {
        let year = as_of.year();

        loans.iter().fold(ScoreFactors::default(), |mut acc, loan| {
            acc.total_loans += 1;
            acc.total_volume = acc.total_volume.saturating_add(loan.loan_amount);
            if loan.is_paid_on_time() {
                acc.paid_on_time += 1;
            }
            if loan.started_in_year(year) {
                acc.loans_this_year += 1;
            }
            if loan.is_active(as_of) {
                acc.active_loans_sum = acc.active_loans_sum.saturating_add(loan.monthly_repayment);
            }
            acc
        })
    }
}

/// credit score together with the customer's current repayment load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub score: Score,
    pub active_loans_sum: Money,
}

/// computes credit scores from loan history
#[derive(Debug, Clone, Default)]
pub struct CreditScorer {
    weights: ScoringWeights,
}

impl CreditScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// score a customer's loan history as of the given date
    ///
    /// Active repayments above the approved limit zero the score outright.
    /// Otherwise the weighted factors are summed and capped at the maximum.
    /// An empty history scores zero.
    pub fn compute_credit_score(
        &self,
        customer: &Customer,
        loans: &[LoanRecord],
        as_of: NaiveDate,
    ) -> CreditAssessment {
        let factors = ScoreFactors::collect(loans, as_of);

        let score = if factors.active_loans_sum > customer.approved_limit {
            Score::ZERO
        } else {
            self.score_factors(&factors)
        };

        CreditAssessment {
            score,
            active_loans_sum: factors.active_loans_sum,
        }
    }

    /// weighted sum of the factors, capped; terms saturate instead of overflowing
    pub fn score_factors(&self, factors: &ScoreFactors) -> Score {
        let w = &self.weights;
        let volume = factors
            .total_volume
            .as_decimal()
            .checked_div(w.volume_divisor)
            .unwrap_or(Decimal::MAX);
        let raw = Decimal::from(factors.paid_on_time)
            .saturating_mul(w.paid_on_time)
            .saturating_add(Decimal::from(factors.total_loans).saturating_mul(w.per_loan))
            .saturating_add(Decimal::from(factors.loans_this_year).saturating_mul(w.current_year))
            .saturating_add(volume);

        Score::from_decimal(raw).cap(w.max_score)
    }
}
