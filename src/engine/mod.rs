pub mod decision;
pub mod scoring;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::decimal::{Money, Score};
use crate::errors::Result;
use crate::types::{Customer, LoanRecord, LoanRequest};

pub use decision::{monthly_installment, DecisionReason, DecisionRules, EligibilityResult};
pub use scoring::{CreditAssessment, CreditScorer, ScoreFactors};

/// stateless eligibility engine
///
/// Holds only configuration; every call works on the snapshot it is given,
/// so one engine can serve any number of concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    scorer: CreditScorer,
    rules: DecisionRules,
}

impl EligibilityEngine {
    /// create engine from a validated configuration
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: CreditScorer::new(config.scoring.clone()),
            rules: DecisionRules::new(config.tiers.clone(), config.affordability.clone()),
        })
    }

    pub fn compute_credit_score(
        &self,
        customer: &Customer,
        loans: &[LoanRecord],
        as_of: NaiveDate,
    ) -> CreditAssessment {
        self.scorer.compute_credit_score(customer, loans, as_of)
    }

    pub fn decide(
        &self,
        score: Score,
        active_loans_sum: Money,
        customer: &Customer,
        request: &LoanRequest,
    ) -> Result<EligibilityResult> {
        self.rules.decide(score, active_loans_sum, customer, request)
    }

    /// score then decide in one step
    pub fn evaluate(
        &self,
        customer: &Customer,
        loans: &[LoanRecord],
        request: &LoanRequest,
        as_of: NaiveDate,
    ) -> Result<EligibilityResult> {
        let assessment = self.compute_credit_score(customer, loans, as_of);
        self.decide(assessment.score, assessment.active_loans_sum, customer, request)
    }
}
