use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{percent, Money, Rate};
use crate::errors::{ApprovalError, Result};

/// engine configuration
///
/// `Default` reproduces the production rules exactly; JSON overrides may
/// replace any section and omitted sections keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringWeights,
    pub tiers: ApprovalTiers,
    pub affordability: AffordabilityConfig,
    pub registration: RegistrationPolicy,
    pub loan_terms: LoanTermPolicy,
    pub audit: AuditConfig,
}

/// credit score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// points per loan fully paid on time
    pub paid_on_time: Decimal,
    /// points per loan ever taken
    pub per_loan: Decimal,
    /// points per loan started in the reference year
    pub current_year: Decimal,
    /// total volume is divided by this (one lakh)
    pub volume_divisor: Decimal,
    pub max_score: Decimal,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            paid_on_time: dec!(25),
            per_loan: dec!(10),
            current_year: dec!(10),
            volume_divisor: dec!(100000),
            max_score: dec!(100),
        }
    }
}

/// ordered approval tiers, highest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalTiers(pub Vec<ApprovalTier>);

/// approval tier: applies when the score is strictly above `above_score`
/// and not above the previous tier's bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalTier {
    pub above_score: Decimal,
    pub rate_floor: Option<RateFloor>,
}

/// requested rates at or below `minimum_exclusive` are replaced by `corrected_rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateFloor {
    #[serde(with = "percent")]
    pub minimum_exclusive: Rate,
    #[serde(with = "percent")]
    pub corrected_rate: Rate,
}

impl Default for ApprovalTiers {
    fn default() -> Self {
        ApprovalTiers(vec![
            ApprovalTier {
                above_score: dec!(50),
                rate_floor: None,
            },
            ApprovalTier {
                above_score: dec!(30),
                rate_floor: Some(RateFloor {
                    minimum_exclusive: Rate::from_percentage(12),
                    corrected_rate: Rate::from_percentage(16),
                }),
            },
            ApprovalTier {
                above_score: dec!(10),
                rate_floor: Some(RateFloor {
                    minimum_exclusive: Rate::from_percentage(16),
                    corrected_rate: Rate::from_percentage(20),
                }),
            },
        ])
    }
}

impl ApprovalTiers {
    /// first tier whose bound the score strictly exceeds; `None` means reject
    pub fn tier_for(&self, score: Decimal) -> Option<&ApprovalTier> {
        self.0.iter().find(|tier| score > tier.above_score)
    }
}

/// emi affordability gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityConfig {
    /// active repayments above this share of monthly salary force rejection
    pub max_repayment_to_salary: Decimal,
}

impl Default for AffordabilityConfig {
    fn default() -> Self {
        Self {
            max_repayment_to_salary: dec!(0.5),
        }
    }
}

/// approved limit assignment at registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationPolicy {
    pub salary_multiplier: Decimal,
    pub rounding_unit: Money,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            salary_multiplier: dec!(36),
            rounding_unit: Money::from_major(100_000),
        }
    }
}

impl RegistrationPolicy {
    /// multiplier times income, rounded half-to-even to the nearest unit
    pub fn approved_limit(&self, monthly_income: Money) -> Result<Money> {
        let unit = self.rounding_unit.as_decimal();
        self.salary_multiplier
            .checked_mul(monthly_income.as_decimal())
            .and_then(|limit| limit.checked_div(unit))
            .map(|units| units.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
            .and_then(|units| units.checked_mul(unit))
            .map(Money::from_decimal)
            .ok_or_else(|| {
                ApprovalError::invalid_input(format!("monthly income out of range: {monthly_income}"))
            })
    }
}

/// dates for newly created loans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanTermPolicy {
    pub days_per_month: u32,
}

impl Default for LoanTermPolicy {
    fn default() -> Self {
        Self { days_per_month: 30 }
    }
}

/// bounds for the in-memory audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// oldest events are dropped once this many are held
    pub max_events: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { max_events: 10_000 }
    }
}

impl EngineConfig {
    /// load from json, filling omitted sections with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        if scoring.volume_divisor <= Decimal::ZERO {
            return Err(invalid("volume divisor must be positive"));
        }
        if scoring.max_score <= Decimal::ZERO {
            return Err(invalid("max score must be positive"));
        }
        if [scoring.paid_on_time, scoring.per_loan, scoring.current_year]
            .iter()
            .any(|w| *w < Decimal::ZERO)
        {
            return Err(invalid("scoring weights must not be negative"));
        }

        if self.tiers.0.is_empty() {
            return Err(invalid("at least one approval tier is required"));
        }
        for pair in self.tiers.0.windows(2) {
            if pair[1].above_score >= pair[0].above_score {
                return Err(invalid(format!(
                    "approval tiers must be strictly descending: {} follows {}",
                    pair[1].above_score, pair[0].above_score
                )));
            }
        }
        for floor in self.tiers.0.iter().filter_map(|t| t.rate_floor) {
            if floor.corrected_rate <= floor.minimum_exclusive {
                return Err(invalid(format!(
                    "corrected rate {} must exceed floor {}",
                    floor.corrected_rate, floor.minimum_exclusive
                )));
            }
        }

        if self.affordability.max_repayment_to_salary < Decimal::ZERO {
            return Err(invalid("affordability ratio must not be negative"));
        }
        if self.registration.salary_multiplier < Decimal::ZERO {
            return Err(invalid("salary multiplier must not be negative"));
        }
        if self.registration.rounding_unit <= Money::ZERO {
            return Err(invalid("rounding unit must be positive"));
        }
        if self.loan_terms.days_per_month == 0 {
            return Err(invalid("days per month must be positive"));
        }
        if self.audit.max_events == 0 {
            return Err(invalid("audit trail must hold at least one event"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ApprovalError {
    ApprovalError::InvalidConfiguration {
        message: message.into(),
    }
}
