pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod serialization;
pub mod service;
pub mod storage;
pub mod types;

// re-export key types
pub use config::{ApprovalTier, ApprovalTiers, AuditConfig, EngineConfig, RateFloor, ScoringWeights};
pub use decimal::{Money, Rate, Score};
pub use engine::{
    monthly_installment, CreditAssessment, CreditScorer, DecisionReason, EligibilityEngine,
    EligibilityResult,
};
pub use errors::{ApprovalError, Result};
pub use events::{Event, EventStore};
pub use ingest::{CustomerIdMap, IngestReport};
pub use service::LoanService;
pub use storage::{CreditStore, InMemoryStore};
pub use types::{Customer, CustomerId, LoanId, LoanRecord, LoanRequest, NewCustomer, NewLoan};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
