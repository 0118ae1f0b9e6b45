use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::{EligibilityEngine, EligibilityResult};
use crate::errors::{ApprovalError, Result};
use crate::events::{Event, EventStore};
use crate::ingest::{self, CustomerIdMap, IngestReport};
use crate::serialization::{
    CreateLoanResponse, EligibilityResponse, LoanDetailView, LoanSummaryView, RegisterRequest,
    RegisterResponse,
};
use crate::storage::CreditStore;
use crate::types::{CustomerId, LoanId, LoanRecord, LoanRequest, NewCustomer, NewLoan};

/// one mutex per customer, created on first use
#[derive(Debug, Default)]
struct CustomerLocks {
    locks: Mutex<HashMap<CustomerId, Arc<Mutex<()>>>>,
}

impl CustomerLocks {
    fn lock_for(&self, customer_id: CustomerId) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| poisoned("customer lock table"))?;
        Ok(locks.entry(customer_id).or_default().clone())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }
}

fn poisoned(what: &str) -> ApprovalError {
    ApprovalError::StoreUnavailable {
        message: format!("{what} poisoned"),
    }
}

/// loan service: registration, eligibility, loan creation and views
///
/// Wraps a `CreditStore` and the eligibility engine. Loan creation for a
/// customer is serialized so concurrent requests cannot jointly pass the
/// affordability gate.
pub struct LoanService<S: CreditStore> {
    store: S,
    engine: EligibilityEngine,
    config: EngineConfig,
    customer_locks: CustomerLocks,
    events: Mutex<EventStore>,
}

impl<S: CreditStore> LoanService<S> {
    /// create service with default rules
    pub fn new(store: S) -> Self {
        let config = EngineConfig::default();
        Self {
            store,
            engine: EligibilityEngine::default(),
            events: Mutex::new(EventStore::new(config.audit.max_events)),
            customer_locks: CustomerLocks::default(),
            config,
        }
    }

    /// create service with custom rules
    pub fn with_config(store: S, config: EngineConfig) -> Result<Self> {
        let engine = EligibilityEngine::new(&config)?;
        Ok(Self {
            store,
            engine,
            events: Mutex::new(EventStore::new(config.audit.max_events)),
            customer_locks: CustomerLocks::default(),
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// register a customer, assigning the approved limit from income
    pub fn register(&self, request: RegisterRequest, time: &SafeTimeProvider) -> Result<RegisterResponse> {
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(ApprovalError::invalid_input("first and last name are required"));
        }
        if request.monthly_income.is_negative() {
            return Err(ApprovalError::invalid_input(format!(
                "monthly income must not be negative: {}",
                request.monthly_income
            )));
        }

        let approved_limit = self.config.registration.approved_limit(request.monthly_income)?;
        let customer = self.store.insert_customer(NewCustomer {
            first_name: request.first_name,
            last_name: request.last_name,
            age: request.age,
            phone_number: request.phone_number,
            monthly_salary: request.monthly_income,
            approved_limit,
        })?;

        info!(customer_id = %customer.id, %approved_limit, "customer registered");
        self.emit(Event::CustomerRegistered {
            customer_id: customer.id,
            approved_limit,
            date: today(time),
        })?;

        Ok(RegisterResponse {
            customer_id: customer.id,
            approved_limit: customer.approved_limit,
        })
    }

    /// score the customer and decide on the request without creating a loan
    pub fn check_eligibility(&self, request: &LoanRequest, time: &SafeTimeProvider) -> Result<EligibilityResponse> {
        let result = self.assess(request, today(time))?;
        Ok(EligibilityResponse::from(&result))
    }

    /// check eligibility with system time
    pub fn check_eligibility_now(&self, request: &LoanRequest) -> Result<EligibilityResponse> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.check_eligibility(request, &time)
    }

    /// decide on the request and persist the loan when approved
    pub fn create_loan(&self, request: &LoanRequest, time: &SafeTimeProvider) -> Result<CreateLoanResponse> {
        // unknown ids never reach the lock table
        self.store.find_customer(request.customer_id)?;
        let lock = self.customer_locks.lock_for(request.customer_id)?;
        let _guard = lock.lock().map_err(|_| poisoned("customer lock"))?;

        let start_date = today(time);
        let result = self.assess(request, start_date)?;

        if !result.approved {
            self.emit(Event::LoanRejected {
                customer_id: request.customer_id,
                amount: request.loan_amount,
                reason: result.reason,
                date: start_date,
            })?;
            return Ok(CreateLoanResponse::rejected(request.customer_id));
        }

        let loan = self.store.create_loan(self.new_loan(&result, request, start_date)?)?;

        info!(
            loan_id = %loan.id,
            customer_id = %loan.customer_id,
            amount = %loan.loan_amount,
            rate = %loan.interest_rate,
            "loan created"
        );
        self.emit(Event::LoanCreated {
            loan_id: loan.id,
            customer_id: loan.customer_id,
            amount: loan.loan_amount,
            interest_rate: loan.interest_rate,
            monthly_installment: loan.monthly_repayment,
            start_date: loan.start_date,
            end_date: loan.end_date,
        })?;

        Ok(CreateLoanResponse::approved(&loan))
    }

    /// create loan with system time
    pub fn create_loan_now(&self, request: &LoanRequest) -> Result<CreateLoanResponse> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.create_loan(request, &time)
    }

    /// loan details with its customer
    pub fn view_loan(&self, loan_id: LoanId) -> Result<LoanDetailView> {
        let loan = self.store.find_loan(loan_id)?;
        let customer = self.store.find_customer(loan.customer_id)?;
        Ok(LoanDetailView::new(&loan, &customer))
    }

    /// all loans of a customer
    pub fn view_loans(&self, customer_id: CustomerId) -> Result<Vec<LoanSummaryView>> {
        self.store.find_customer(customer_id)?;
        let loans = self.store.list_loans(customer_id)?;
        Ok(loans.iter().map(LoanSummaryView::from).collect())
    }

    /// ingest a customer sheet; the returned mapping feeds `ingest_loans_csv`
    pub fn ingest_customers_csv<R: Read>(&self, reader: R) -> Result<CustomerIdMap> {
        let mapping = ingest::ingest_customers_csv(&self.store, reader)?;
        self.emit(Event::CustomersIngested {
            count: mapping.len(),
        })?;
        Ok(mapping)
    }

    /// ingest a loan sheet against a mapping from `ingest_customers_csv`
    pub fn ingest_loans_csv<R: Read>(&self, reader: R, mapping: &CustomerIdMap) -> Result<IngestReport> {
        let report = ingest::ingest_loans_csv(&self.store, reader, mapping)?;

        let mut events = self.events.lock().map_err(|_| poisoned("event store"))?;
        for skipped in &report.skipped {
            events.emit(Event::LoanRowSkipped {
                row: skipped.row,
                external_customer_id: skipped.external_customer_id,
            });
        }
        events.emit(Event::LoansIngested {
            created: report.created,
            skipped: report.skipped.len(),
        });

        Ok(report)
    }

    /// drain recorded events
    pub fn take_events(&self) -> Result<Vec<Event>> {
        Ok(self
            .events
            .lock()
            .map_err(|_| poisoned("event store"))?
            .take_events())
    }

    /// load one consistent snapshot of the customer and decide
    fn assess(&self, request: &LoanRequest, as_of: NaiveDate) -> Result<EligibilityResult> {
        let customer = self.store.find_customer(request.customer_id)?;
        let loans: Vec<LoanRecord> = self.store.list_loans(customer.id)?;

        let result = self.engine.evaluate(&customer, &loans, request, as_of)?;
        debug!(
            customer_id = %customer.id,
            score = %result.credit_score,
            approved = result.approved,
            reason = ?result.reason,
            "eligibility evaluated"
        );

        self.emit(Event::EligibilityChecked {
            customer_id: customer.id,
            credit_score: result.credit_score,
            approved: result.approved,
            reason: result.reason,
            date: as_of,
        })?;

        Ok(result)
    }

    fn new_loan(&self, result: &EligibilityResult, request: &LoanRequest, start_date: NaiveDate) -> Result<NewLoan> {
        let days = u64::from(request.tenure_months) * u64::from(self.config.loan_terms.days_per_month);
        let end_date = start_date
            .checked_add_days(Days::new(days))
            .ok_or_else(|| ApprovalError::invalid_input(format!("tenure too long: {} months", request.tenure_months)))?;

        Ok(NewLoan {
            customer_id: request.customer_id,
            loan_amount: request.loan_amount,
            tenure_months: request.tenure_months,
            interest_rate: result.corrected_rate,
            monthly_repayment: result.monthly_installment,
            emis_paid_on_time: 0,
            start_date,
            end_date,
        })
    }

    fn emit(&self, event: Event) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| poisoned("event store"))?
            .emit(event);
        Ok(())
    }
}

fn today(time: &SafeTimeProvider) -> NaiveDate {
    time.now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::storage::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()))
    }

    fn register(service: &LoanService<InMemoryStore>, income: i64, phone: u64) -> RegisterResponse {
        service
            .register(
                RegisterRequest {
                    first_name: "Test".to_string(),
                    last_name: "User".to_string(),
                    age: 21,
                    monthly_income: Money::from_major(income),
                    phone_number: phone,
                },
                &test_time(),
            )
            .unwrap()
    }

    #[test]
    fn test_register_assigns_limit() {
        let service = LoanService::new(InMemoryStore::new());
        let response = register(&service, 50_000, 8093707370);

        assert_eq!(response.approved_limit, Money::from_major(1_800_000));
        let customer = service.store().find_customer(response.customer_id).unwrap();
        assert_eq!(customer.monthly_salary, Money::from_major(50_000));
    }

    #[test]
    fn test_register_validation() {
        let service = LoanService::new(InMemoryStore::new());
        let time = test_time();

        let blank = service.register(
            RegisterRequest {
                first_name: " ".to_string(),
                last_name: "User".to_string(),
                age: 21,
                monthly_income: Money::from_major(10_000),
                phone_number: 1,
            },
            &time,
        );
        assert!(matches!(blank, Err(ApprovalError::InvalidInput { .. })));

        let negative = service.register(
            RegisterRequest {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                age: 21,
                monthly_income: Money::from_major(-1),
                phone_number: 1,
            },
            &time,
        );
        assert!(matches!(negative, Err(ApprovalError::InvalidInput { .. })));
    }

    #[test]
    fn test_new_customer_is_rejected_and_nothing_persisted() {
        let service = LoanService::new(InMemoryStore::new());
        let customer = register(&service, 50_000, 8093707370);
        let request = LoanRequest::new(customer.customer_id, Money::from_major(100_000), Rate::from_percentage(12), 12);

        let eligibility = service.check_eligibility(&request, &test_time()).unwrap();
        assert!(!eligibility.approval);
        assert_eq!(eligibility.monthly_installment, Money::from_major(1_000));
        assert_eq!(eligibility.corrected_interest_rate, None);

        let created = service.create_loan(&request, &test_time()).unwrap();
        assert!(!created.loan_approved);
        assert_eq!(created.loan_id, None);
        assert_eq!(created.monthly_installment, Money::ZERO);
        assert_eq!(service.store().loan_count().unwrap(), 0);
    }

    #[test]
    fn test_unknown_customer_is_not_found() {
        let service = LoanService::new(InMemoryStore::new());
        let request = LoanRequest::new(uuid::Uuid::new_v4(), Money::from_major(1_000), Rate::from_percentage(12), 12);

        let err = service.check_eligibility(&request, &test_time()).unwrap_err();
        assert!(err.is_not_found());
        assert!(service.view_loans(request.customer_id).unwrap_err().is_not_found());
        assert!(service.view_loan(uuid::Uuid::new_v4()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_customers_do_not_grow_lock_table() {
        let service = LoanService::new(InMemoryStore::new());
        let time = test_time();

        for _ in 0..200 {
            let request = LoanRequest::new(uuid::Uuid::new_v4(), Money::from_major(1_000), Rate::from_percentage(12), 12);
            assert!(service.create_loan(&request, &time).unwrap_err().is_not_found());
        }
        assert_eq!(service.customer_locks.len(), 0);

        let customer = register(&service, 50_000, 8093707370);
        let request = LoanRequest::new(customer.customer_id, Money::from_major(100_000), Rate::from_percentage(12), 12);
        service.create_loan(&request, &time).unwrap();
        service.create_loan(&request, &time).unwrap();
        assert_eq!(service.customer_locks.len(), 1);
    }

    #[test]
    fn test_oversized_amount_is_rejected_without_panic() {
        let service = LoanService::new(InMemoryStore::new());
        let customer = register(&service, 50_000, 8093707370);

        let body = format!(
            r#"{{"customer_id": "{}", "loan_amount": "79228162514264337593543950335", "interest_rate": 200, "tenure": 12}}"#,
            customer.customer_id
        );
        let request: LoanRequest = serde_json::from_str(&body).unwrap();

        let checked = service.check_eligibility(&request, &test_time());
        assert!(matches!(checked, Err(ApprovalError::InvalidInput { .. })));
        let created = service.create_loan(&request, &test_time());
        assert!(matches!(created, Err(ApprovalError::InvalidInput { .. })));
        assert_eq!(service.store().loan_count().unwrap(), 0);

        let income = service.register(
            RegisterRequest {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                age: 21,
                monthly_income: Money::from_decimal(crate::Decimal::MAX),
                phone_number: 1,
            },
            &test_time(),
        );
        assert!(matches!(income, Err(ApprovalError::InvalidInput { .. })));
    }

    #[test]
    fn test_event_trail_is_bounded() {
        let mut config = EngineConfig::default();
        config.audit.max_events = 2;
        let service = LoanService::with_config(InMemoryStore::new(), config).unwrap();

        for phone in 1..=3 {
            register(&service, 50_000, phone);
        }

        let events = service.take_events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| matches!(e, Event::CustomerRegistered { .. })));
    }

    #[test]
    fn test_events_are_recorded() {
        let service = LoanService::new(InMemoryStore::new());
        let customer = register(&service, 50_000, 8093707370);
        let request = LoanRequest::new(customer.customer_id, Money::from_major(100_000), Rate::from_percentage(12), 12);
        service.create_loan(&request, &test_time()).unwrap();

        let events = service.take_events().unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::CustomerRegistered { .. }));
        assert!(matches!(events[1], Event::EligibilityChecked { approved: false, .. }));
        assert!(matches!(events[2], Event::LoanRejected { .. }));
        assert!(service.take_events().unwrap().is_empty());
    }
}
