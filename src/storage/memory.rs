use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::errors::{ApprovalError, Result};
use crate::storage::CreditStore;
use crate::types::{Customer, CustomerId, LoanId, LoanRecord, NewCustomer, NewLoan};

#[derive(Debug, Default)]
struct Tables {
    customers: HashMap<CustomerId, Customer>,
    phone_index: HashMap<u64, CustomerId>,
    loans: HashMap<LoanId, LoanRecord>,
    loans_by_customer: HashMap<CustomerId, Vec<LoanId>>,
}

/// in-memory store behind a single read-write lock
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| ApprovalError::StoreUnavailable {
            message: "store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| ApprovalError::StoreUnavailable {
            message: "store lock poisoned".to_string(),
        })
    }

    pub fn customer_count(&self) -> Result<usize> {
        Ok(self.read()?.customers.len())
    }

    pub fn loan_count(&self) -> Result<usize> {
        Ok(self.read()?.loans.len())
    }
}

impl CreditStore for InMemoryStore {
    fn insert_customer(&self, customer: NewCustomer) -> Result<Customer> {
        let mut tables = self.write()?;
        if tables.phone_index.contains_key(&customer.phone_number) {
            return Err(ApprovalError::DuplicateCustomer {
                phone_number: customer.phone_number,
            });
        }

        let customer = Customer {
            id: Uuid::new_v4(),
            first_name: customer.first_name,
            last_name: customer.last_name,
            age: customer.age,
            phone_number: customer.phone_number,
            monthly_salary: customer.monthly_salary,
            approved_limit: customer.approved_limit,
        };
        tables.phone_index.insert(customer.phone_number, customer.id);
        tables.customers.insert(customer.id, customer.clone());

        Ok(customer)
    }

    fn find_customer(&self, id: CustomerId) -> Result<Customer> {
        self.read()?
            .customers
            .get(&id)
            .cloned()
            .ok_or(ApprovalError::CustomerNotFound { id })
    }

    fn list_loans(&self, customer_id: CustomerId) -> Result<Vec<LoanRecord>> {
        let tables = self.read()?;
        let loans: Vec<LoanRecord> = tables
            .loans_by_customer
            .get(&customer_id)
            .map(|ids| ids.iter().filter_map(|id| tables.loans.get(id).cloned()).collect())
            .unwrap_or_default();
        Ok(loans)
    }

    fn find_loan(&self, id: LoanId) -> Result<LoanRecord> {
        self.read()?
            .loans
            .get(&id)
            .cloned()
            .ok_or(ApprovalError::LoanNotFound { id })
    }

    fn create_loan(&self, loan: NewLoan) -> Result<LoanRecord> {
        let mut tables = self.write()?;
        if !tables.customers.contains_key(&loan.customer_id) {
            return Err(ApprovalError::CustomerNotFound {
                id: loan.customer_id,
            });
        }

        let record = LoanRecord {
            id: Uuid::new_v4(),
            customer_id: loan.customer_id,
            loan_amount: loan.loan_amount,
            tenure_months: loan.tenure_months,
            interest_rate: loan.interest_rate,
            monthly_repayment: loan.monthly_repayment,
            emis_paid_on_time: loan.emis_paid_on_time,
            start_date: loan.start_date,
            end_date: loan.end_date,
        };
        tables
            .loans_by_customer
            .entry(record.customer_id)
            .or_default()
            .push(record.id);
        tables.loans.insert(record.id, record.clone());

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use chrono::NaiveDate;

    fn new_customer(phone: u64) -> NewCustomer {
        NewCustomer {
            first_name: "Ana".to_string(),
            last_name: "Mesa".to_string(),
            age: 25,
            phone_number: phone,
            monthly_salary: Money::from_major(40_000),
            approved_limit: Money::from_major(1_400_000),
        }
    }

    fn new_loan(customer_id: CustomerId, amount: i64) -> NewLoan {
        NewLoan {
            customer_id,
            loan_amount: Money::from_major(amount),
            tenure_months: 12,
            interest_rate: Rate::from_percentage(12),
            monthly_repayment: Money::from_major(5_000),
            emis_paid_on_time: 0,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_customer_roundtrip() {
        let store = InMemoryStore::new();
        let customer = store.insert_customer(new_customer(9953004088)).unwrap();

        assert_eq!(store.find_customer(customer.id).unwrap(), customer);
        assert_eq!(store.customer_count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let store = InMemoryStore::new();
        store.insert_customer(new_customer(9953004088)).unwrap();

        let duplicate = store.insert_customer(new_customer(9953004088));
        assert!(matches!(
            duplicate,
            Err(ApprovalError::DuplicateCustomer { phone_number: 9953004088 })
        ));
    }

    #[test]
    fn test_unknown_ids_not_found() {
        let store = InMemoryStore::new();

        let customer = store.find_customer(Uuid::new_v4());
        assert!(customer.unwrap_err().is_not_found());

        let loan = store.find_loan(Uuid::new_v4());
        assert!(matches!(loan, Err(ApprovalError::LoanNotFound { .. })));

        let orphan = store.create_loan(new_loan(Uuid::new_v4(), 50_000));
        assert!(matches!(orphan, Err(ApprovalError::CustomerNotFound { .. })));
        assert_eq!(store.loan_count().unwrap(), 0);
    }

    #[test]
    fn test_loans_listed_per_customer_in_order() {
        let store = InMemoryStore::new();
        let first = store.insert_customer(new_customer(1)).unwrap();
        let second = store.insert_customer(new_customer(2)).unwrap();

        let a = store.create_loan(new_loan(first.id, 10_000)).unwrap();
        store.create_loan(new_loan(second.id, 20_000)).unwrap();
        let b = store.create_loan(new_loan(first.id, 30_000)).unwrap();

        let loans = store.list_loans(first.id).unwrap();
        assert_eq!(loans, vec![a.clone(), b]);
        assert_eq!(store.find_loan(a.id).unwrap(), a);

        assert!(store.list_loans(Uuid::new_v4()).unwrap().is_empty());
    }
}
