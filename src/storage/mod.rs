pub mod memory;

use crate::errors::Result;
use crate::types::{Customer, CustomerId, LoanId, LoanRecord, NewCustomer, NewLoan};

pub use memory::InMemoryStore;

/// persistence collaborator for customers and loans
///
/// Implementations assign identifiers. Lookups of unknown ids fail with
/// `CustomerNotFound` / `LoanNotFound`.
pub trait CreditStore: Send + Sync {
    /// insert a customer; phone numbers are unique
    fn insert_customer(&self, customer: NewCustomer) -> Result<Customer>;

    fn find_customer(&self, id: CustomerId) -> Result<Customer>;

    /// all loans of a customer in creation order
    fn list_loans(&self, customer_id: CustomerId) -> Result<Vec<LoanRecord>>;

    fn find_loan(&self, id: LoanId) -> Result<LoanRecord>;

    /// persist a loan as one atomic write; the customer must exist
    fn create_loan(&self, loan: NewLoan) -> Result<LoanRecord>;
}
