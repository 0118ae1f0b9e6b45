pub mod rows;

use std::collections::HashMap;
use std::io::Read;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::storage::CreditStore;
use crate::types::{CustomerId, NewCustomer, NewLoan};

pub use rows::{read_customer_rows, read_loan_rows, CustomerRow, LoanRow};

/// external (spreadsheet) customer id to stored customer id
///
/// Returned by customer ingestion and handed to loan ingestion by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerIdMap {
    ids: HashMap<i64, CustomerId>,
}

impl CustomerIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, external_id: i64, customer_id: CustomerId) -> Option<CustomerId> {
        self.ids.insert(external_id, customer_id)
    }

    pub fn get(&self, external_id: i64) -> Option<CustomerId> {
        self.ids.get(&external_id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// loan row left out because its customer was never ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub external_customer_id: i64,
}

/// outcome of a loan ingestion batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub created: usize,
    pub skipped: Vec<SkippedRow>,
}

/// store every customer row, returning the id mapping
///
/// Store failures (e.g. a duplicate phone number) abort the batch.
pub fn ingest_customers<S, I>(store: &S, rows: I) -> Result<CustomerIdMap>
where
    S: CreditStore + ?Sized,
    I: IntoIterator<Item = CustomerRow>,
{
    let mut mapping = CustomerIdMap::new();

    for row in rows {
        let external_id = row.external_id;
        let customer = store.insert_customer(NewCustomer {
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            phone_number: row.phone_number,
            monthly_salary: row.monthly_salary,
            approved_limit: row.approved_limit,
        })?;

        if let Some(previous) = mapping.insert(external_id, customer.id) {
            warn!(external_id, %previous, "duplicate external customer id, keeping latest");
        }
        debug!(external_id, customer_id = %customer.id, "customer ingested");
    }

    info!(count = mapping.len(), "customer ingestion complete");
    Ok(mapping)
}

/// store every loan row whose customer is in the mapping
///
/// Rows with an unmapped customer id are skipped and reported; the batch
/// carries on.
pub fn ingest_loans<S, I>(store: &S, rows: I, mapping: &CustomerIdMap) -> Result<IngestReport>
where
    S: CreditStore + ?Sized,
    I: IntoIterator<Item = LoanRow>,
{
    let mut report = IngestReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        let Some(customer_id) = mapping.get(row.external_customer_id) else {
            warn!(
                row = index + 1,
                external_customer_id = row.external_customer_id,
                external_loan_id = ?row.external_loan_id,
                "skipping loan: no matching customer"
            );
            report.skipped.push(SkippedRow {
                row: index + 1,
                external_customer_id: row.external_customer_id,
            });
            continue;
        };

        let loan = store.create_loan(NewLoan {
            customer_id,
            loan_amount: row.loan_amount,
            tenure_months: row.tenure_months,
            interest_rate: row.interest_rate,
            monthly_repayment: row.monthly_repayment,
            emis_paid_on_time: row.emis_paid_on_time,
            start_date: row.start_date,
            end_date: row.end_date,
        })?;
        debug!(external_loan_id = ?row.external_loan_id, loan_id = %loan.id, "loan ingested");
        report.created += 1;
    }

    info!(
        created = report.created,
        skipped = report.skipped.len(),
        "loan ingestion complete"
    );
    Ok(report)
}

/// parse a customer csv and ingest it
pub fn ingest_customers_csv<S, R>(store: &S, reader: R) -> Result<CustomerIdMap>
where
    S: CreditStore + ?Sized,
    R: Read,
{
    ingest_customers(store, read_customer_rows(reader)?)
}

/// parse a loan csv and ingest it against an existing mapping
pub fn ingest_loans_csv<S, R>(store: &S, reader: R, mapping: &CustomerIdMap) -> Result<IngestReport>
where
    S: CreditStore + ?Sized,
    R: Read,
{
    ingest_loans(store, read_loan_rows(reader)?, mapping)
}
