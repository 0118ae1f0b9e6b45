use std::collections::VecDeque;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate, Score};
use crate::engine::DecisionReason;
use crate::types::{CustomerId, LoanId};

/// all events that can be emitted by the loan service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // customer events
    CustomerRegistered {
        customer_id: CustomerId,
        approved_limit: Money,
        date: NaiveDate,
    },

    // decision events
    EligibilityChecked {
        customer_id: CustomerId,
        credit_score: Score,
        approved: bool,
        reason: DecisionReason,
        date: NaiveDate,
    },
    LoanCreated {
        loan_id: LoanId,
        customer_id: CustomerId,
        amount: Money,
        interest_rate: Rate,
        monthly_installment: Money,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    LoanRejected {
        customer_id: CustomerId,
        amount: Money,
        reason: DecisionReason,
        date: NaiveDate,
    },

    // ingestion events
    CustomersIngested {
        count: usize,
    },
    LoansIngested {
        created: usize,
        skipped: usize,
    },
    LoanRowSkipped {
        row: usize,
        external_customer_id: i64,
    },
}

/// event store for collecting events during operations
///
/// Holds at most `capacity` events; the oldest are dropped first.
#[derive(Debug)]
pub struct EventStore {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity,
        }
    }

    pub fn emit(&mut self, event: Event) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_events_dropped_at_capacity() {
        let mut store = EventStore::new(3);
        for count in 0..5 {
            store.emit(Event::CustomersIngested { count });
        }

        let events = store.take_events();
        assert_eq!(
            events,
            vec![
                Event::CustomersIngested { count: 2 },
                Event::CustomersIngested { count: 3 },
                Event::CustomersIngested { count: 4 },
            ]
        );
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut store = EventStore::new(0);
        store.emit(Event::CustomersIngested { count: 1 });
        assert!(store.take_events().is_empty());
    }
}
