//! Business logic services

pub mod ledger;

use std::sync::Arc;

use crate::{config::LendingConfig, models::BorrowPolicy, repository::LibraryStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub ledger: ledger::LedgerService,
}

impl Services {
    /// Create all services on top of the given store
    pub fn new(store: Arc<dyn LibraryStore>, lending: &LendingConfig) -> Self {
        Self {
            ledger: ledger::LedgerService::new(store, BorrowPolicy::new(lending.max_open_borrows)),
        }
    }
}
