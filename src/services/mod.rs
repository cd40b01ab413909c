//! Business logic services

pub mod auth;
pub mod catalog;
pub mod classifier;
pub mod ledger;
pub mod roster;
pub mod stats;

use std::sync::Arc;

use crate::{config::LendingConfig, store::EntityStore};

use auth::AdminGate;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub roster: roster::RosterService,
    pub ledger: ledger::LedgerService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services against the given store and authorization gate
    pub fn new(
        store: Arc<dyn EntityStore>,
        gate: Arc<dyn AdminGate>,
        lending: &LendingConfig,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone(), gate.clone()),
            roster: roster::RosterService::new(store.clone(), gate.clone()),
            ledger: ledger::LedgerService::new(
                store.clone(),
                gate.clone(),
                lending.default_loan_days,
            ),
            stats: stats::StatsService::new(store, gate),
        }
    }
}
