//! Dashboard statistics
//!
//! Full-corpus aggregation over one consistent store snapshot. Nothing is
//! maintained incrementally; the numbers reflect state as of the read.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    store::EntityStore,
};

use super::{
    auth::{authorize, AdminGate, Identity},
    classifier::{classify, LoanStatus},
};

/// Summary numbers for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    /// Sum of `total_quantity` over all books (copies, not titles)
    pub total_books: u64,
    /// Open borrow records
    pub total_borrowed: u64,
    /// Returned borrow records
    pub total_returned: u64,
    pub total_students: u64,
    /// Distinct students that ever borrowed, returned or not
    pub active_students: u64,
    /// Open records past due at snapshot time
    pub overdue: u64,
}

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn EntityStore>,
    gate: Arc<dyn AdminGate>,
}

impl StatsService {
    pub fn new(store: Arc<dyn EntityStore>, gate: Arc<dyn AdminGate>) -> Self {
        Self { store, gate }
    }

    pub async fn get_stats(&self, identity: &Identity) -> AppResult<DashboardStats> {
        authorize(self.gate.as_ref(), identity)?;

        let snapshot = self.store.snapshot().await?;
        let now = Utc::now();

        let total_books = snapshot
            .books
            .iter()
            .map(|b| b.total_quantity as u64)
            .sum();
        let total_borrowed = snapshot.records.iter().filter(|r| r.is_open()).count() as u64;
        let total_returned = snapshot.records.iter().filter(|r| r.is_returned).count() as u64;
        let overdue = snapshot
            .records
            .iter()
            .filter(|r| matches!(classify(r, now), LoanStatus::Overdue { .. }))
            .count() as u64;

        let borrowers: HashSet<_> = snapshot.records.iter().map(|r| r.student_id).collect();

        Ok(DashboardStats {
            total_books,
            total_borrowed,
            total_returned,
            total_students: snapshot.students.len() as u64,
            active_students: borrowers.len() as u64,
            overdue,
        })
    }
}
