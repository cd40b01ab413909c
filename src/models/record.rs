//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{BookId, RecordId, StudentId};

/// Lending ledger entry.
///
/// Student and book fields are snapshots taken at borrow time, not live
/// references: editing the source student or book later must not change
/// what was printed on the loan slip.
///
/// A record is immutable except for the single transition
/// `is_returned: false -> true`, which sets `return_date` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRecord {
    pub id: RecordId,
    pub student_id: StudentId,
    pub student_name: String,
    pub student_roll_number: String,
    pub book_id: BookId,
    pub book_title: String,
    pub book_author: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub is_returned: bool,
    /// Store revision counter, bumped on every mutation
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowRecord {
    /// An open record is one that has not been returned yet.
    pub fn is_open(&self) -> bool {
        !self.is_returned
    }
}

/// New borrow record as assembled by the ledger. The store assigns the
/// identifier, bookkeeping timestamps and the initial open state.
#[derive(Debug, Clone)]
pub struct NewBorrowRecord {
    pub student_id: StudentId,
    pub student_name: String,
    pub student_roll_number: String,
    pub book_id: BookId,
    pub book_title: String,
    pub book_author: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}
