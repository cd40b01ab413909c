//! Entity store contract and backends
//!
//! The ledger and reporter are written against the [`EntityStore`] trait
//! only. The store owns identifiers, bookkeeping timestamps and revision
//! counters, and provides the multi-document atomic commit the ledger
//! relies on: a [`WriteBatch`] is applied as a single indivisible unit,
//! so no reader ever observes a borrow record without its matching
//! availability delta.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook, UpdateBook},
        record::{BorrowRecord, NewBorrowRecord},
        student::{CreateStudent, Student, UpdateStudent},
        BookId, RecordId, StudentId,
    },
};

/// One mutation inside an atomic write batch
#[derive(Debug)]
pub enum WriteOp {
    /// Insert a new open borrow record
    InsertRecord(NewBorrowRecord),
    /// Transition a record to returned, setting its return date.
    /// Fails with `AlreadyReturned` when the record is already closed.
    MarkReturned {
        record_id: RecordId,
        returned_at: DateTime<Utc>,
    },
    /// Apply a signed delta to a book's available quantity. Fails with
    /// `Conflict` when the result would drop below zero and with
    /// `Internal` when it would exceed the book's total quantity.
    AdjustAvailability { book_id: BookId, delta: i64 },
}

/// Multi-document write batch. All operations commit together or none do;
/// a failed commit leaves every targeted document in its pre-call state.
#[derive(Debug, Default)]
pub struct WriteBatch {
    pub(crate) ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_record(mut self, record: NewBorrowRecord) -> Self {
        self.ops.push(WriteOp::InsertRecord(record));
        self
    }

    pub fn mark_returned(mut self, record_id: RecordId, returned_at: DateTime<Utc>) -> Self {
        self.ops.push(WriteOp::MarkReturned {
            record_id,
            returned_at,
        });
        self
    }

    pub fn adjust_availability(mut self, book_id: BookId, delta: i64) -> Self {
        self.ops.push(WriteOp::AdjustAvailability { book_id, delta });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Outcome of a committed batch
#[derive(Debug, Default)]
pub struct CommitReceipt {
    /// The record created by an `InsertRecord` op, if the batch had one
    pub inserted_record: Option<BorrowRecord>,
}

/// Consistent read of all three collections, taken at a single point
/// between committed batches
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    pub books: Vec<Book>,
    pub students: Vec<Student>,
    pub records: Vec<BorrowRecord>,
}

/// Document-oriented persistence contract for the three collections.
///
/// Identifiers and `created_at`/`updated_at` are assigned by the store,
/// never by the caller. Partial updates fail `NotFound` when the target
/// document is absent.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    // Books
    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn get_book(&self, id: BookId) -> AppResult<Option<Book>>;
    /// Inserts a book with `available_quantity` synced to `total_quantity`
    async fn insert_book(&self, book: CreateBook) -> AppResult<Book>;
    async fn update_book(&self, id: BookId, patch: UpdateBook) -> AppResult<Book>;
    async fn delete_book(&self, id: BookId) -> AppResult<()>;
    /// Books whose category equals `category` exactly
    async fn find_books_by_category(&self, category: &str) -> AppResult<Vec<Book>>;

    // Students
    async fn list_students(&self) -> AppResult<Vec<Student>>;
    async fn get_student(&self, id: StudentId) -> AppResult<Option<Student>>;
    async fn insert_student(&self, student: CreateStudent) -> AppResult<Student>;
    async fn update_student(&self, id: StudentId, patch: UpdateStudent) -> AppResult<Student>;
    async fn delete_student(&self, id: StudentId) -> AppResult<()>;

    // Borrow records
    /// All records, newest borrow first
    async fn list_records(&self) -> AppResult<Vec<BorrowRecord>>;
    async fn get_record(&self, id: RecordId) -> AppResult<Option<BorrowRecord>>;
    /// Records for one student, newest borrow first
    async fn records_by_student(&self, student_id: StudentId) -> AppResult<Vec<BorrowRecord>>;
    /// Open (unreturned) records referencing one book
    async fn open_records_by_book(&self, book_id: BookId) -> AppResult<Vec<BorrowRecord>>;

    // Transactions and snapshots
    /// Commit a write batch atomically. Batches are serialized against
    /// each other, so availability guards observe the latest committed
    /// state.
    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitReceipt>;
    /// Consistent three-collection snapshot for full-corpus reads
    async fn snapshot(&self) -> AppResult<CorpusSnapshot>;
}
