//! Inventory ledger
//!
//! The only writer allowed to change a book's `available_quantity` or to
//! create and transition borrow records. Both mutations go through a single
//! store commit, so the relationship invariant
//! `total_quantity - available_quantity == open records for the book`
//! holds after every completed call.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        record::{BorrowRecord, NewBorrowRecord},
        BookId, RecordId, StudentId,
    },
    store::{EntityStore, WriteBatch},
};

use super::{
    auth::{authorize, AdminGate, Identity},
    classifier::{classify, LoanStatus},
};

/// Borrow request. Dates are optional: `borrow_date` defaults to now and
/// `due_date` to the configured loan period after the borrow date.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub student_id: StudentId,
    pub book_id: BookId,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Record together with its loan status at read time
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanView {
    #[serde(flatten)]
    pub record: BorrowRecord,
    #[serde(flatten)]
    pub status: LoanStatus,
}

/// Record listing filter, mirroring the returns screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Returned,
    Overdue,
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn EntityStore>,
    gate: Arc<dyn AdminGate>,
    default_loan_days: i64,
}

impl LedgerService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        gate: Arc<dyn AdminGate>,
        default_loan_days: i64,
    ) -> Self {
        Self {
            store,
            gate,
            default_loan_days,
        }
    }

    /// Borrow a book for a student.
    ///
    /// The record is created with snapshot fields copied from the current
    /// student and book state, and the availability decrement commits in
    /// the same batch. A zero availability observed here is a policy
    /// failure (`Validation`); losing the last copy to a concurrent commit
    /// surfaces as `Conflict` and is left to the caller to retry.
    pub async fn borrow(&self, identity: &Identity, request: BorrowRequest) -> AppResult<BorrowRecord> {
        authorize(self.gate.as_ref(), identity)?;

        let borrow_date = request.borrow_date.unwrap_or_else(Utc::now);
        let due_date = request
            .due_date
            .unwrap_or(borrow_date + Duration::days(self.default_loan_days));
        if due_date <= borrow_date {
            return Err(AppError::Validation(
                "due_date must be strictly after borrow_date".to_string(),
            ));
        }

        let student = self
            .store
            .get_student(request.student_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Student {} not found", request.student_id))
            })?;
        let book = self
            .store
            .get_book(request.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", request.book_id)))?;

        if book.available_quantity == 0 {
            return Err(AppError::Validation(format!(
                "No copies of \"{}\" are currently available",
                book.title
            )));
        }

        let record = NewBorrowRecord {
            student_id: student.id,
            student_name: student.name.clone(),
            student_roll_number: student.roll_number.clone(),
            book_id: book.id,
            book_title: book.title.clone(),
            book_author: book.author.clone(),
            borrow_date,
            due_date,
        };

        let batch = WriteBatch::new()
            .insert_record(record)
            .adjust_availability(book.id, -1);
        let receipt = match self.store.commit(batch).await {
            Err(AppError::Conflict(msg)) => {
                tracing::warn!(book_id = %book.id, "borrow lost the last copy to a concurrent commit");
                return Err(AppError::Conflict(msg));
            }
            other => other?,
        };

        let record = receipt.inserted_record.ok_or_else(|| {
            AppError::Internal("borrow commit returned no record".to_string())
        })?;
        tracing::info!(
            record_id = %record.id,
            book_id = %book.id,
            student_id = %student.id,
            "book borrowed"
        );
        Ok(record)
    }

    /// Return a borrowed book.
    ///
    /// Not idempotent by design: a second return of the same record fails
    /// with `AlreadyReturned` and changes nothing, rather than silently
    /// double-incrementing availability.
    pub async fn return_book(&self, identity: &Identity, record_id: RecordId) -> AppResult<BorrowRecord> {
        authorize(self.gate.as_ref(), identity)?;

        let record = self
            .store
            .get_record(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record {} not found", record_id)))?;
        if record.is_returned {
            return Err(AppError::AlreadyReturned(format!(
                "Borrow record {} was already returned",
                record_id
            )));
        }

        // A book deleted while its loan was open cannot be reconciled here;
        // the record stays open and the caller gets NotFound.
        let book = self
            .store
            .get_book(record.book_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Book {} referenced by record {} no longer exists",
                    record.book_id, record_id
                ))
            })?;

        let batch = WriteBatch::new()
            .mark_returned(record_id, Utc::now())
            .adjust_availability(book.id, 1);
        self.store.commit(batch).await?;

        let record = self
            .store
            .get_record(record_id)
            .await?
            .ok_or_else(|| AppError::Internal("returned record vanished".to_string()))?;
        tracing::info!(record_id = %record.id, book_id = %book.id, "book returned");
        Ok(record)
    }

    /// List borrow records (newest first) with their loan status,
    /// optionally narrowed to open, returned or overdue loans.
    pub async fn list_records(
        &self,
        identity: &Identity,
        filter: StatusFilter,
    ) -> AppResult<Vec<LoanView>> {
        authorize(self.gate.as_ref(), identity)?;

        let now = Utc::now();
        let views = self
            .store
            .list_records()
            .await?
            .into_iter()
            .map(|record| {
                let status = classify(&record, now);
                LoanView { record, status }
            })
            .filter(|view| match filter {
                StatusFilter::All => true,
                StatusFilter::Open => view.record.is_open(),
                StatusFilter::Returned => view.record.is_returned,
                StatusFilter::Overdue => matches!(view.status, LoanStatus::Overdue { .. }),
            })
            .collect();
        Ok(views)
    }

    /// Borrow history of one student, newest first
    pub async fn student_history(
        &self,
        identity: &Identity,
        student_id: StudentId,
    ) -> AppResult<Vec<LoanView>> {
        authorize(self.gate.as_ref(), identity)?;

        self.store
            .get_student(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", student_id)))?;

        let now = Utc::now();
        let views = self
            .store
            .records_by_student(student_id)
            .await?
            .into_iter()
            .map(|record| {
                let status = classify(&record, now);
                LoanView { record, status }
            })
            .collect();
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{book::Book, student::Student},
        store::MockEntityStore,
    };

    struct AllowAll;

    impl AdminGate for AllowAll {
        fn is_authorized_admin(&self, _identity: &Identity) -> bool {
            true
        }
    }

    struct DenyAll;

    impl AdminGate for DenyAll {
        fn is_authorized_admin(&self, _identity: &Identity) -> bool {
            false
        }
    }

    fn admin() -> Identity {
        Identity::new("admin-token")
    }

    fn ledger(store: MockEntityStore) -> LedgerService {
        LedgerService::new(Arc::new(store), Arc::new(AllowAll), 14)
    }

    fn student() -> Student {
        let now = Utc::now();
        Student {
            id: StudentId::new(),
            name: "Ada Lovelace".to_string(),
            roll_number: "CS-101".to_string(),
            email: "ada@example.edu".to_string(),
            course: "Mathematics".to_string(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn book(available: u32) -> Book {
        let now = Utc::now();
        Book {
            id: BookId::new(),
            title: "The Dispossessed".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            isbn: "978-0-06-051275-5".to_string(),
            category: "Fiction".to_string(),
            total_quantity: 5,
            available_quantity: available,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn borrow_rejects_non_increasing_date_range_before_touching_the_store() {
        let ledger = ledger(MockEntityStore::new());
        let now = Utc::now();
        let err = ledger
            .borrow(
                &admin(),
                BorrowRequest {
                    student_id: StudentId::new(),
                    book_id: BookId::new(),
                    borrow_date: Some(now),
                    due_date: Some(now),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn borrow_fails_not_found_for_missing_student() {
        let mut store = MockEntityStore::new();
        store.expect_get_student().returning(|_| Ok(None));
        let err = ledger(store)
            .borrow(
                &admin(),
                BorrowRequest {
                    student_id: StudentId::new(),
                    book_id: BookId::new(),
                    borrow_date: None,
                    due_date: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn borrow_at_zero_availability_is_a_policy_failure() {
        let the_student = student();
        let the_book = book(0);
        let student_id = the_student.id;
        let book_id = the_book.id;

        let mut store = MockEntityStore::new();
        store
            .expect_get_student()
            .returning(move |_| Ok(Some(the_student.clone())));
        store
            .expect_get_book()
            .returning(move |_| Ok(Some(the_book.clone())));

        let err = ledger(store)
            .borrow(
                &admin(),
                BorrowRequest {
                    student_id,
                    book_id,
                    borrow_date: None,
                    due_date: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn return_of_returned_record_never_reaches_commit() {
        let now = Utc::now();
        let the_book = book(3);
        let record = BorrowRecord {
            id: RecordId::new(),
            student_id: StudentId::new(),
            student_name: "Ada Lovelace".to_string(),
            student_roll_number: "CS-101".to_string(),
            book_id: the_book.id,
            book_title: the_book.title.clone(),
            book_author: the_book.author.clone(),
            borrow_date: now - Duration::days(20),
            due_date: now - Duration::days(6),
            return_date: Some(now - Duration::days(1)),
            is_returned: true,
            version: 2,
            created_at: now,
            updated_at: now,
        };
        let record_id = record.id;

        let mut store = MockEntityStore::new();
        store
            .expect_get_record()
            .returning(move |_| Ok(Some(record.clone())));
        // No expect_commit: reaching commit would panic the mock.

        let err = ledger(store)
            .return_book(&admin(), record_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReturned(_)));
    }

    #[tokio::test]
    async fn unauthorized_identity_is_rejected_at_the_gate() {
        let service = LedgerService::new(
            Arc::new(MockEntityStore::new()),
            Arc::new(DenyAll),
            14,
        );
        let err = service
            .return_book(&Identity::new("patron"), RecordId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
