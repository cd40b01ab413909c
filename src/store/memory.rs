//! In-memory entity store
//!
//! Reference backend holding each collection in a `tokio::sync::RwLock`ed
//! map. Multi-lock paths (`commit`, `snapshot`) always acquire locks in the
//! fixed order books, students, records. `commit` stages every operation
//! against a scratch copy first and only writes back once the whole batch
//! has passed its guards, which makes batches all-or-nothing and serialized.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        record::BorrowRecord,
        student::{CreateStudent, Student, UpdateStudent},
        BookId, RecordId, StudentId,
    },
};

use super::{CommitReceipt, CorpusSnapshot, EntityStore, WriteBatch, WriteOp};

#[derive(Default)]
pub struct MemoryStore {
    books: RwLock<HashMap<BookId, Book>>,
    students: RwLock<HashMap<StudentId, Student>>,
    records: RwLock<HashMap<RecordId, BorrowRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        let mut all: Vec<Book> = books.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(all)
    }

    async fn get_book(&self, id: BookId) -> AppResult<Option<Book>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn insert_book(&self, book: CreateBook) -> AppResult<Book> {
        let now = Utc::now();
        let book = Book {
            id: BookId::new(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            category: book.category,
            // availability is synced to stock exactly once, at creation
            available_quantity: book.total_quantity,
            total_quantity: book.total_quantity,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.books.write().await.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: BookId, patch: UpdateBook) -> AppResult<Book> {
        let mut books = self.books.write().await;
        let book = books
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(author) = patch.author {
            book.author = author;
        }
        if let Some(isbn) = patch.isbn {
            book.isbn = isbn;
        }
        if let Some(category) = patch.category {
            book.category = category;
        }
        if let Some(total) = patch.total_quantity {
            // No reconciliation against outstanding loans here; the gap is
            // deliberate and documented at the service layer.
            book.total_quantity = total;
        }
        book.version += 1;
        book.updated_at = Utc::now();
        Ok(book.clone())
    }

    async fn delete_book(&self, id: BookId) -> AppResult<()> {
        self.books
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn find_books_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        let books = self.books.read().await;
        let mut matching: Vec<Book> = books
            .values()
            .filter(|b| b.category == category)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(matching)
    }

    async fn list_students(&self) -> AppResult<Vec<Student>> {
        let students = self.students.read().await;
        let mut all: Vec<Student> = students.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn get_student(&self, id: StudentId) -> AppResult<Option<Student>> {
        Ok(self.students.read().await.get(&id).cloned())
    }

    async fn insert_student(&self, student: CreateStudent) -> AppResult<Student> {
        let now = Utc::now();
        let student = Student {
            id: StudentId::new(),
            name: student.name,
            roll_number: student.roll_number,
            email: student.email,
            course: student.course,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        self.students
            .write()
            .await
            .insert(student.id, student.clone());
        Ok(student)
    }

    async fn update_student(&self, id: StudentId, patch: UpdateStudent) -> AppResult<Student> {
        let mut students = self.students.write().await;
        let student = students
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))?;
        if let Some(name) = patch.name {
            student.name = name;
        }
        if let Some(roll_number) = patch.roll_number {
            student.roll_number = roll_number;
        }
        if let Some(email) = patch.email {
            student.email = email;
        }
        if let Some(course) = patch.course {
            student.course = course;
        }
        student.version += 1;
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn delete_student(&self, id: StudentId) -> AppResult<()> {
        self.students
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
    }

    async fn list_records(&self) -> AppResult<Vec<BorrowRecord>> {
        let records = self.records.read().await;
        let mut all: Vec<BorrowRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        Ok(all)
    }

    async fn get_record(&self, id: RecordId) -> AppResult<Option<BorrowRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn records_by_student(&self, student_id: StudentId) -> AppResult<Vec<BorrowRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<BorrowRecord> = records
            .values()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        Ok(matching)
    }

    async fn open_records_by_book(&self, book_id: BookId) -> AppResult<Vec<BorrowRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<BorrowRecord> = records
            .values()
            .filter(|r| r.book_id == book_id && r.is_open())
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        Ok(matching)
    }

    async fn commit(&self, batch: WriteBatch) -> AppResult<CommitReceipt> {
        // Fixed lock order: books before records. Holding both write guards
        // for the whole commit serializes batches against each other.
        let mut books = self.books.write().await;
        let mut records = self.records.write().await;

        let now = Utc::now();
        let mut staged_books: HashMap<BookId, Book> = HashMap::new();
        let mut staged_records: HashMap<RecordId, BorrowRecord> = HashMap::new();
        let mut receipt = CommitReceipt::default();

        for op in batch.ops {
            match op {
                WriteOp::InsertRecord(new) => {
                    let record = BorrowRecord {
                        id: RecordId::new(),
                        student_id: new.student_id,
                        student_name: new.student_name,
                        student_roll_number: new.student_roll_number,
                        book_id: new.book_id,
                        book_title: new.book_title,
                        book_author: new.book_author,
                        borrow_date: new.borrow_date,
                        due_date: new.due_date,
                        return_date: None,
                        is_returned: false,
                        version: 1,
                        created_at: now,
                        updated_at: now,
                    };
                    staged_records.insert(record.id, record.clone());
                    receipt.inserted_record = Some(record);
                }
                WriteOp::MarkReturned {
                    record_id,
                    returned_at,
                } => {
                    let mut record = staged_records
                        .get(&record_id)
                        .or_else(|| records.get(&record_id))
                        .cloned()
                        .ok_or_else(|| {
                            AppError::NotFound(format!("Borrow record {} not found", record_id))
                        })?;
                    if record.is_returned {
                        return Err(AppError::AlreadyReturned(format!(
                            "Borrow record {} was already returned",
                            record_id
                        )));
                    }
                    record.is_returned = true;
                    record.return_date = Some(returned_at);
                    record.version += 1;
                    record.updated_at = now;
                    staged_records.insert(record_id, record);
                }
                WriteOp::AdjustAvailability { book_id, delta } => {
                    let mut book = staged_books
                        .get(&book_id)
                        .or_else(|| books.get(&book_id))
                        .cloned()
                        .ok_or_else(|| {
                            AppError::NotFound(format!("Book {} not found", book_id))
                        })?;
                    let next = book.available_quantity as i64 + delta;
                    if next < 0 {
                        return Err(AppError::Conflict(format!(
                            "No available copies left of book {}",
                            book_id
                        )));
                    }
                    if next > book.total_quantity as i64 {
                        return Err(AppError::Internal(format!(
                            "Availability of book {} would exceed total stock ({} > {})",
                            book_id, next, book.total_quantity
                        )));
                    }
                    book.available_quantity = next as u32;
                    book.version += 1;
                    book.updated_at = now;
                    staged_books.insert(book_id, book);
                }
            }
        }

        // Every guard passed: make the batch visible in one step.
        for (id, book) in staged_books {
            books.insert(id, book);
        }
        for (id, record) in staged_records {
            records.insert(id, record);
        }

        Ok(receipt)
    }

    async fn snapshot(&self) -> AppResult<CorpusSnapshot> {
        // Same acquisition order as commit, so a snapshot never interleaves
        // with a half-applied batch.
        let books = self.books.read().await;
        let students = self.students.read().await;
        let records = self.records.read().await;
        Ok(CorpusSnapshot {
            books: books.values().cloned().collect(),
            students: students.values().cloned().collect(),
            records: records.values().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::NewBorrowRecord;
    use chrono::Duration;

    fn sample_book(total: u32) -> CreateBook {
        CreateBook {
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            isbn: "978-0-441-47812-5".to_string(),
            category: "Fiction".to_string(),
            total_quantity: total,
        }
    }

    fn sample_record(book: &Book) -> NewBorrowRecord {
        let now = Utc::now();
        NewBorrowRecord {
            student_id: StudentId::new(),
            student_name: "Ada Lovelace".to_string(),
            student_roll_number: "CS-101".to_string(),
            book_id: book.id,
            book_title: book.title.clone(),
            book_author: book.author.clone(),
            borrow_date: now,
            due_date: now + Duration::days(14),
        }
    }

    #[tokio::test]
    async fn insert_book_syncs_availability_to_stock() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(4)).await.unwrap();
        assert_eq!(book.available_quantity, 4);
        assert_eq!(book.version, 1);
    }

    #[tokio::test]
    async fn update_book_bumps_version_and_keeps_availability() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(4)).await.unwrap();
        let patch = UpdateBook {
            total_quantity: Some(9),
            ..Default::default()
        };
        let updated = store.update_book(book.id, patch).await.unwrap();
        assert_eq!(updated.total_quantity, 9);
        assert_eq!(updated.available_quantity, 4);
        assert_eq!(updated.version, 2);
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_book(BookId::new(), UpdateBook::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn commit_applies_record_and_decrement_together() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(2)).await.unwrap();
        let batch = WriteBatch::new()
            .insert_record(sample_record(&book))
            .adjust_availability(book.id, -1);
        let receipt = store.commit(batch).await.unwrap();
        let record = receipt.inserted_record.unwrap();
        assert!(record.is_open());

        let book = store.get_book(book.id).await.unwrap().unwrap();
        assert_eq!(book.available_quantity, 1);
        assert_eq!(store.open_records_by_book(book.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_commit_leaves_no_trace() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(0)).await.unwrap();
        let batch = WriteBatch::new()
            .insert_record(sample_record(&book))
            .adjust_availability(book.id, -1);
        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Neither the record nor the decrement is visible.
        assert!(store.list_records().await.unwrap().is_empty());
        let book = store.get_book(book.id).await.unwrap().unwrap();
        assert_eq!(book.available_quantity, 0);
        assert_eq!(book.version, 1);
    }

    #[tokio::test]
    async fn over_increment_is_an_internal_fault() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(1)).await.unwrap();
        let batch = WriteBatch::new().adjust_availability(book.id, 1);
        let err = store.commit(batch).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn mark_returned_twice_fails_cleanly() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(1)).await.unwrap();
        let receipt = store
            .commit(
                WriteBatch::new()
                    .insert_record(sample_record(&book))
                    .adjust_availability(book.id, -1),
            )
            .await
            .unwrap();
        let record = receipt.inserted_record.unwrap();

        let now = Utc::now();
        store
            .commit(
                WriteBatch::new()
                    .mark_returned(record.id, now)
                    .adjust_availability(book.id, 1),
            )
            .await
            .unwrap();

        let err = store
            .commit(
                WriteBatch::new()
                    .mark_returned(record.id, now)
                    .adjust_availability(book.id, 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyReturned(_)));

        let book = store.get_book(book.id).await.unwrap().unwrap();
        assert_eq!(book.available_quantity, 1);
    }

    #[tokio::test]
    async fn records_are_listed_newest_first() {
        let store = MemoryStore::new();
        let book = store.insert_book(sample_book(3)).await.unwrap();
        for _ in 0..3 {
            store
                .commit(
                    WriteBatch::new()
                        .insert_record(sample_record(&book))
                        .adjust_availability(book.id, -1),
                )
                .await
                .unwrap();
        }
        let records = store.list_records().await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].borrow_date >= w[1].borrow_date));
    }
}
