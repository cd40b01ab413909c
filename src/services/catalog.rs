//! Catalog management service
//!
//! Plain create/read/update/delete over books plus substring search.
//! Inventory counts are owned by the ledger: this service never writes
//! `available_quantity` after the creation-time sync done by the store.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        BookId,
    },
    store::EntityStore,
};

use super::auth::{authorize, AdminGate, Identity};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn EntityStore>,
    gate: Arc<dyn AdminGate>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn EntityStore>, gate: Arc<dyn AdminGate>) -> Self {
        Self { store, gate }
    }

    pub async fn create_book(&self, identity: &Identity, book: CreateBook) -> AppResult<Book> {
        authorize(self.gate.as_ref(), identity)?;
        book.validate()?;
        let book = self.store.insert_book(book).await?;
        tracing::info!(book_id = %book.id, title = %book.title, "book added to catalog");
        Ok(book)
    }

    pub async fn get_book(&self, identity: &Identity, id: BookId) -> AppResult<Book> {
        authorize(self.gate.as_ref(), identity)?;
        self.store
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// List books, optionally narrowed by category (exact match) and a
    /// case-insensitive substring over title, author and ISBN.
    pub async fn search_books(&self, identity: &Identity, query: BookQuery) -> AppResult<Vec<Book>> {
        authorize(self.gate.as_ref(), identity)?;

        let books = match query.category.as_deref() {
            Some(category) => self.store.find_books_by_category(category).await?,
            None => self.store.list_books().await?,
        };

        let Some(term) = query.q.filter(|t| !t.is_empty()) else {
            return Ok(books);
        };
        let term = term.to_lowercase();
        Ok(books
            .into_iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&term)
                    || b.author.to_lowercase().contains(&term)
                    || b.isbn.contains(&term)
            })
            .collect())
    }

    /// Apply a partial catalog edit.
    ///
    /// Editing `total_quantity` below the number of copies out on loan is
    /// accepted without reconciliation; the ledger surfaces the mismatch on
    /// the next return. Unresolved policy, kept as-is.
    pub async fn update_book(
        &self,
        identity: &Identity,
        id: BookId,
        patch: UpdateBook,
    ) -> AppResult<Book> {
        authorize(self.gate.as_ref(), identity)?;
        if patch.is_empty() {
            return Err(AppError::Validation("empty update".to_string()));
        }
        if matches!(patch.title.as_deref(), Some(""))
            || matches!(patch.author.as_deref(), Some(""))
            || matches!(patch.isbn.as_deref(), Some(""))
            || matches!(patch.category.as_deref(), Some(""))
        {
            return Err(AppError::Validation(
                "fields must not be set to empty strings".to_string(),
            ));
        }
        self.store.update_book(id, patch).await
    }

    /// Delete a book. There is no cascade protection: open loans keep their
    /// snapshot fields but can no longer be returned.
    pub async fn delete_book(&self, identity: &Identity, id: BookId) -> AppResult<()> {
        authorize(self.gate.as_ref(), identity)?;
        let open = self.store.open_records_by_book(id).await?;
        if !open.is_empty() {
            tracing::warn!(
                book_id = %id,
                open_loans = open.len(),
                "deleting book with loans outstanding"
            );
        }
        self.store.delete_book(id).await
    }
}
