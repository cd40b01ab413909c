//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::BookId;

/// Catalog book with inventory counts.
///
/// `available_quantity` is owned by the inventory ledger: it starts equal to
/// `total_quantity` and only borrow/return commits move it afterwards.
/// Catalog edits never touch it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub total_quantity: u32,
    pub available_quantity: u32,
    /// Store revision counter, bumped on every mutation
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    pub total_quantity: u32,
}

/// Partial catalog edit. `available_quantity` is deliberately absent:
/// the ledger is the only writer of that field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub total_quantity: Option<u32>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.category.is_none()
            && self.total_quantity.is_none()
    }
}

/// Book search query
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct BookQuery {
    /// Substring matched against title, author and ISBN (case-insensitive)
    pub q: Option<String>,
    /// Exact category filter
    pub category: Option<String>,
}
