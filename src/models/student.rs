//! Student model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::StudentId;

/// Roster student
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub course: String,
    /// Store revision counter, bumped on every mutation
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create student request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudent {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "roll_number must not be empty"))]
    pub roll_number: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "course must not be empty"))]
    pub course: String,
}

/// Partial roster edit
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
}

/// Student search query
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct StudentQuery {
    /// Substring matched against name, roll number and email (case-insensitive)
    pub q: Option<String>,
}
