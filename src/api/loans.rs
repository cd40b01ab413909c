//! Lending endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{record::BorrowRecord, RecordId},
    services::ledger::{BorrowRequest, LoanView, StatusFilter},
};

use super::CallerIdentity;

/// Loan listing filter
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct LoanQuery {
    /// One of `all`, `open`, `returned`, `overdue` (default `all`)
    pub status: Option<StatusFilter>,
}

/// List borrow records with their loan status, newest first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Borrow records", body = Vec<LoanView>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanView>>> {
    let loans = state
        .services
        .ledger
        .list_records(&identity, query.status.unwrap_or_default())
        .await?;
    Ok(Json(loans))
}

/// Borrow a book for a student
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow record created", body = BorrowRecord),
        (status = 400, description = "Invalid request or no copies available"),
        (status = 404, description = "Student or book not found"),
        (status = 409, description = "Last copy taken by a concurrent borrow")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let record = state.services.ledger.borrow(&identity, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(record_id): Path<RecordId>,
) -> AppResult<Json<BorrowRecord>> {
    let record = state
        .services
        .ledger
        .return_book(&identity, record_id)
        .await?;
    Ok(Json(record))
}
