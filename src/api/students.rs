//! Student roster endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        student::{CreateStudent, Student, StudentQuery, UpdateStudent},
        StudentId,
    },
    services::ledger::LoanView,
};

use super::CallerIdentity;

/// List roster students, optionally filtered
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    params(StudentQuery),
    responses(
        (status = 200, description = "Matching students", body = Vec<Student>)
    )
)]
pub async fn list_students(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Query(query): Query<StudentQuery>,
) -> AppResult<Json<Vec<Student>>> {
    let students = state
        .services
        .roster
        .search_students(&identity, query)
        .await?;
    Ok(Json(students))
}

/// Enroll a student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_student(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Json(request): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let student = state
        .services
        .roster
        .create_student(&identity, request)
        .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Get one student
#[utoipa::path(
    get,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "The student", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<StudentId>,
) -> AppResult<Json<Student>> {
    let student = state.services.roster.get_student(&identity, id).await?;
    Ok(Json(student))
}

/// Edit roster fields of a student
#[utoipa::path(
    put,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Student ID")
    ),
    request_body = UpdateStudent,
    responses(
        (status = 200, description = "Updated student", body = Student),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<StudentId>,
    Json(patch): Json<UpdateStudent>,
) -> AppResult<Json<Student>> {
    let student = state
        .services
        .roster
        .update_student(&identity, id, patch)
        .await?;
    Ok(Json(student))
}

/// Remove a student from the roster
#[utoipa::path(
    delete,
    path = "/students/{id}",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn delete_student(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<StudentId>,
) -> AppResult<StatusCode> {
    state.services.roster.delete_student(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Borrow history of a student, newest first
#[utoipa::path(
    get,
    path = "/students/{id}/records",
    tag = "students",
    security(("bearer_auth" = [])),
    params(
        ("id" = uuid::Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "The student's borrow records", body = Vec<LoanView>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student_records(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
    Path(id): Path<StudentId>,
) -> AppResult<Json<Vec<LoanView>>> {
    let records = state
        .services
        .ledger
        .student_history(&identity, id)
        .await?;
    Ok(Json(records))
}
