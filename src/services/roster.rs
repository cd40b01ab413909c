//! Student roster service
//!
//! Plain create/read/update/delete over students plus substring search.
//! Nothing here touches ledger state; deleting a student leaves their
//! borrow records intact (they carry snapshot fields).

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        student::{CreateStudent, Student, StudentQuery, UpdateStudent},
        StudentId,
    },
    store::EntityStore,
};

use super::auth::{authorize, AdminGate, Identity};

#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn EntityStore>,
    gate: Arc<dyn AdminGate>,
}

impl RosterService {
    pub fn new(store: Arc<dyn EntityStore>, gate: Arc<dyn AdminGate>) -> Self {
        Self { store, gate }
    }

    pub async fn create_student(
        &self,
        identity: &Identity,
        student: CreateStudent,
    ) -> AppResult<Student> {
        authorize(self.gate.as_ref(), identity)?;
        student.validate()?;
        let student = self.store.insert_student(student).await?;
        tracing::info!(student_id = %student.id, "student enrolled");
        Ok(student)
    }

    pub async fn get_student(&self, identity: &Identity, id: StudentId) -> AppResult<Student> {
        authorize(self.gate.as_ref(), identity)?;
        self.store
            .get_student(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
    }

    /// List students, optionally narrowed by a case-insensitive substring
    /// over name, roll number and email.
    pub async fn search_students(
        &self,
        identity: &Identity,
        query: StudentQuery,
    ) -> AppResult<Vec<Student>> {
        authorize(self.gate.as_ref(), identity)?;

        let students = self.store.list_students().await?;
        let Some(term) = query.q.filter(|t| !t.is_empty()) else {
            return Ok(students);
        };
        let term = term.to_lowercase();
        Ok(students
            .into_iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&term)
                    || s.roll_number.to_lowercase().contains(&term)
                    || s.email.to_lowercase().contains(&term)
            })
            .collect())
    }

    pub async fn update_student(
        &self,
        identity: &Identity,
        id: StudentId,
        patch: UpdateStudent,
    ) -> AppResult<Student> {
        authorize(self.gate.as_ref(), identity)?;
        if matches!(patch.name.as_deref(), Some(""))
            || matches!(patch.roll_number.as_deref(), Some(""))
            || matches!(patch.email.as_deref(), Some(""))
            || matches!(patch.course.as_deref(), Some(""))
        {
            return Err(AppError::Validation(
                "fields must not be set to empty strings".to_string(),
            ));
        }
        self.store.update_student(id, patch).await
    }

    pub async fn delete_student(&self, identity: &Identity, id: StudentId) -> AppResult<()> {
        authorize(self.gate.as_ref(), identity)?;
        self.store.delete_student(id).await
    }
}
