//! Data access for course gradebooks.
//!
//! [`GradebookStore`] is the async trait the gradebook service reads through.
//! [`MemoryStore`] keeps a snapshot in process, [`CsvStore`] reads per-course
//! CSV tables from disk, and [`HttpStore`] reads the same data from an LMS
//! JSON API.

mod csv_store;
mod http;
mod memory;

pub use csv_store::CsvStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

use crate::error::DataAccessError;
use crate::grading::AssignmentGroup;
use serde::{Deserialize, Serialize};

/// A user's role within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Ta,
}

impl Role {
    /// Returns `true` for roles allowed to view any student's grades.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Teacher | Role::Ta)
    }
}

/// A single enrollment record, as stored per course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub user_id: String,
    pub role: Role,
}

/// Abstraction over wherever course data lives.
#[async_trait::async_trait]
pub trait GradebookStore: Send + Sync {
    /// Returns every assignment group of `course_id` in stored order. Each
    /// assignment carries `student_id`'s submission, if one exists.
    async fn assignment_groups(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Vec<AssignmentGroup>, DataAccessError>;

    /// Returns all enrollment records of `course_id`. A user has at most one
    /// record per course.
    async fn enrollments(&self, course_id: &str) -> Result<Vec<Enrollment>, DataAccessError>;

    /// Returns `user_id`'s role in `course_id`, or `None` if not enrolled.
    async fn enrollment_role(
        &self,
        course_id: &str,
        user_id: &str,
    ) -> Result<Option<Role>, DataAccessError> {
        let enrollments = self.enrollments(course_id).await?;
        Ok(enrollments
            .into_iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.role))
    }

    /// Returns the ids of all students enrolled in `course_id`.
    async fn enrolled_students(&self, course_id: &str) -> Result<Vec<String>, DataAccessError> {
        let enrollments = self.enrollments(course_id).await?;
        Ok(enrollments
            .into_iter()
            .filter(|e| e.role == Role::Student)
            .map(|e| e.user_id)
            .collect())
    }
}
