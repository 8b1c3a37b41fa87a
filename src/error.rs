//! Error types for gradebook lookups.
//!
//! [`DataAccessError`] covers everything a store can fail with.
//! [`GradebookError`] is what callers of the gradebook service see.

use thiserror::Error;

/// Failures while reading course data from a store.
#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("course not found: {course_id}")]
    CourseNotFound { course_id: String },

    #[error("inconsistent course data: {0}")]
    Integrity(String),
}

/// Errors surfaced by the gradebook service.
#[derive(Error, Debug)]
pub enum GradebookError {
    #[error("user '{requester_id}' may not view {scope}")]
    Unauthorized { requester_id: String, scope: String },

    #[error("student '{student_id}' is not enrolled in course '{course_id}'")]
    NotEnrolled {
        student_id: String,
        course_id: String,
    },

    #[error("data access failed: {0}")]
    DataAccess(#[from] DataAccessError),

    #[error("grading task failed: {0}")]
    Task(String),
}

impl GradebookError {
    /// HTTP-equivalent status for this error, for callers that front the
    /// service with a web layer.
    pub fn status_code(&self) -> u16 {
        match self {
            GradebookError::Unauthorized { .. } => 403,
            GradebookError::NotEnrolled { .. } => 404,
            GradebookError::DataAccess(_) | GradebookError::Task(_) => 500,
        }
    }
}
