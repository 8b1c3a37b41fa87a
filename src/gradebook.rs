//! Gradebook lookups on behalf of a requesting user.
//!
//! The aggregator itself trusts its input. This module does the checks that
//! must pass before it runs: the requester may see the student's grades, and
//! the student is actually enrolled in the course.

use crate::error::GradebookError;
use crate::grading::{GradeResult, compute_grade, letter_grade};
use crate::store::{GradebookStore, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, info, warn};

/// Who is asking for which student's grade in which course.
#[derive(Debug, Clone)]
pub struct GradeRequest {
    pub requester_id: String,
    pub course_id: String,
    pub student_id: String,
}

impl GradeRequest {
    /// A student looking at their own grade.
    pub fn own(course_id: &str, student_id: &str) -> Self {
        Self {
            requester_id: student_id.to_string(),
            course_id: course_id.to_string(),
            student_id: student_id.to_string(),
        }
    }
}

/// One line of a course-wide grade report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseReportRow {
    pub generated_at: DateTime<Utc>,
    pub course_id: String,
    pub student_id: String,
    pub final_grade: Option<f64>,
    pub letter_grade: Option<String>,
    pub graded_groups: usize,
}

impl CourseReportRow {
    fn new(course_id: &str, student_id: String, result: &GradeResult) -> Self {
        Self {
            generated_at: Utc::now(),
            course_id: course_id.to_string(),
            student_id,
            final_grade: result.final_grade,
            letter_grade: result.final_grade.map(letter_grade),
            graded_groups: result.breakdown.len(),
        }
    }
}

async fn require_staff<S: GradebookStore + ?Sized>(
    store: &S,
    course_id: &str,
    requester_id: &str,
    scope: String,
) -> Result<(), GradebookError> {
    let role = store.enrollment_role(course_id, requester_id).await?;
    if role.is_some_and(|r| r.is_staff()) {
        return Ok(());
    }
    warn!(requester_id, course_id, ?role, "Grade access denied");
    Err(GradebookError::Unauthorized {
        requester_id: requester_id.to_string(),
        scope,
    })
}

/// Computes the weighted course grade for `request.student_id`.
///
/// The requester must be the student, or a teacher or TA of the course.
/// Any store failure aborts the lookup; no partial result is returned.
#[tracing::instrument(
    skip(store, request),
    fields(course_id = %request.course_id, student_id = %request.student_id)
)]
pub async fn student_gradebook<S: GradebookStore + ?Sized>(
    store: &S,
    request: &GradeRequest,
) -> Result<GradeResult, GradebookError> {
    if request.requester_id != request.student_id {
        require_staff(
            store,
            &request.course_id,
            &request.requester_id,
            format!("grades of '{}'", request.student_id),
        )
        .await?;
    }

    let role = store
        .enrollment_role(&request.course_id, &request.student_id)
        .await?;
    if role != Some(Role::Student) {
        return Err(GradebookError::NotEnrolled {
            student_id: request.student_id.clone(),
            course_id: request.course_id.clone(),
        });
    }

    let groups = store
        .assignment_groups(&request.course_id, &request.student_id)
        .await?;
    let result = compute_grade(&groups);

    debug!(
        groups = groups.len(),
        graded_groups = result.breakdown.len(),
        final_grade = ?result.final_grade,
        "Computed gradebook"
    );
    Ok(result)
}

/// Grades every student enrolled in `course_id`, at most `concurrency` at a
/// time. Rows come back sorted by student id. The first failure aborts the
/// whole report.
#[tracing::instrument(skip(store))]
pub async fn course_report(
    store: Arc<dyn GradebookStore>,
    requester_id: &str,
    course_id: &str,
    concurrency: usize,
) -> Result<Vec<CourseReportRow>, GradebookError> {
    require_staff(
        store.as_ref(),
        course_id,
        requester_id,
        format!("the grade report of course '{course_id}'"),
    )
    .await?;

    let students = store.enrolled_students(course_id).await?;
    info!(students = students.len(), "Grading course roster");

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for student_id in students {
        let store = Arc::clone(&store);
        let sem = Arc::clone(&semaphore);
        let course_id = course_id.to_string();
        let span = tracing::debug_span!("grade_student", student_id = %student_id);

        tasks.spawn(
            async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| GradebookError::Task(e.to_string()))?;
                let groups = store.assignment_groups(&course_id, &student_id).await?;
                let result = compute_grade(&groups);
                Ok::<_, GradebookError>(CourseReportRow::new(&course_id, student_id, &result))
            }
            .instrument(span),
        );
    }

    let mut rows = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined
            .map_err(|e| GradebookError::Task(e.to_string()))
            .and_then(|row| row);
        match outcome {
            Ok(row) => rows.push(row),
            Err(err) => {
                // Cancel the rest of the roster before reporting.
                tasks.abort_all();
                warn!(error = %err, pending = tasks.len(), "Course report aborted");
                return Err(err);
            }
        }
    }

    rows.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    info!(rows = rows.len(), "Course report complete");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataAccessError;
    use crate::grading::{Assignment, AssignmentGroup};
    use crate::store::{Enrollment, MemoryStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_group(
            "cs101",
            AssignmentGroup {
                id: "g1".into(),
                name: "Homework".into(),
                weight: 100.0,
                assignments: vec![
                    Assignment {
                        id: "hw1".into(),
                        title: None,
                        points: 10,
                        submission: None,
                    },
                    Assignment {
                        id: "hw2".into(),
                        title: None,
                        points: 20,
                        submission: None,
                    },
                ],
            },
        );
        store.enroll("cs101", "alice", Role::Student);
        store.enroll("cs101", "bob", Role::Student);
        store.enroll("cs101", "carol", Role::Student);
        store.enroll("cs101", "prof", Role::Teacher);
        store.enroll("cs101", "sam", Role::Ta);
        store.record_submission("cs101", "hw1", "alice", Some(8.0));
        store.record_submission("cs101", "hw2", "alice", Some(20.0));
        store.record_submission("cs101", "hw1", "bob", Some(5.0));
        store.record_submission("cs101", "hw2", "bob", None);
        store
    }

    #[tokio::test]
    async fn test_student_sees_own_grade() {
        let store = seeded_store();
        let result = student_gradebook(&store, &GradeRequest::own("cs101", "alice"))
            .await
            .unwrap();
        assert_eq!(result.final_grade, Some(93.33));
    }

    #[tokio::test]
    async fn test_staff_can_view_student() {
        let store = seeded_store();
        for staff in ["prof", "sam"] {
            let request = GradeRequest {
                requester_id: staff.into(),
                course_id: "cs101".into(),
                student_id: "bob".into(),
            };
            let result = student_gradebook(&store, &request).await.unwrap();
            assert_eq!(result.final_grade, Some(50.0));
        }
    }

    #[tokio::test]
    async fn test_other_student_is_unauthorized() {
        let store = seeded_store();
        let request = GradeRequest {
            requester_id: "bob".into(),
            course_id: "cs101".into(),
            student_id: "alice".into(),
        };
        let err = student_gradebook(&store, &request).await.unwrap_err();
        assert!(matches!(err, GradebookError::Unauthorized { .. }));
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "user 'bob' may not view grades of 'alice'");
    }

    #[tokio::test]
    async fn test_unenrolled_student() {
        let store = seeded_store();
        let err = student_gradebook(&store, &GradeRequest::own("cs101", "mallory"))
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::NotEnrolled { .. }));

        // Staff are enrolled, but not as students.
        let err = student_gradebook(&store, &GradeRequest::own("cs101", "prof"))
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::NotEnrolled { .. }));
    }

    #[tokio::test]
    async fn test_enrolled_student_without_submissions_has_null_grade() {
        let store = seeded_store();
        let result = student_gradebook(&store, &GradeRequest::own("cs101", "carol"))
            .await
            .unwrap();
        assert_eq!(result.final_grade, None);
        assert!(result.breakdown.is_empty());
    }

    struct FailingStore;

    #[async_trait]
    impl GradebookStore for FailingStore {
        async fn assignment_groups(
            &self,
            _course_id: &str,
            _student_id: &str,
        ) -> Result<Vec<AssignmentGroup>, DataAccessError> {
            Err(DataAccessError::Io(std::io::Error::other("connection reset")))
        }

        async fn enrollments(&self, _course_id: &str) -> Result<Vec<Enrollment>, DataAccessError> {
            Ok(vec![
                Enrollment {
                    user_id: "alice".into(),
                    role: Role::Student,
                },
                Enrollment {
                    user_id: "prof".into(),
                    role: Role::Teacher,
                },
            ])
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_data_access_error() {
        let err = student_gradebook(&FailingStore, &GradeRequest::own("cs101", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::DataAccess(_)));
        assert_eq!(err.status_code(), 500);

        let err = course_report(Arc::new(FailingStore), "prof", "cs101", 2)
            .await
            .unwrap_err();
        assert!(matches!(err, GradebookError::DataAccess(_)));
    }

    #[tokio::test]
    async fn test_missing_course_is_data_access_error() {
        let store = MemoryStore::new();
        let err = student_gradebook(&store, &GradeRequest::own("nope", "alice"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GradebookError::DataAccess(DataAccessError::CourseNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_course_report_sorted_with_letters() {
        let store: Arc<dyn GradebookStore> = Arc::new(seeded_store());

        let rows = course_report(store, "prof", "cs101", 2).await.unwrap();

        let ids: Vec<_> = rows.iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(ids, ["alice", "bob", "carol"]);
        assert_eq!(rows[0].final_grade, Some(93.33));
        assert_eq!(rows[0].letter_grade.as_deref(), Some("A"));
        assert_eq!(rows[1].letter_grade.as_deref(), Some("F"));
        assert_eq!(rows[2].final_grade, None);
        assert_eq!(rows[2].letter_grade, None);
        assert_eq!(rows[2].graded_groups, 0);
    }

    #[tokio::test]
    async fn test_course_report_requires_staff() {
        let store: Arc<dyn GradebookStore> = Arc::new(seeded_store());
        let err = course_report(store, "alice", "cs101", 2).await.unwrap_err();
        assert!(matches!(err, GradebookError::Unauthorized { .. }));
        assert_eq!(
            err.to_string(),
            "user 'alice' may not view the grade report of course 'cs101'"
        );
    }

    /// Roster of ten students where `s00` fails at once and everyone else
    /// takes a while before counting a finished fetch.
    struct SlowRosterStore {
        completed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GradebookStore for SlowRosterStore {
        async fn assignment_groups(
            &self,
            _course_id: &str,
            student_id: &str,
        ) -> Result<Vec<AssignmentGroup>, DataAccessError> {
            if student_id == "s00" {
                return Err(DataAccessError::Io(std::io::Error::other("connection reset")));
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn enrollments(&self, _course_id: &str) -> Result<Vec<Enrollment>, DataAccessError> {
            let mut roster: Vec<_> = (0..10)
                .map(|i| Enrollment {
                    user_id: format!("s{i:02}"),
                    role: Role::Student,
                })
                .collect();
            roster.push(Enrollment {
                user_id: "prof".into(),
                role: Role::Teacher,
            });
            Ok(roster)
        }
    }

    #[tokio::test]
    async fn test_course_report_failure_cancels_remaining_students() {
        let completed = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(SlowRosterStore {
            completed: Arc::clone(&completed),
        });

        let err = course_report(store, "prof", "cs101", 2).await.unwrap_err();
        assert!(matches!(err, GradebookError::DataAccess(_)));
        assert_eq!(completed.load(Ordering::SeqCst), 0);

        // Give any surviving task time to finish its fetch.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }
}
