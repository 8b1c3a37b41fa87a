use crate::error::DataAccessError;
use crate::grading::{Assignment, AssignmentGroup};
use crate::store::memory::CourseData;
use crate::store::{Enrollment, GradebookStore, Role};
use async_trait::async_trait;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GroupRow {
    id: String,
    name: String,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct AssignmentRow {
    id: String,
    group_id: String,
    title: Option<String>,
    points: u32,
}

#[derive(Debug, Deserialize)]
struct SubmissionRow {
    assignment_id: String,
    student_id: String,
    grade: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentRow {
    user_id: String,
    role: Role,
}

/// Reads courses from a directory of per-course CSV tables:
///
/// ```text
/// <base_dir>/course_id=<id>/groups.csv       id,name,weight
/// <base_dir>/course_id=<id>/assignments.csv  id,group_id,title,points
/// <base_dir>/course_id=<id>/submissions.csv  assignment_id,student_id,grade
/// <base_dir>/course_id=<id>/enrollments.csv  user_id,role
/// ```
///
/// Files are re-read on every call, so each lookup sees current data.
/// A missing `submissions.csv` means nothing has been submitted yet. Each
/// user may appear only once in `enrollments.csv`.
///
/// Reads run on tokio's blocking pool so that concurrent lookups do not stall
/// the async workers.
pub struct CsvStore {
    base_dir: PathBuf,
}

impl CsvStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Runs `read` against the base directory on the blocking thread pool.
    async fn run_blocking<T, F>(&self, read: F) -> Result<T, DataAccessError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, DataAccessError> + Send + 'static,
    {
        let base_dir = self.base_dir.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| read(&base_dir)))
            .await
            .map_err(|e| DataAccessError::Io(std::io::Error::other(e)))?
    }
}

fn course_dir(base_dir: &Path, course_id: &str) -> Result<PathBuf, DataAccessError> {
    let dir = base_dir.join(format!("course_id={course_id}"));
    if !dir.is_dir() {
        return Err(DataAccessError::CourseNotFound {
            course_id: course_id.to_string(),
        });
    }
    Ok(dir)
}

fn load_course(base_dir: &Path, course_id: &str) -> Result<CourseData, DataAccessError> {
    let dir = course_dir(base_dir, course_id)?;
    let mut course = CourseData::default();

    let groups: Vec<GroupRow> = read_rows(&dir.join("groups.csv"))?;
    for row in groups {
        course.groups.push(AssignmentGroup {
            id: row.id,
            name: row.name,
            weight: row.weight,
            assignments: Vec::new(),
        });
    }

    let mut assignment_ids = HashSet::new();
    let assignments: Vec<AssignmentRow> = read_rows(&dir.join("assignments.csv"))?;
    for row in assignments {
        let group = course
            .groups
            .iter_mut()
            .find(|g| g.id == row.group_id)
            .ok_or_else(|| {
                DataAccessError::Integrity(format!(
                    "assignment '{}' references unknown group '{}'",
                    row.id, row.group_id
                ))
            })?;
        assignment_ids.insert(row.id.clone());
        group.assignments.push(Assignment {
            id: row.id,
            title: row.title,
            points: row.points,
            submission: None,
        });
    }

    let submissions_path = dir.join("submissions.csv");
    if submissions_path.exists() {
        let submissions: Vec<SubmissionRow> = read_rows(&submissions_path)?;
        for row in submissions {
            if !assignment_ids.contains(&row.assignment_id) {
                return Err(DataAccessError::Integrity(format!(
                    "submission by '{}' references unknown assignment '{}'",
                    row.student_id, row.assignment_id
                )));
            }
            course.add_submission(&row.assignment_id, &row.student_id, row.grade)?;
        }
    }

    course.enrollments = load_enrollments(&dir)?;

    debug!(
        course_id,
        groups = course.groups.len(),
        submissions = course.submissions.len(),
        "Loaded course tables"
    );
    Ok(course)
}

fn load_enrollments(dir: &Path) -> Result<Vec<Enrollment>, DataAccessError> {
    let rows: Vec<EnrollmentRow> = read_rows(&dir.join("enrollments.csv"))?;
    let mut seen = HashSet::new();
    let mut enrollments = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert(row.user_id.clone()) {
            return Err(DataAccessError::Integrity(format!(
                "user '{}' is enrolled more than once",
                row.user_id
            )));
        }
        enrollments.push(Enrollment {
            user_id: row.user_id,
            role: row.role,
        });
    }

    Ok(enrollments)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataAccessError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        let record: T = result?;
        rows.push(record);
    }

    Ok(rows)
}

#[async_trait]
impl GradebookStore for CsvStore {
    #[tracing::instrument(skip(self), fields(base_dir = %self.base_dir.display()))]
    async fn assignment_groups(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Vec<AssignmentGroup>, DataAccessError> {
        let course_id = course_id.to_string();
        let student_id = student_id.to_string();
        self.run_blocking(move |base_dir| {
            let course = load_course(base_dir, &course_id)?;
            Ok(course.groups_for(&student_id))
        })
        .await
    }

    async fn enrollments(&self, course_id: &str) -> Result<Vec<Enrollment>, DataAccessError> {
        let course_id = course_id.to_string();
        self.run_blocking(move |base_dir| load_enrollments(&course_dir(base_dir, &course_id)?))
            .await
    }
}
