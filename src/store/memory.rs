use crate::error::DataAccessError;
use crate::grading::{AssignmentGroup, Submission};
use crate::store::{Enrollment, GradebookStore, Role};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Everything stored for one course, independent of any student.
#[derive(Debug, Clone, Default)]
pub(crate) struct CourseData {
    pub(crate) groups: Vec<AssignmentGroup>,
    pub(crate) enrollments: Vec<Enrollment>,
    /// Grade keyed by `(assignment_id, student_id)`. `None` means submitted
    /// but not graded.
    pub(crate) submissions: HashMap<(String, String), Option<f64>>,
}

impl CourseData {
    /// Adds a submission, rejecting a second one for the same pair.
    pub(crate) fn add_submission(
        &mut self,
        assignment_id: &str,
        student_id: &str,
        grade: Option<f64>,
    ) -> Result<(), DataAccessError> {
        let key = (assignment_id.to_string(), student_id.to_string());
        if self.submissions.contains_key(&key) {
            return Err(DataAccessError::Integrity(format!(
                "duplicate submission for assignment '{assignment_id}' by '{student_id}'"
            )));
        }
        self.submissions.insert(key, grade);
        Ok(())
    }

    /// Projects the course's groups for a single student.
    pub(crate) fn groups_for(&self, student_id: &str) -> Vec<AssignmentGroup> {
        self.groups
            .iter()
            .map(|group| {
                let mut group = group.clone();
                for assignment in &mut group.assignments {
                    let key = (assignment.id.clone(), student_id.to_string());
                    assignment.submission = self
                        .submissions
                        .get(&key)
                        .map(|grade| Submission { grade: *grade });
                }
                group
            })
            .collect()
    }
}

/// In-process store, mainly for tests and embedding.
///
/// Assignment groups should be inserted without submissions; submissions
/// are recorded separately per student.
#[derive(Debug, Default)]
pub struct MemoryStore {
    courses: RwLock<HashMap<String, CourseData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the course if needed and appends `group` to it.
    pub fn insert_group(&self, course_id: &str, group: AssignmentGroup) {
        let mut courses = self.courses.write().unwrap_or_else(|e| e.into_inner());
        courses
            .entry(course_id.to_string())
            .or_default()
            .groups
            .push(group);
    }

    /// Creates the course if needed and enrolls `user_id` with `role`,
    /// replacing any role the user already had in the course.
    pub fn enroll(&self, course_id: &str, user_id: &str, role: Role) {
        let mut courses = self.courses.write().unwrap_or_else(|e| e.into_inner());
        let enrollments = &mut courses.entry(course_id.to_string()).or_default().enrollments;
        match enrollments.iter_mut().find(|e| e.user_id == user_id) {
            Some(existing) => existing.role = role,
            None => enrollments.push(Enrollment {
                user_id: user_id.to_string(),
                role,
            }),
        }
    }

    /// Records or replaces `student_id`'s submission for `assignment_id`.
    pub fn record_submission(
        &self,
        course_id: &str,
        assignment_id: &str,
        student_id: &str,
        grade: Option<f64>,
    ) {
        let mut courses = self.courses.write().unwrap_or_else(|e| e.into_inner());
        courses
            .entry(course_id.to_string())
            .or_default()
            .submissions
            .insert((assignment_id.to_string(), student_id.to_string()), grade);
    }

    fn with_course<T>(
        &self,
        course_id: &str,
        f: impl FnOnce(&CourseData) -> T,
    ) -> Result<T, DataAccessError> {
        let courses = self.courses.read().unwrap_or_else(|e| e.into_inner());
        courses
            .get(course_id)
            .map(f)
            .ok_or_else(|| DataAccessError::CourseNotFound {
                course_id: course_id.to_string(),
            })
    }
}

#[async_trait]
impl GradebookStore for MemoryStore {
    async fn assignment_groups(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Vec<AssignmentGroup>, DataAccessError> {
        self.with_course(course_id, |course| course.groups_for(student_id))
    }

    async fn enrollments(&self, course_id: &str) -> Result<Vec<Enrollment>, DataAccessError> {
        self.with_course(course_id, |course| course.enrollments.clone())
    }
}
