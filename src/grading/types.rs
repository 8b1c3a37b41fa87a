//! Data types consumed and produced by the grade aggregator.

use serde::{Deserialize, Serialize};

/// A student's submission for a single assignment.
///
/// `grade` is `None` until an instructor has scored the work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub grade: Option<f64>,
}

/// An assignment together with the requesting student's submission, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub points: u32,
    #[serde(default)]
    pub submission: Option<Submission>,
}

impl Assignment {
    /// Returns the submission grade when the assignment has been graded.
    pub fn graded_score(&self) -> Option<f64> {
        self.submission.as_ref().and_then(|s| s.grade)
    }
}

/// A named, weighted bucket of assignments ("Homework", "Exams", ...).
///
/// Weights are relative; nothing requires them to sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentGroup {
    pub id: String,
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// Per-group line of a [`GradeResult`].
///
/// `total_points` and `earned_points` only count graded assignments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBreakdown {
    pub group_name: String,
    pub weight: f64,
    pub total_points: u64,
    pub earned_points: f64,
    pub group_grade_percentage: f64,
    pub contribution_to_final: f64,
}

/// Normalized course grade for one student plus the groups that produced it.
///
/// `final_grade` is `None` when no group has graded work.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub final_grade: Option<f64>,
    pub breakdown: Vec<GroupBreakdown>,
}
