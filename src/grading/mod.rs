//! Weighted course grade computation.
//!
//! Takes a student's assignment groups as returned by a store, keeps only
//! graded work, and folds the per-group percentages into a single grade
//! normalized by the weight of the groups that actually had graded work.

pub mod aggregate;
pub mod grade;
pub mod types;
pub mod utility;
pub mod validate;

pub use aggregate::compute_grade;
pub use grade::letter_grade;
pub use types::{Assignment, AssignmentGroup, GradeResult, GroupBreakdown, Submission};
pub use validate::validate_groups;
