//! Consistency warnings for assignment group data.
//!
//! The aggregator accepts whatever the store returns. These checks only
//! report suspicious data so an instructor can fix it at the source.

use crate::grading::types::AssignmentGroup;

/// Weight total that instructors usually intend.
const EXPECTED_WEIGHT_TOTAL: f64 = 100.0;

/// Returns a human-readable warning for every suspicious value in `groups`.
pub fn validate_groups(groups: &[AssignmentGroup]) -> Vec<String> {
    let mut warnings = Vec::new();

    let weight_total: f64 = groups.iter().map(|g| g.weight).sum();
    if !groups.is_empty() && (weight_total - EXPECTED_WEIGHT_TOTAL).abs() > f64::EPSILON * 100.0 {
        warnings.push(format!(
            "group weights sum to {weight_total}, not {EXPECTED_WEIGHT_TOTAL}"
        ));
    }

    for group in groups {
        if !group.weight.is_finite() {
            warnings.push(format!(
                "group '{}' has non-finite weight {}",
                group.name, group.weight
            ));
        } else if group.weight < 0.0 {
            warnings.push(format!(
                "group '{}' has negative weight {}",
                group.name, group.weight
            ));
        }

        for assignment in &group.assignments {
            if assignment.points == 0 {
                warnings.push(format!(
                    "assignment '{}' in group '{}' is worth 0 points",
                    assignment.id, group.name
                ));
            }

            let Some(score) = assignment.graded_score() else {
                continue;
            };
            if !score.is_finite() {
                warnings.push(format!(
                    "assignment '{}' has non-finite grade {score}",
                    assignment.id
                ));
            } else if score < 0.0 {
                warnings.push(format!(
                    "assignment '{}' has negative grade {score}",
                    assignment.id
                ));
            } else if score > f64::from(assignment.points) {
                warnings.push(format!(
                    "assignment '{}' grade {score} exceeds {} points",
                    assignment.id, assignment.points
                ));
            }
        }
    }

    warnings
}
