use crate::grading::types::{AssignmentGroup, GradeResult, GroupBreakdown};
use crate::grading::utility::{percentage, round2};
use tracing::debug;

/// Running totals while walking the assignment groups.
#[derive(Debug, Default)]
struct Accumulator {
    final_grade: f64,
    total_weight: f64,
    breakdown: Vec<GroupBreakdown>,
}

impl Accumulator {
    fn add_group(&mut self, group: &AssignmentGroup) {
        let mut total_points = 0u64;
        let mut earned_points = 0.0;
        let mut graded = 0usize;

        for assignment in &group.assignments {
            // Ungraded work is left out of both sums rather than counted as zero.
            let Some(score) = assignment.graded_score() else {
                continue;
            };
            graded += 1;
            total_points += u64::from(assignment.points);
            earned_points += score;
        }

        let Some(group_percentage) = percentage(earned_points, total_points as f64) else {
            debug!(group = %group.name, graded, "Group has no graded points, skipping");
            return;
        };

        let weighted_contribution = (group_percentage / 100.0) * group.weight;
        self.final_grade += weighted_contribution;
        self.total_weight += group.weight;

        self.breakdown.push(GroupBreakdown {
            group_name: group.name.clone(),
            weight: group.weight,
            total_points,
            earned_points,
            group_grade_percentage: round2(group_percentage),
            contribution_to_final: round2(weighted_contribution * 100.0),
        });
    }

    fn finish(self) -> GradeResult {
        let final_grade = if self.total_weight > 0.0 {
            Some(round2((self.final_grade / self.total_weight) * 100.0))
        } else {
            None
        };

        GradeResult {
            final_grade,
            breakdown: self.breakdown,
        }
    }
}

/// Computes a student's weighted course grade from their assignment groups.
///
/// Groups without any graded assignment are omitted from the breakdown and
/// from the weight used to normalize the final grade. The result is `None`
/// when no group has graded work.
pub fn compute_grade(groups: &[AssignmentGroup]) -> GradeResult {
    let mut acc = Accumulator::default();
    for group in groups {
        acc.add_group(group);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::types::{Assignment, Submission};

    fn assignment(id: &str, points: u32, grade: Option<Option<f64>>) -> Assignment {
        Assignment {
            id: id.to_string(),
            title: None,
            points,
            submission: grade.map(|grade| Submission { grade }),
        }
    }

    fn group(name: &str, weight: f64, assignments: Vec<Assignment>) -> AssignmentGroup {
        AssignmentGroup {
            id: name.to_lowercase(),
            name: name.to_string(),
            weight,
            assignments,
        }
    }

    #[test]
    fn test_no_groups_yields_null_grade() {
        let result = compute_grade(&[]);
        assert_eq!(result.final_grade, None);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_single_group_two_assignments() {
        let groups = vec![group(
            "Homework",
            100.0,
            vec![
                assignment("hw1", 10, Some(Some(8.0))),
                assignment("hw2", 20, Some(Some(20.0))),
            ],
        )];

        let result = compute_grade(&groups);

        assert_eq!(result.final_grade, Some(93.33));
        assert_eq!(result.breakdown.len(), 1);
        let line = &result.breakdown[0];
        assert_eq!(line.total_points, 30);
        assert_eq!(line.earned_points, 28.0);
        assert_eq!(line.group_grade_percentage, 93.33);
        assert_eq!(line.contribution_to_final, 9333.33);
    }

    #[test]
    fn test_two_weighted_groups() {
        let groups = vec![
            group("Homework", 40.0, vec![assignment("hw1", 10, Some(Some(8.0)))]),
            group(
                "Exams",
                60.0,
                vec![
                    assignment("mid", 10, Some(Some(9.0))),
                    assignment("final", 10, Some(Some(9.0))),
                ],
            ),
        ];

        let result = compute_grade(&groups);

        assert_eq!(result.final_grade, Some(86.0));
        let names: Vec<_> = result.breakdown.iter().map(|b| b.group_name.as_str()).collect();
        assert_eq!(names, ["Homework", "Exams"]);
        assert_eq!(result.breakdown[0].group_grade_percentage, 80.0);
        assert_eq!(result.breakdown[1].group_grade_percentage, 90.0);
        assert_eq!(result.breakdown[0].contribution_to_final, 3200.0);
        assert_eq!(result.breakdown[1].contribution_to_final, 5400.0);
    }

    #[test]
    fn test_ungraded_group_is_omitted_and_does_not_dilute() {
        let groups = vec![
            group("Homework", 40.0, vec![assignment("hw1", 10, Some(Some(10.0)))]),
            group(
                "Exams",
                60.0,
                vec![assignment("mid", 100, None), assignment("final", 100, Some(None))],
            ),
        ];

        let result = compute_grade(&groups);

        assert_eq!(result.final_grade, Some(100.0));
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].group_name, "Homework");
    }

    #[test]
    fn test_ungraded_assignments_do_not_count_as_zero() {
        let groups = vec![group(
            "Quizzes",
            25.0,
            vec![
                assignment("q1", 5, Some(Some(4.0))),
                assignment("q2", 5, None),
                assignment("q3", 5, Some(None)),
            ],
        )];

        let result = compute_grade(&groups);

        assert_eq!(result.breakdown[0].total_points, 5);
        assert_eq!(result.breakdown[0].earned_points, 4.0);
        assert_eq!(result.final_grade, Some(80.0));
    }

    #[test]
    fn test_all_groups_ungraded_yields_null() {
        let groups = vec![
            group("Homework", 50.0, vec![assignment("hw1", 10, None)]),
            group("Exams", 50.0, vec![assignment("mid", 10, Some(None))]),
        ];

        let result = compute_grade(&groups);

        assert_eq!(result.final_grade, None);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_one_third_rounds_down() {
        let groups = vec![group("Labs", 10.0, vec![assignment("lab1", 3, Some(Some(1.0)))])];

        let result = compute_grade(&groups);

        assert_eq!(result.breakdown[0].group_grade_percentage, 33.33);
        assert_eq!(result.final_grade, Some(33.33));
    }

    #[test]
    fn test_weights_need_not_sum_to_hundred() {
        let groups = vec![
            group("Homework", 1.0, vec![assignment("hw1", 10, Some(Some(5.0)))]),
            group("Exams", 3.0, vec![assignment("mid", 10, Some(Some(10.0)))]),
        ];

        let result = compute_grade(&groups);

        // (0.5 * 1 + 1.0 * 3) / 4
        assert_eq!(result.final_grade, Some(87.5));
    }

    #[test]
    fn test_zero_weight_group_with_only_graded_work_yields_null() {
        let groups = vec![group("Extra", 0.0, vec![assignment("x1", 10, Some(Some(10.0)))])];

        let result = compute_grade(&groups);

        assert_eq!(result.final_grade, None);
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].contribution_to_final, 0.0);
    }

    #[test]
    fn test_zero_point_graded_assignments_are_skipped() {
        let groups = vec![group("Participation", 10.0, vec![assignment("p1", 0, Some(Some(0.0)))])];

        let result = compute_grade(&groups);

        assert_eq!(result.final_grade, None);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_compute_is_idempotent() {
        let groups = vec![group(
            "Homework",
            100.0,
            vec![assignment("hw1", 7, Some(Some(5.5)))],
        )];

        assert_eq!(compute_grade(&groups), compute_grade(&groups));
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let groups = vec![group("Homework", 100.0, vec![assignment("hw1", 10, Some(Some(9.0)))])];

        let json = serde_json::to_value(compute_grade(&groups)).unwrap();

        assert_eq!(json["finalGrade"], 90.0);
        let line = &json["breakdown"][0];
        assert_eq!(line["groupName"], "Homework");
        assert_eq!(line["totalPoints"], 10);
        assert_eq!(line["earnedPoints"], 9.0);
        assert_eq!(line["groupGradePercentage"], 90.0);
        assert_eq!(line["contributionToFinal"], 9000.0);

        let empty = serde_json::to_value(compute_grade(&[])).unwrap();
        assert!(empty["finalGrade"].is_null());
    }
}
