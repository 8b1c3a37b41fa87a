/// Converts a final course percentage (0–100) into a letter grade.
///
/// | Range   | Grade |
/// |---------|-------|
/// | >= 90   | A     |
/// | >= 80   | B     |
/// | >= 70   | C     |
/// | >= 60   | D     |
/// | < 60    | F     |
pub fn letter_grade(pct: f64) -> String {
    match pct {
        p if p >= 90.0 => "A".into(),
        p if p >= 80.0 => "B".into(),
        p if p >= 70.0 => "C".into(),
        p if p >= 60.0 => "D".into(),
        _ => "F".into(),
    }
}
