/// Rounds to two decimal places, ties away from zero.
///
/// Every percentage the aggregator reports goes through this function.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes `100 * earned / possible`. Returns `None` when nothing is possible.
pub fn percentage(earned: f64, possible: f64) -> Option<f64> {
    if possible == 0.0 {
        return None;
    }
    Some(100.0 * earned / possible)
}
