/// Incremental mean: the mean of `count` values given the mean of the first
/// `count - 1` and the newest value.
pub fn running_mean(previous_mean: f64, value: f64, count: u32) -> f64 {
    match count {
        0 => previous_mean,
        n => previous_mean + (value - previous_mean) / n as f64,
    }
}

/// `part / whole` as a rounded percentage, 0 when `whole` is 0.
pub fn percentage(part: u32, whole: u32) -> u32 {
    match whole {
        positive if positive > 0 => ((part as f64 / positive as f64) * 100.0).round() as u32,
        _ => 0,
    }
}
