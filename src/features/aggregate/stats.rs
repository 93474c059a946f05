/// Arithmetic mean, defined as `0.0` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits.min(15) as i32);
    (value * factor).round() / factor
}

pub(crate) fn format_percentage(value: f64) -> String {
    format!("{value:.2}")
}
