use std::f64::consts::LN_2;

/// Exponential recency weight: `e^(-ln2 * age / halfLife)`.
///
/// Range: 0.0 – 1.0. A non-positive or non-finite half-life disables decay.
pub fn weight(age_days: f64, half_life_days: f64) -> f64 {
    if !(half_life_days.is_finite() && half_life_days > 0.0) {
        return 1.0;
    }
    let age = if age_days.is_finite() { age_days.max(0.0) } else { 0.0 };
    (-LN_2 * age / half_life_days).exp()
}
