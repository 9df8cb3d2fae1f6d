/// Temperature suitability: 1.0 at `optimal`, falling linearly to 0.0 once
/// the distance from it reaches `optimal` itself.
pub fn calculate(temperature: f64, optimal: f64) -> f64 {
    if !temperature.is_finite() {
        return 0.0;
    }
    let spread = if optimal > 0.0 { optimal } else { 1.0 };
    (1.0 - (temperature - optimal).abs() / spread).clamp(0.0, 1.0)
}
