/// Token efficiency: 1.0 inside the ideal output band, proportionally less
/// for outputs that are too short or too long.
pub fn calculate(output_tokens: u32, ideal_min: u32, ideal_max: u32) -> f64 {
    if output_tokens == 0 {
        return 0.0;
    }
    let out = f64::from(output_tokens);
    let min = f64::from(ideal_min.min(ideal_max));
    let max = f64::from(ideal_max.max(ideal_min));
    if out < min {
        out / min
    } else if out > max && max > 0.0 {
        max / out
    } else {
        1.0
    }
}
