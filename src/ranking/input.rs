/// Parse one sub-score as typed by a judge.
///
/// Blank input, `-` and anything that is not a number mean "unset". Numbers
/// are returned as-is even when outside [0, 100]; the average treats those as
/// invalid, so the caller can still show what was typed.
pub fn parse_sub_score(input: &str) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() || input == "-" {
        return None;
    }
    input.parse::<f64>().ok().filter(|v| !v.is_nan())
}
