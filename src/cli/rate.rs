use crate::core::resolver::Resolution;

/// Renders a resolution for the terminal: the rate, where it came from, and
/// one line per provider attempt.
pub fn format_resolution(resolution: &Resolution) -> String {
    let mut out = format!("USD 1 = {} ({})", resolution.rate, resolution.origin);
    for attempt in &resolution.attempts {
        let line = match &attempt.outcome {
            Ok(rate) => format!("\n  {}: {rate}", attempt.provider),
            Err(e) => format!("\n  {}: failed: {e}", attempt.provider),
        };
        out.push_str(&line);
    }
    out
}
