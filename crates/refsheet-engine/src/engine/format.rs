/// Format a number for display.
///
/// Uses the shortest decimal that round-trips, so whole numbers have no
/// fractional part (`26`, `6.5`, `0.1`).
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Normalises -0 as well.
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Parse a display string as a finite number, ignoring surrounding whitespace.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
