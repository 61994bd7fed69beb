//! Textual `+` handling.

use super::is_numeric_char;

/// Drop every `+` from textual values so `howdy+goodbye` reads `howdygoodbye`.
/// Purely numeric strings are left alone.
pub(super) fn parse(input: &str) -> String {
    if input.chars().all(is_numeric_char) {
        input.to_string()
    } else {
        input.replace('+', "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenates_text() {
        assert_eq!(parse("howdy+goodbye"), "howdygoodbye");
        assert_eq!(parse("a+b+c"), "abc");
    }

    #[test]
    fn test_leaves_numeric_strings() {
        assert_eq!(parse("1 + 2"), "1 + 2");
        assert_eq!(parse("99"), "99");
    }
}
