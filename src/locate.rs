//! Blank-line detection against the original source text
//!
//! A later reflow pass collapses every run of blank lines to one, so the
//! offset model has to know whether a blank-line slot sits directly above a
//! comment in the original file. That single fact is recorded per bound
//! comment at binding time, while the original text is still at hand.

/// True iff the physical line immediately above `first_line` is empty after
/// trimming. Line numbers are 1-based; the first line of a file has nothing
/// above it.
pub fn has_blank_line_before(source: &str, first_line: usize) -> bool {
    if first_line <= 1 {
        return false;
    }
    source
        .lines()
        .nth(first_line - 2)
        .is_some_and(|line| line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_has_nothing_above() {
        assert!(!has_blank_line_before("// comment\ncode();\n", 1));
    }

    #[test]
    fn test_blank_line_above() {
        assert!(has_blank_line_before("code();\n\n// comment\n", 3));
    }

    #[test]
    fn test_whitespace_only_line_counts_as_blank() {
        assert!(has_blank_line_before("code();\n   \t\n// comment\n", 3));
    }

    #[test]
    fn test_code_above_is_not_blank() {
        assert!(!has_blank_line_before("code();\n// comment\n", 2));
    }

    #[test]
    fn test_line_past_end_of_file() {
        assert!(!has_blank_line_before("code();\n", 10));
    }
}
