//! Whitespace-insensitive content comparison.

/// `true` when `existing` is present and equal to `candidate` once leading
/// and trailing whitespace is trimmed from both.
///
/// Internal whitespace and line endings stay significant.
pub fn is_same(existing: Option<&str>, candidate: &str) -> bool {
    match existing {
        Some(existing) => existing.trim() == candidate.trim(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("a: 1\n"), "a: 1\n", true)]
    #[case(Some("  a: 1\n\n"), "a: 1", true)]
    #[case(Some("a:  1"), "a: 1", false)]
    #[case(Some("a: 1\r\nb: 2"), "a: 1\nb: 2", false)]
    #[case(Some(""), "", true)]
    #[case(None, "", false)]
    #[case(None, "a: 1", false)]
    fn comparison_table(
        #[case] existing: Option<&str>,
        #[case] candidate: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_same(existing, candidate), expected);
    }
}
