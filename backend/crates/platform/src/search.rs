//! Search Helpers
//!
//! Case-insensitive substring search shared by list endpoints.

/// `ILIKE` pattern matching `term` anywhere, with `%`, `_` and `\` escaped
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// In-process equivalent of `haystack ILIKE contains_pattern(term)`
pub fn contains_ignore_case(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(&term.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("drama"), "%drama%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Science Fiction", "fiction"));
        assert!(contains_ignore_case("admin", "ADM"));
        assert!(!contains_ignore_case("drama", "comedy"));
    }
}
