//! Small helpers shared by the API adapter and the binary.

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters (not bytes, so multi-byte text
/// such as Japanese never splits a code point) with an ellipsis and a byte
/// count indicator appended.
///
/// # Examples
///
/// ```
/// use news_flow::utils::truncate_for_log;
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
        assert_eq!(truncate_for_log(s, 13), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        // 3 bytes per char
        let result = truncate_for_log("人工知能", 2);
        assert_eq!(result, "人工…(+6 bytes)");
    }
}
