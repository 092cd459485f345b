//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized form of a question stem used for duplicate detection.
///
/// Case-folded, whitespace-collapsed, with trailing punctuation removed so
/// that "What is a cell?" and "what  is a cell" compare equal.
pub fn normalize_stem(stem: &str) -> String {
    let collapsed = collapse_whitespace(&stem.to_lowercase());
    collapsed
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

/// Case-insensitive key used for topic and source names.
pub fn name_key(name: &str) -> String {
    collapse_whitespace(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes
        assert_eq!(truncate("café crème", 20), "café crème");
        assert_eq!(truncate("éééééé", 8), "éé...");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_normalize_stem_ignores_case_spacing_and_punctuation() {
        assert_eq!(normalize_stem("What is a Cell?"), "what is a cell");
        assert_eq!(normalize_stem("  what   is a cell  "), "what is a cell");
        assert_eq!(normalize_stem("What is a cell?!"), normalize_stem("what is a CELL"));
    }

    #[test]
    fn test_name_key() {
        assert_eq!(name_key("  Cell   Biology "), "cell biology");
    }
}
