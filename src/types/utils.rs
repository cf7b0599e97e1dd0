//! Shared string helpers

/// First `max_chars` characters of `s`, never splitting a UTF-8 sequence.
///
/// Returns the input unchanged when it is already short enough.
#[inline]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Collapse whitespace and cap length for one-line log previews
pub fn preview(s: &str, max_chars: usize) -> String {
    let flat: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_chars(&flat, max_chars);
    if cut.len() < flat.len() {
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab", 10), "ab");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("a\n  b   c", 10), "a b c");
        assert_eq!(preview("abcdefgh", 4), "abcd...");
    }
}
