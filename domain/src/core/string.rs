//! Text helpers for rendering tool payloads.

/// Shorten `s` to at most `max_len` bytes, ending in `...` when cut.
///
/// The cut lands on a character boundary, so multi-byte text never splits.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate("unsafe { x }", 40), "unsafe { x }");
        assert_eq!(truncate("", 0), "");
    }

    #[test]
    fn test_cut_with_ellipsis() {
        assert_eq!(truncate("let password = \"x\";", 10), "let pas...");
    }

    #[test]
    fn test_cut_backs_off_to_char_boundary() {
        // 'ï' spans bytes 2..4, so a cut at byte 3 falls back to 2
        assert_eq!(truncate("naïve input", 6), "na...");
        // two 4-byte symbols; a cut at byte 4 keeps the first
        assert_eq!(truncate("\u{1F512}\u{1F511}", 7), "\u{1F512}...");
    }

    #[test]
    fn test_tiny_limit() {
        assert_eq!(truncate("abcdef", 2), "...");
    }
}
