//! Caret arithmetic for block text.
//!
//! The editor core counts caret offsets in chars. The DOM reports
//! `selectionStart`/`selectionEnd` in UTF-16 code units, so the view converts at
//! the boundary with [`utf16_to_char`] and [`char_to_utf16`].

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Split at a char offset (clamped to the text length).
pub(crate) fn split_at_char(s: &str, char_idx: usize) -> (String, String) {
    let b = char_to_byte(s, char_idx);
    (s[..b].to_string(), s[b..].to_string())
}

pub(crate) fn utf16_to_char(s: &str, pos_utf16: u32) -> usize {
    let mut acc: u32 = 0;
    for (n, ch) in s.chars().enumerate() {
        if acc >= pos_utf16 {
            return n;
        }
        acc += ch.len_utf16() as u32;
    }
    char_len(s)
}

pub(crate) fn char_to_utf16(s: &str, char_idx: usize) -> u32 {
    s.chars()
        .take(char_idx)
        .map(|c| c.len_utf16() as u32)
        .sum()
}

/// Replace the char range `start..end` with `insert`; returns the new text and
/// the caret offset right after the inserted text.
pub(crate) fn replace_range(s: &str, start: usize, end: usize, insert: &str) -> (String, usize) {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let a = char_to_byte(s, start);
    let b = char_to_byte(s, end);

    let mut out = String::with_capacity(s.len() + insert.len());
    out.push_str(&s[..a]);
    out.push_str(insert);
    out.push_str(&s[b..]);

    let caret = char_len(&s[..a]) + char_len(insert);
    (out, caret)
}

/// Pasted text is always plain; line endings are normalized to `\n`.
pub(crate) fn normalize_pasted(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_at_char_ascii() {
        let (a, b) = split_at_char("Hello world", 6);
        assert_eq!(a, "Hello ");
        assert_eq!(b, "world");
    }

    #[test]
    fn test_split_at_char_clamps() {
        let (a, b) = split_at_char("abc", 10);
        assert_eq!(a, "abc");
        assert_eq!(b, "");
    }

    #[test]
    fn test_split_at_char_multibyte() {
        let (a, b) = split_at_char("héllo", 2);
        assert_eq!(a, "hé");
        assert_eq!(b, "llo");
    }

    #[test]
    fn test_utf16_roundtrip_with_surrogates() {
        // 😀 takes two UTF-16 code units.
        let s = "a😀b";
        assert_eq!(char_to_utf16(s, 2), 3);
        assert_eq!(utf16_to_char(s, 3), 2);
        assert_eq!(utf16_to_char(s, 100), 3);
        assert_eq!(utf16_to_char(s, 0), 0);
    }

    #[test]
    fn test_replace_range_inserts_and_reports_caret() {
        let (s, caret) = replace_range("Hello world", 6, 11, "there");
        assert_eq!(s, "Hello there");
        assert_eq!(caret, 11);

        let (s, caret) = replace_range("ab", 1, 1, "XY");
        assert_eq!(s, "aXYb");
        assert_eq!(caret, 3);
    }

    #[test]
    fn test_normalize_pasted_line_endings() {
        assert_eq!(normalize_pasted("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
