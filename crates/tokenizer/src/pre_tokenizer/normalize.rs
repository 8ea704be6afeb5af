//! Text normalization applied before scanning.
//!
//! CLIP collapses whitespace and lowercases its input; the other families use the text
//! unchanged. All functions here are pure and preserve the meaning of character offsets
//! within their output.

/// Whitespace as understood by CLIP clean-up and blank input detection.
///
/// Matches Python's `str.isspace`, which is what the GPT-2 and CLIP vocabularies were built
/// with. Note that this differs from [`char::is_whitespace`] on U+001C..U+001F.
#[inline]
pub fn is_unicode_space(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{001C}'..='\u{0020}'
            | '\u{0085}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// True if every character is whitespace (also true for the empty string).
pub fn is_all_space(text: &str) -> bool {
    text.chars().all(is_unicode_space)
}

/// Collapse every whitespace run into a single U+0020 and strip both ends.
///
/// Line breaks are whitespace, so they disappear into the collapsed runs.
pub fn clean_up_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if is_unicode_space(c) {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Lowercase character by character.
///
/// Only the first character of each lowercase mapping is kept, so the output has the
/// same number of characters as the input and offsets stay valid.
pub fn lowercase(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_set() {
        for c in [' ', '\t', '\n', '\r', '\u{0B}', '\u{0C}', '\u{1C}', '\u{85}', '\u{A0}', '\u{3000}'] {
            assert!(is_unicode_space(c), "{:?}", c);
        }
        for c in ['a', '0', '_', '\u{200B}', '\u{FEFF}'] {
            assert!(!is_unicode_space(c), "{:?}", c);
        }
    }

    #[test]
    fn test_clean_up_whitespace() {
        assert_eq!(clean_up_whitespace("a   b\n\nc"), "a b c");
        assert_eq!(clean_up_whitespace("  hello\tworld \r\n"), "hello world");
        assert_eq!(clean_up_whitespace("\u{3000}x\u{A0}y"), "x y");
        assert_eq!(clean_up_whitespace(" \n "), "");
        assert_eq!(clean_up_whitespace(""), "");
    }

    #[test]
    fn test_lowercase_preserves_length() {
        assert_eq!(lowercase("Hello WORLD"), "hello world");
        // U+0130 lowercases to two characters
        let text = "\u{130}X";
        assert_eq!(lowercase(text).chars().count(), text.chars().count());
        assert_eq!(lowercase(text), "ix");
    }

    #[test]
    fn test_is_all_space() {
        assert!(is_all_space(""));
        assert!(is_all_space(" \t\n"));
        assert!(!is_all_space(" a "));
    }
}
