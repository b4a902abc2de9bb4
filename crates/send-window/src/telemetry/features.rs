//! Cheap local text features, recorded next to window stats so estimates can
//! later be calibrated against real token usage.

use serde::Serialize;

/// Byte, character, word, and line counts of a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextFeatures {
    pub bytes: usize,
    pub runes: usize,
    pub words: usize,
    pub lines: usize,
}

/// Compute [`TextFeatures`] for `s`.
///
/// Words are split on Unicode whitespace. Lines are `0` for the empty string,
/// otherwise one more than the number of `\n`.
pub fn count_features(s: &str) -> TextFeatures {
    TextFeatures {
        bytes: s.len(),
        runes: s.chars().count(),
        words: s.split_whitespace().count(),
        lines: if s.is_empty() {
            0
        } else {
            1 + s.matches('\n').count()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string() {
        assert_eq!(count_features(""), TextFeatures::default());
    }

    #[test]
    fn ascii_with_mixed_whitespace() {
        let f = count_features("hello  world\nthis is\tgo");
        assert_eq!(f.bytes, 23);
        assert_eq!(f.runes, 23);
        assert_eq!(f.words, 5);
        assert_eq!(f.lines, 2);
    }

    #[test]
    fn multibyte() {
        let f = count_features("héllo 世界");
        assert_eq!(f.runes, 8);
        assert_eq!(f.bytes, 13);
        assert_eq!(f.words, 2);
        assert_eq!(f.lines, 1);
    }

    #[test]
    fn trailing_newline_counts_a_line() {
        assert_eq!(count_features("a\n").lines, 2);
        assert_eq!(count_features("\n\n").words, 0);
    }
}
