//! Character-level segmentation.
//!
//! Text is first normalized by splitting on whitespace and rejoining the
//! pieces with single spaces, then every Unicode scalar of the result becomes
//! its own token. The spaces inserted between words are kept as literal `" "`
//! tokens so that detokenization is plain concatenation.
//!
//! No lowercasing, accent stripping or CJK spacing is applied.

/// Whitespace as understood by the segmenter.
///
/// Unicode `White_Space` plus the ASCII information separators
/// (U+001C..=U+001F), which are treated as line/segment breaks.
#[inline]
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{1c}'..='\u{1f}')
}

/// Split text on runs of whitespace, dropping empty pieces.
///
/// Empty or all-whitespace input yields an empty vector.
pub fn whitespace_tokenize(text: &str) -> Vec<&str> {
    text.split(is_whitespace)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_tokenize(text).join(" ")
}

/// Segment text into single-character tokens.
///
/// ```
/// use kochar::core::segment;
///
/// assert_eq!(segment("가  나\n"), vec!["가", " ", "나"]);
/// assert!(segment("   ").is_empty());
/// ```
pub fn segment(text: &str) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    normalized.chars().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenize() {
        assert_eq!(whitespace_tokenize("  hello \t world\n"), vec!["hello", "world"]);
        assert!(whitespace_tokenize("").is_empty());
        assert!(whitespace_tokenize(" \n\t ").is_empty());
    }

    #[test]
    fn test_segment_single_word() {
        assert_eq!(segment("안녕"), vec!["안", "녕"]);
    }

    #[test]
    fn test_segment_keeps_single_space_between_words() {
        assert_eq!(segment("a  b\t\tc"), vec!["a", " ", "b", " ", "c"]);
    }

    #[test]
    fn test_segment_trims_edges() {
        assert_eq!(segment("  가 "), vec!["가"]);
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment("").is_empty());
        assert!(segment("\u{3000}\u{a0}").is_empty());
    }

    #[test]
    fn test_segment_is_per_scalar() {
        // Decomposed jamo stay as separate scalars; nothing is recombined.
        assert_eq!(segment("\u{1100}\u{1161}"), vec!["\u{1100}", "\u{1161}"]);
        assert_eq!(segment("🦀!"), vec!["🦀", "!"]);
    }

    #[test]
    fn test_segment_preserves_case() {
        assert_eq!(segment("Ab"), vec!["A", "b"]);
    }

    #[test]
    fn test_information_separators_are_whitespace() {
        assert_eq!(normalize_whitespace("a\u{1f}b"), "a b");
    }
}
