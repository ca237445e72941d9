// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Truncation and segmentation used by heavy transformation.

/// Truncate to at most `max_chars` characters, backing off to the last
/// whitespace so no word is cut in half. Returns `None` if no truncation was needed.
pub fn truncate_at_word(input: &str, max_chars: usize) -> Option<String> {
    let (cut, _) = input.char_indices().nth(max_chars)?;
    let head = &input[..cut];
    let at_boundary = input[cut..].starts_with(char::is_whitespace);
    let trimmed = match head.rfind(char::is_whitespace) {
        _ if at_boundary => head,
        Some(pos) if pos > 0 => &head[..pos],
        _ => head,
    };
    Some(trimmed.trim_end().to_string())
}

/// Split text into sentence-aligned segments of at most `max_words` words.
///
/// Sentences longer than `max_words` are split on word boundaries.
pub fn segment(input: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for sentence in sentences(input) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if !current.is_empty() && current.len() + words.len() > max_words {
            segments.push(current.join(" "));
            current.clear();
        }
        for chunk in words.chunks(max_words) {
            if current.len() + chunk.len() > max_words {
                segments.push(current.join(" "));
                current.clear();
            }
            current.extend_from_slice(chunk);
        }
    }
    if !current.is_empty() {
        segments.push(current.join(" "));
    }
    segments
}

/// Sentences including their terminating punctuation.
fn sentences(input: &str) -> impl Iterator<Item = &str> {
    input
        .split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_not_truncated() {
        assert_eq!(truncate_at_word("hello world", 50), None);
        assert_eq!(truncate_at_word("hello", 5), None);
    }

    #[test]
    fn truncates_on_word_boundary() {
        assert_eq!(truncate_at_word("alpha beta gamma", 12).as_deref(), Some("alpha beta"));
    }

    #[test]
    fn truncates_single_long_word_hard() {
        assert_eq!(truncate_at_word("abcdefghij", 4).as_deref(), Some("abcd"));
    }

    #[test]
    fn truncation_respects_multibyte_chars() {
        let out = truncate_at_word("héllo wörld ünïcode", 11).unwrap();
        assert_eq!(out, "héllo wörld");
    }

    #[test]
    fn packs_sentences_into_segments() {
        let segs = segment("One two. Three four. Five six seven.", 4);
        assert_eq!(segs, vec!["One two. Three four.", "Five six seven."]);
    }

    #[test]
    fn splits_long_sentences() {
        let segs = segment("a b c d e f g", 3);
        assert_eq!(segs, vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn single_segment_when_short() {
        assert_eq!(segment("just a question?", 10), vec!["just a question?"]);
    }
}
