// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leakage measurement between a raw payload and anything derived from it.

/// Length (in characters) of the longest substring of `raw` that appears
/// verbatim in `haystack`.
///
/// Used to check that transform metadata and audit records stay under the
/// configured leakage threshold.
pub fn longest_leaked_substring(raw: &str, haystack: &str) -> usize {
    let boundaries: Vec<usize> = raw
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(raw.len()))
        .collect();
    let chars = boundaries.len() - 1;

    let mut best = 0;
    for start in 0..chars {
        // Only look for matches longer than the best found so far.
        let mut len = best + 1;
        while start + len <= chars && haystack.contains(&raw[boundaries[start]..boundaries[start + len]]) {
            best = len;
            len += 1;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_overlap() {
        assert_eq!(longest_leaked_substring("abc", "xyz"), 0);
    }

    #[test]
    fn finds_longest_run() {
        assert_eq!(longest_leaked_substring("hello world", "say world!"), 6);
    }

    #[test]
    fn handles_multibyte() {
        assert_eq!(longest_leaked_substring("größe", "xößy"), 2);
    }

    #[test]
    fn empty_raw_leaks_nothing() {
        assert_eq!(longest_leaked_substring("", "anything"), 0);
    }
}
