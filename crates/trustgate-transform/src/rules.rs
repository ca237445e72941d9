// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redaction and generalization rules.
//!
//! Each rule rewrites matching spans to a bracketed placeholder and reports how
//! many spans it touched. Placeholders are chosen so later rules never match them.

use std::sync::LazyLock;

use regex::Regex;
use trustgate_core::types::TransformKind;

/// One regex-driven rule.
pub struct Rule {
    pub kind: TransformKind,
    pattern: &'static LazyLock<Regex>,
    replacement: &'static str,
}

impl Rule {
    /// Apply the rule, returning the rewritten text and the number of matches.
    pub fn apply(&self, input: &str) -> (String, usize) {
        let count = self.pattern.find_iter(input).count();
        if count == 0 {
            return (input.to_string(), 0);
        }
        (self.pattern.replace_all(input, self.replacement).into_owned(), count)
    }
}

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>()]+").unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap());

static IP_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?:25[0-5]|2[0-4]\d|1?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|1?\d?\d)\b").unwrap()
});

// 13-19 digits, optionally grouped by spaces or dashes.
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d(?:[ -]?\d){12,18}\b").unwrap());

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{2,4}\)|\b\d{3})[\s.\-]?\d{3}[\s.\-]\d{4}\b").unwrap()
});

// Keeps the preceding whitespace (captured) so surrounding words stay separated.
static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)@[A-Za-z0-9_]{2,}").unwrap());

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b\d{4}-\d{2}-\d{2}\b",
        r"|\b\d{1,2}/\d{1,2}/\d{2,4}\b",
        r"|\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b",
    ))
    .unwrap()
});

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+(?:[.,]\d+)*\b").unwrap());

// Runs of capitalized words.
static CAPITALIZED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*\b").unwrap());

/// Direct identifier rules, in application order. URLs go first so emails
/// embedded in query strings are removed with the URL; cards before phones so
/// long digit runs are not split into phone-shaped fragments.
pub static IDENTIFIER_RULES: [Rule; 6] = [
    Rule { kind: TransformKind::Url, pattern: &URL, replacement: "[URL]" },
    Rule { kind: TransformKind::Email, pattern: &EMAIL, replacement: "[EMAIL]" },
    Rule { kind: TransformKind::IpAddress, pattern: &IP_ADDRESS, replacement: "[IP]" },
    Rule { kind: TransformKind::CardNumber, pattern: &CARD_NUMBER, replacement: "[CARD]" },
    Rule { kind: TransformKind::Phone, pattern: &PHONE, replacement: "[PHONE]" },
    Rule { kind: TransformKind::Handle, pattern: &HANDLE, replacement: "${1}[HANDLE]" },
];

/// Numeric generalization rules, dates before bare numbers.
pub static NUMERIC_RULES: [Rule; 2] = [
    Rule { kind: TransformKind::Date, pattern: &DATE, replacement: "[DATE]" },
    Rule { kind: TransformKind::Number, pattern: &NUMBER, replacement: "[NUMBER]" },
];

/// Replace exact occurrences of the caller's own identifiers.
///
/// Values shorter than 3 characters are ignored; they would match ordinary words.
pub fn redact_identifiers(input: &str, identifiers: &[&str]) -> (String, usize) {
    let mut values: Vec<&str> = identifiers
        .iter()
        .copied()
        .filter(|v| v.chars().count() >= 3)
        .collect();
    // Longest first so a value containing another is replaced whole.
    values.sort_by_key(|v| std::cmp::Reverse(v.len()));

    let mut result = input.to_string();
    let mut count = 0;
    for value in values {
        let hits = result.matches(value).count();
        if hits > 0 {
            count += hits;
            result = result.replace(value, "[USER]");
        }
    }
    (result, count)
}

/// Generalize capitalized words that are not sentence-initial to `[NAME]`.
///
/// A run of capitalized words collapses to a single placeholder. When a run
/// starts a sentence its first word is kept, since capitalization there says
/// nothing about whether it is a name.
pub fn generalize_names(input: &str) -> (String, usize) {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    let mut count = 0;

    for m in CAPITALIZED_RUN.find_iter(input) {
        let sentence_start = is_sentence_start(&input[..m.start()]);
        let run = m.as_str();

        let replace_from = if sentence_start {
            // Skip the first word; whatever remains (if anything) is a name.
            match run.find([' ', '\t']) {
                Some(split) => {
                    let rest = run[split..].trim_start();
                    m.start() + (run.len() - rest.len())
                }
                None => continue,
            }
        } else {
            m.start()
        };

        if replace_from >= m.end() {
            continue;
        }
        out.push_str(&input[last..replace_from]);
        out.push_str("[NAME]");
        last = m.end();
        count += 1;
    }

    out.push_str(&input[last..]);
    (out, count)
}

fn is_sentence_start(before: &str) -> bool {
    match before.trim_end().chars().last() {
        None => true,
        Some(c) => matches!(c, '.' | '!' | '?' | ':' | '\n' | '"' | '(' | '-'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(rules: &[Rule], input: &str) -> String {
        rules.iter().fold(input.to_string(), |acc, r| r.apply(&acc).0)
    }

    #[test]
    fn redacts_email() {
        let (out, n) = IDENTIFIER_RULES[1].apply("mail me at jane.doe@example.org please");
        assert_eq!(out, "mail me at [EMAIL] please");
        assert_eq!(n, 1);
    }

    #[test]
    fn redacts_url_before_email() {
        let out = apply_all(&IDENTIFIER_RULES, "see https://x.io/?u=bob@corp.com now");
        assert_eq!(out, "see [URL] now");
    }

    #[test]
    fn redacts_ip_address() {
        let out = apply_all(&IDENTIFIER_RULES, "server 192.168.10.4 is down");
        assert_eq!(out, "server [IP] is down");
    }

    #[test]
    fn redacts_card_number() {
        let out = apply_all(&IDENTIFIER_RULES, "card 4111 1111 1111 1111 expired");
        assert_eq!(out, "card [CARD] expired");
    }

    #[test]
    fn redacts_phone_numbers() {
        let out = apply_all(&IDENTIFIER_RULES, "call +1 415-555-0199 or (020) 555 1234");
        assert!(!out.contains("555"), "got {out}");
        assert!(out.contains("[PHONE]"));
    }

    #[test]
    fn redacts_handles_but_keeps_spacing() {
        let out = apply_all(&IDENTIFIER_RULES, "ping @dev_ops and @qa");
        assert_eq!(out, "ping [HANDLE] and [HANDLE]");
    }

    #[test]
    fn leaves_plain_text_alone() {
        let input = "how do I sort a list in place?";
        assert_eq!(apply_all(&IDENTIFIER_RULES, input), input);
    }

    #[test]
    fn redacts_own_identifiers_longest_first() {
        let (out, n) = redact_identifiers("I am user-42 aka user-42-alt", &["user-42", "user-42-alt", "x"]);
        assert_eq!(out, "I am [USER] aka [USER]");
        assert_eq!(n, 2);
    }

    #[test]
    fn generalizes_mid_sentence_names() {
        let (out, n) = generalize_names("Yesterday I met Alice Smith in Paris.");
        assert_eq!(out, "Yesterday I met [NAME] in [NAME].");
        assert_eq!(n, 2);
    }

    #[test]
    fn keeps_sentence_initial_word() {
        let (out, n) = generalize_names("Please help. Bob Jones asked.");
        assert_eq!(out, "Please help. Bob [NAME] asked.");
        assert_eq!(n, 1);
    }

    #[test]
    fn generalizes_dates_before_numbers() {
        let out = apply_all(&NUMERIC_RULES, "on 2026-03-01 I paid 42.50 for 3 items, due March 5th, 2026");
        assert_eq!(out, "on [DATE] I paid [NUMBER] for [NUMBER] items, due [DATE]");
    }
}
