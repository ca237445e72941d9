// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for provider error text before it reaches logs or audit records.

use std::sync::LazyLock;

use regex::Regex;

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Generic secret keys: sk-...
        Regex::new(r"sk-[a-zA-Z0-9_\-]{16,}").unwrap(),
        // Bearer tokens in echoed headers
        Regex::new(r"Bearer\s+[a-zA-Z0-9._\-]{10,}").unwrap(),
        // api_key=... in echoed query strings
        Regex::new(r"(?i)api[_-]?key=[^&\s]+").unwrap(),
    ]
});

const REDACTED: &str = "[REDACTED]";

/// Redact known secret formats plus any exact `known` values (e.g. configured API keys).
pub fn redact(input: &str, known: &[&str]) -> String {
    let mut result = input.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).into_owned();
    }

    let mut known: Vec<&str> = known.iter().copied().filter(|v| !v.is_empty()).collect();
    known.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in known {
        result = result.replace(value, REDACTED);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_tokens() {
        let out = redact("401: header Bearer abcdef0123456789 rejected", &[]);
        assert_eq!(out, "401: header [REDACTED] rejected");
    }

    #[test]
    fn redacts_known_values() {
        let out = redact("bad key tg-live-42", &["tg-live-42"]);
        assert_eq!(out, "bad key [REDACTED]");
    }

    #[test]
    fn redacts_query_string_keys() {
        let out = redact("GET /health?api_key=hunter2&x=1 failed", &[]);
        assert_eq!(out, "GET /health?[REDACTED]&x=1 failed");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(redact("connection refused", &["secret"]), "connection refused");
    }
}
