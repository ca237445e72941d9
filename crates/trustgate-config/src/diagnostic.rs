// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment failures and validation findings into miette diagnostics.
//!
//! Unknown keys get a "did you mean" hint computed with Jaro-Winkler
//! similarity, and a source span when the key came from a file we can read.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a candidate key must exceed to be offered as a suggestion.
const MIN_SIMILARITY: f64 = 0.75;

/// One problem found while loading or validating `trustgate.toml`.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a trustgate setting")]
    #[diagnostic(
        code(trustgate::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("unknown key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type ({detail})")]
    #[diagnostic(code(trustgate::config::invalid_type), help("use a value of type {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("`{key}` is required but was not set")]
    #[diagnostic(
        code(trustgate::config::missing_key),
        help("set `{key}` in trustgate.toml or through a TRUSTGATE_ variable")
    )]
    MissingKey { key: String },

    /// Semantic problem in an otherwise well-formed file, such as an
    /// unordered tier table or an attempt timeout above the request budget.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(trustgate::config::validation))]
    Validation { message: String },

    #[error("could not load configuration: {0}")]
    #[diagnostic(code(trustgate::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    fn from_figment(error: figment::error::Error, sources: &[(String, String)]) -> Self {
        match &error.kind {
            Kind::UnknownField(field, expected) => {
                let known: Vec<&str> = expected.to_vec();
                let (span, src) = source_location(&error, field, sources).unzip();
                Self::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &known),
                    valid_keys: known.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => Self::MissingKey {
                key: dotted(&error.path, field),
            },
            Kind::InvalidType(found, expected) => Self::InvalidType {
                key: error.path.join("."),
                detail: format!("got {found}"),
                expected: expected.to_string(),
            },
            _ => Self::Other(error.to_string()),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(best) => format!("did you mean `{best}`? known keys here: {valid_keys}"),
        None => format!("known keys here: {valid_keys}"),
    }
}

fn dotted(path: &[String], field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{field}", path.join("."))
    }
}

/// Split a figment error, which may carry several failures, into one
/// diagnostic per failure.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| ConfigError::from_figment(error, toml_sources))
        .collect()
}

/// Span and named source for `field` when the failing value came from a file
/// listed in `sources`.
fn source_location(
    error: &figment::error::Error,
    field: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let figment::Source::File(file) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let file = file.display().to_string();
    let (name, content) = sources.iter().find(|(name, _)| *name == file)?;
    let offset = find_key_offset(content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(name, content.clone()),
    ))
}

/// Byte offset of the line that assigns `field`, searched from the header of
/// the table (`[name]` or `[[name]]`) named by the first element of `path`.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        None => 0,
        Some(table) => [format!("[[{table}]]"), format!("[{table}]")]
            .iter()
            .find_map(|header| content.find(header.as_str()).map(|at| at + header.len()))?,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let body = line.trim_start();
        let assigns = body
            .strip_prefix(field)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c == '=' || c.is_whitespace());
        if assigns {
            return Some(offset + line.len() - body.len());
        }
        offset += line.len();
    }
    None
}

/// Closest key from `valid_keys`, if any is similar enough to `unknown`.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(similarity, _)| *similarity > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_owned())
}

/// Print every diagnostic to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let renderer = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match renderer.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("trustgate: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_health_ttl() {
        let valid = &["health_ttl_secs", "probe_timeout_ms", "local_provider"];
        assert_eq!(
            suggest_key("helth_ttl_secs", valid),
            Some("health_ttl_secs".to_string())
        );
    }

    #[test]
    fn unrelated_key_gets_no_suggestion() {
        assert_eq!(suggest_key("qqqq", &["name", "log_level", "failsafe_message"]), None);
    }

    #[test]
    fn finds_key_in_table_section() {
        let content = "[router]\nhelth_ttl_secs = 5\n";
        let path = vec!["router".to_string()];
        let offset = find_key_offset(content, &path, "helth_ttl_secs").unwrap();
        assert_eq!(&content[offset..offset + 14], "helth_ttl_secs");
    }

    #[test]
    fn finds_key_in_array_section() {
        let content = "[gateway]\nname = \"x\"\n\n[[providers]]\nid = \"a\"\ncost = 1\n";
        let path = vec!["providers".to_string()];
        let offset = find_key_offset(content, &path, "cost").unwrap();
        assert_eq!(&content[offset..offset + 4], "cost");
    }

    #[test]
    fn key_prefix_is_not_a_match() {
        let content = "[router]\nhealth_ttl_secs_extra = 1\nhealth_ttl_secs = 2\n";
        let path = vec!["router".to_string()];
        let offset = find_key_offset(content, &path, "health_ttl_secs").unwrap();
        assert!(content[offset..].starts_with("health_ttl_secs = 2"));
    }

    #[test]
    fn missing_key_is_dotted() {
        assert_eq!(dotted(&["policy".into()], "tiers"), "policy.tiers");
        assert_eq!(dotted(&[], "gateway"), "gateway");
    }
}
