// SPDX-FileCopyrightText: 2026 Trustgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic complexity and quality signals.
//!
//! Surface features only: lengths, punctuation, and keyword hits. No model
//! call, no network. Every signal is labeled `heuristic` when serialized so
//! nobody mistakes it for a semantic judgment.

use trustgate_core::round_to;
use trustgate_core::types::HeuristicSignal;

/// Phrases that suggest a request needs multi-step work.
const COMPLEXITY_MARKERS: &[&str] = &[
    "analyze", "compare", "evaluate", "implement", "design", "architecture",
    "trade-off", "tradeoff", "pros and cons", "step by step", "explain",
    "debug", "refactor", "optimize", "algorithm", "strategy", "in depth",
    "comprehensive", "why",
];

/// Line prefixes that mark structured output.
const STRUCTURE_MARKERS: &[&str] = &["- ", "* ", "# ", "## ", "```", "1. ", "2. ", "3. "];

fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Estimate how demanding a raw payload is.
///
/// Bands: `simple` below 0.25, `standard` below 0.6, otherwise `complex`.
pub fn payload_complexity(payload: &str) -> HeuristicSignal {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return HeuristicSignal::new(0.0, "simple");
    }
    let lower = trimmed.to_lowercase();

    let words = trimmed.split_whitespace().count() as f64;
    let length = (words / 150.0).min(1.0) * 0.4;

    let questions = trimmed.matches('?').count() as f64;
    let sentences = count_sentences(trimmed).max(1) as f64;
    let questioning = (questions / sentences).min(1.0) * 0.15;

    let markers = COMPLEXITY_MARKERS.iter().filter(|m| lower.contains(*m)).count() as f64;
    let marked = (markers / 3.0).min(1.0) * 0.3;

    let code = if trimmed.contains("```") { 0.15 } else { 0.0 };

    let score = round_to((length + questioning + marked + code).clamp(0.0, 1.0), 3);
    let band = if score < 0.25 {
        "simple"
    } else if score < 0.6 {
        "standard"
    } else {
        "complex"
    };
    HeuristicSignal::new(score, band)
}

/// Estimate how useful a response looks.
///
/// Failsafe responses always score zero. Bands: `poor` below 0.3, `fair`
/// below 0.6, otherwise `good`.
pub fn quality_signal(output: &str, failsafe: bool) -> HeuristicSignal {
    if failsafe {
        return HeuristicSignal::new(0.0, "failsafe");
    }
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return HeuristicSignal::new(0.0, "poor");
    }

    let words = trimmed.split_whitespace().count() as f64;
    let length = (words / 80.0).min(1.0) * 0.6;

    let structured = trimmed
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            STRUCTURE_MARKERS.iter().any(|m| line.starts_with(m))
        })
        .count() as f64;
    let structure = (structured / 3.0).min(1.0) * 0.25;

    let finished = if trimmed.ends_with(['.', '!', '?', '`']) { 0.15 } else { 0.0 };

    let score = round_to((length + structure + finished).clamp(0.0, 1.0), 3);
    let band = if score < 0.3 {
        "poor"
    } else if score < 0.6 {
        "fair"
    } else {
        "good"
    };
    HeuristicSignal::new(score, band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::types::HEURISTIC_METHOD;

    #[test]
    fn greeting_is_simple() {
        let s = payload_complexity("hello");
        assert_eq!(s.band, "simple");
        assert_eq!(s.method, HEURISTIC_METHOD);
    }

    #[test]
    fn analytic_request_is_more_complex() {
        let simple = payload_complexity("what time is it");
        let complex = payload_complexity(
            "Please analyze and compare these two designs step by step. Why does the first one \
             have better latency? ```fn main() {}```",
        );
        assert!(complex.score > simple.score);
        assert_ne!(complex.band, "simple");
    }

    #[test]
    fn complexity_is_bounded() {
        let huge = "explain why analyze compare design? ".repeat(500);
        let s = payload_complexity(&huge);
        assert!((0.0..=1.0).contains(&s.score));
        assert_eq!(s.band, "complex");
    }

    #[test]
    fn failsafe_quality_is_zero() {
        let s = quality_signal("anything at all.", true);
        assert_eq!(s.score, 0.0);
        assert_eq!(s.band, "failsafe");
    }

    #[test]
    fn structured_long_answer_scores_well() {
        let mut answer = String::from("Here is the plan:\n");
        for i in 1..=3 {
            answer.push_str(&format!("{i}. do step number {i} carefully and check the results twice\n"));
        }
        answer.push_str(&"More detail follows here. ".repeat(10));
        let s = quality_signal(answer.trim_end(), false);
        assert_eq!(s.band, "good", "score {}", s.score);
    }

    #[test]
    fn empty_answer_is_poor() {
        assert_eq!(quality_signal("   ", false).band, "poor");
    }

    #[test]
    fn serialized_signal_is_labeled() {
        let json = serde_json::to_value(payload_complexity("why?")).unwrap();
        assert_eq!(json["method"], "heuristic");
    }
}
