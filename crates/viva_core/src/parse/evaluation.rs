use std::sync::OnceLock;

use regex::Regex;

use super::NOT_AVAILABLE;
use crate::domain::{FormattedEvaluation, Verdict};

fn score_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Score:\s*(\d+)").expect("static score regex"))
}

fn verdict_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Verdict:\s*([A-Za-z ]+)").expect("static verdict regex"))
}

fn explanation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Explanation:\s*(.*)").expect("static explanation regex"))
}

fn score_digits(text: &str) -> Option<&str> {
    score_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn non_empty_or_na(s: Option<&str>) -> String {
    match s.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Numeric score from the first `Score: <digits>` marker; `0` when absent or unparseable.
pub fn extract_score(evaluation: &str) -> u32 {
    score_digits(evaluation)
        .and_then(|d| d.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Typed verdict, when the label is one of the three expected values.
pub fn extract_verdict(evaluation: &str) -> Option<Verdict> {
    verdict_re()
        .captures(evaluation)
        .and_then(|c| c.get(1))
        .and_then(|m| Verdict::from_label(m.as_str()))
}

pub fn format_evaluation(evaluation: &str) -> FormattedEvaluation {
    let verdict = verdict_re()
        .captures(evaluation)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    let explanation = explanation_re()
        .captures(evaluation)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());

    FormattedEvaluation {
        score: non_empty_or_na(score_digits(evaluation)),
        verdict: non_empty_or_na(verdict),
        explanation: non_empty_or_na(explanation),
    }
}
