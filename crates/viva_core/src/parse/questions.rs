use std::sync::OnceLock;

use regex::Regex;

fn numbered_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\d+\.\s*(.+)$").expect("static question regex"))
}

/// Questions from a numbered list (`1. ...`), one per matching line, in order.
///
/// Lines without a leading number are ignored, so prose output yields an empty list.
pub fn parse_questions(text: &str) -> Vec<String> {
    numbered_line_re()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}
