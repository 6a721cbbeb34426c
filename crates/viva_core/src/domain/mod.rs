use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Extracted paper text, blocks joined in reading order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub text_sha256: String,
}

impl Document {
    pub fn new(text: String) -> Self {
        let text_sha256 = sha256_hex(&text);
        Self { text, text_sha256 }
    }
}

/// One answered question. Appended to the session history and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationRecord {
    pub question: String,
    pub answer: String,
    pub evaluation: String,
    pub score: u32,
}

/// Display-ready view of an evaluation; every field falls back to `"N/A"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormattedEvaluation {
    pub score: String,
    pub verdict: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    PartiallyCorrect,
    Incorrect,
}

impl Verdict {
    pub fn from_label(label: &str) -> Option<Self> {
        let norm = label.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
        match norm.as_str() {
            "correct" => Some(Self::Correct),
            "partially correct" => Some(Self::PartiallyCorrect),
            "incorrect" => Some(Self::Incorrect),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::PartiallyCorrect => "Partially Correct",
            Self::Incorrect => "Incorrect",
        }
    }
}

pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
