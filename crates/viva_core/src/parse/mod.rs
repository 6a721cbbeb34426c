//! Parsing of free-text model output.
//!
//! The language model is only asked (never forced) to follow a format, so nothing here fails:
//! missing pieces fall back to `0` or [`NOT_AVAILABLE`].

mod evaluation;
mod questions;

pub use evaluation::{extract_score, extract_verdict, format_evaluation};
pub use questions::parse_questions;

pub const NOT_AVAILABLE: &str = "N/A";
