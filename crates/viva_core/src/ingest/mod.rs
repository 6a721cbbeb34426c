pub mod pdf;

pub use pdf::{extract_text_from_bytes, extract_text_from_pdf, ExtractionConfig, LayoutBlock};
