use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Document;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Blocks whose trimmed text is this long or shorter are dropped (page numbers, headers).
    pub min_block_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { min_block_chars: 20 }
    }
}

/// A run of text with its position on the page, in PDF points. `top` is the first line's
/// baseline measured down from the top edge; `left` is the leftmost glyph origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBlock {
    pub page: u32,
    pub top: f64,
    pub left: f64,
    pub text: String,
}

pub fn extract_text_from_pdf(path: &Path, cfg: &ExtractionConfig) -> Result<Document, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::new("INGEST_PDF_UNREADABLE", "Failed to open PDF file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    extract_text_from_bytes(&bytes, cfg).map_err(|mut e| {
        let loc = format!("path={}", path.display());
        e.details = Some(match e.details.take() {
            Some(d) => format!("{loc}; {d}"),
            None => loc,
        });
        e
    })
}

pub fn extract_text_from_bytes(bytes: &[u8], cfg: &ExtractionConfig) -> Result<Document, AppError> {
    if bytes.is_empty() {
        return Err(AppError::new("INGEST_PDF_PARSE_FAILED", "PDF input is empty"));
    }

    // The parser may panic on malformed cross-reference tables or missing fonts.
    let blocks = match panic::catch_unwind(AssertUnwindSafe(|| collect_layout_blocks(bytes))) {
        Ok(res) => res?,
        Err(_) => {
            return Err(AppError::new("INGEST_PDF_PARSE_FAILED", "Failed to parse PDF")
                .with_details("err=parser panicked"))
        }
    };

    let pages = blocks.last().map(|b| b.page).unwrap_or(0);
    let text = assemble_blocks(blocks, cfg.min_block_chars);
    log::info!(
        "extracted {} chars of text from {pages} PDF pages",
        text.chars().count()
    );
    Ok(Document::new(text))
}

/// Run the PDF content streams and group glyphs into positioned blocks, pages in document
/// order. Blocks within a page come out in content-stream order.
pub fn collect_layout_blocks(bytes: &[u8]) -> Result<Vec<LayoutBlock>, AppError> {
    let parse_failed = |e: String| {
        AppError::new("INGEST_PDF_PARSE_FAILED", "Failed to parse PDF").with_details(format!("err={e}"))
    };

    let mut doc = pdf_extract::Document::load_mem(bytes).map_err(|e| parse_failed(e.to_string()))?;
    if doc.is_encrypted() {
        doc.decrypt("").map_err(|e| parse_failed(e.to_string()))?;
    }

    let mut collector = BlockCollector::default();
    pdf_extract::output_doc(&doc, &mut collector).map_err(|e| parse_failed(format!("{e:?}")))?;
    collector.close_block();
    Ok(collector.blocks)
}

#[derive(Debug)]
struct OpenBlock {
    page: u32,
    top: f64,
    left: f64,
    lines: Vec<String>,
    line_y: f64,
    last_end: f64,
}

/// Glyph sink. Coordinates are converted so `top` is measured down from the top of the page.
#[derive(Debug, Default)]
struct BlockCollector {
    page: u32,
    page_top: f64,
    word_start: bool,
    open: Option<OpenBlock>,
    blocks: Vec<LayoutBlock>,
}

impl BlockCollector {
    fn close_block(&mut self) {
        if let Some(b) = self.open.take() {
            self.blocks.push(LayoutBlock {
                page: b.page,
                top: b.top,
                left: b.left,
                text: b
                    .lines
                    .iter()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n"),
            });
        }
    }

    fn open_block(&mut self, x: f64, y: f64) {
        self.open = Some(OpenBlock {
            page: self.page,
            top: y,
            left: x,
            lines: vec![String::new()],
            line_y: y,
            last_end: x,
        });
    }
}

/// Rendered glyph height; falls back to the nominal font size for degenerate matrices.
fn glyph_size(trm: &pdf_extract::Transform, font_size: f64) -> f64 {
    let sx = font_size * (trm.m11 + trm.m21);
    let sy = font_size * (trm.m12 + trm.m22);
    let size = (sx * sy).abs().sqrt();
    if size.is_finite() && size > 0.0 {
        size
    } else {
        font_size.abs().max(1.0)
    }
}

impl pdf_extract::OutputDev for BlockCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        media_box: &pdf_extract::MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), pdf_extract::OutputError> {
        self.close_block();
        self.page = page_num;
        self.page_top = media_box.ury;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), pdf_extract::OutputError> {
        self.close_block();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &pdf_extract::Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        ch: &str,
    ) -> Result<(), pdf_extract::OutputError> {
        let x = trm.m31;
        let y = self.page_top - trm.m32;
        let size = glyph_size(trm, font_size);
        let word_start = std::mem::replace(&mut self.word_start, false);

        match self.open.as_ref().map(|b| y - b.line_y) {
            None if ch.trim().is_empty() => return Ok(()),
            None => self.open_block(x, y),
            // Jumped up the page, or a gap wider than a line: a separate block.
            Some(dy) if dy < -0.5 * size || dy > 1.5 * size => {
                self.close_block();
                if ch.trim().is_empty() {
                    return Ok(());
                }
                self.open_block(x, y);
            }
            Some(dy) => {
                if let Some(b) = self.open.as_mut() {
                    if dy > 0.5 * size {
                        b.lines.push(String::new());
                        b.line_y = y;
                        b.left = b.left.min(x);
                    } else if word_start && x > b.last_end + 0.1 * size {
                        if let Some(line) = b.lines.last_mut() {
                            line.push(' ');
                        }
                    }
                }
            }
        }

        if let Some(b) = self.open.as_mut() {
            if let Some(line) = b.lines.last_mut() {
                line.push_str(ch);
            }
            b.last_end = x + width * size;
        }
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), pdf_extract::OutputError> {
        self.word_start = true;
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), pdf_extract::OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), pdf_extract::OutputError> {
        Ok(())
    }
}

/// Reading-order assembly: pages ascending, then blocks top-to-bottom and left-to-right.
/// Blocks whose trimmed length does not exceed `min_block_chars` are discarded; the rest are
/// trimmed and joined with newlines.
pub fn assemble_blocks(mut blocks: Vec<LayoutBlock>, min_block_chars: usize) -> String {
    blocks.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.top.total_cmp(&b.top))
            .then(a.left.total_cmp(&b.left))
    });

    blocks
        .iter()
        .map(|b| b.text.trim())
        .filter(|t| t.chars().count() > min_block_chars)
        .collect::<Vec<_>>()
        .join("\n")
}
