use serde::{Deserialize, Serialize};
use viva_core::error::AppError;

use crate::embeddings::Embedder;
use crate::index::VectorIndex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalHit {
    pub position: usize,
    pub chunk_id: String,
    pub distance: f32,
    pub text: String,
}

/// Embed `query` with the index's model and return up to `top_k` chunks, closest first.
/// The query is embedded exactly as given; surrounding whitespace only matters to the blank check.
///
/// `top_k` is clamped to the index size. Positions that do not resolve to a chunk in `chunks`
/// are skipped, so a short `chunks` slice yields fewer hits instead of a bad lookup.
pub fn retrieve_hits(
    query: &str,
    index: &VectorIndex,
    chunks: &[String],
    embedder: &dyn Embedder,
    top_k: usize,
) -> Result<Vec<RetrievalHit>, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::new(
            "AI_RETRIEVAL_FAILED",
            "Query must not be empty",
        ));
    }
    if top_k == 0 {
        return Ok(Vec::new());
    }
    if chunks.len() != index.len() {
        log::warn!(
            "chunk sequence ({}) and index ({}) differ in length; unmatched positions are skipped",
            chunks.len(),
            index.len()
        );
    }

    let qv = embedder.embed(index.model(), query)?;
    let neighbors = index.search(&qv, top_k.min(index.len()))?;

    let mut out = Vec::with_capacity(neighbors.len());
    for n in neighbors {
        let (Some(text), Some(chunk_id)) = (chunks.get(n.position), index.chunk_id(n.position)) else {
            continue;
        };
        out.push(RetrievalHit {
            position: n.position,
            chunk_id: chunk_id.to_string(),
            distance: n.distance,
            text: text.clone(),
        });
    }

    log::debug!("retrieved {} of top_k={} chunks", out.len(), top_k);
    Ok(out)
}

/// Chunk texts only, closest first.
pub fn retrieve_chunks(
    query: &str,
    index: &VectorIndex,
    chunks: &[String],
    embedder: &dyn Embedder,
    top_k: usize,
) -> Result<Vec<String>, AppError> {
    Ok(retrieve_hits(query, index, chunks, embedder, top_k)?
        .into_iter()
        .map(|h| h.text)
        .collect())
}
