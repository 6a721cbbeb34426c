use serde::{Deserialize, Serialize};
use viva_core::domain::sha256_hex;
use viva_core::error::AppError;

use crate::embeddings::Embedder;

mod distance;

pub use distance::squared_l2;

/// Raw embeddings, row `i` belonging to chunk `i`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingMatrix {
    pub dims: usize,
    pub rows: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Exact (brute-force) L2 index. Vectors are stored row-major in chunk order, so a search
/// position is also the position of the chunk in the sequence the index was built from.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    model: String,
    dims: usize,
    chunk_ids: Vec<String>,
    data: Vec<f32>,
}

/// Content-derived chunk identifier; the ordinal keeps repeated text distinct.
pub fn chunk_id(ordinal: usize, text: &str) -> String {
    sha256_hex(&format!("ordinal={ordinal}\ntext={text}"))
}

impl VectorIndex {
    pub fn from_embeddings(
        model: &str,
        chunk_ids: Vec<String>,
        embeddings: &[Vec<f32>],
    ) -> Result<Self, AppError> {
        if embeddings.is_empty() {
            return Err(AppError::new(
                "AI_INDEX_EMPTY",
                "No chunks available; cannot build an index over an empty document",
            ));
        }
        if chunk_ids.len() != embeddings.len() {
            return Err(AppError::new(
                "AI_INDEX_BUILD_FAILED",
                "Embedding count does not match chunk count",
            )
            .with_details(format!(
                "chunks={}; embeddings={}",
                chunk_ids.len(),
                embeddings.len()
            )));
        }

        let dims = embeddings[0].len();
        if dims == 0 {
            return Err(AppError::new(
                "AI_INDEX_BUILD_FAILED",
                "Embedding vectors must not be empty",
            ));
        }

        let mut data = Vec::with_capacity(dims * embeddings.len());
        for (pos, v) in embeddings.iter().enumerate() {
            if v.len() != dims {
                return Err(AppError::new(
                    "AI_INDEX_BUILD_FAILED",
                    "Embedding dimension mismatch across chunks",
                )
                .with_details(format!("expected={dims}; got={}; position={pos}", v.len())));
            }
            data.extend_from_slice(v);
        }

        Ok(Self {
            model: model.to_string(),
            dims,
            chunk_ids,
            data,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    pub fn chunk_id(&self, position: usize) -> Option<&str> {
        self.chunk_ids.get(position).map(|s| s.as_str())
    }

    /// The `k` nearest vectors, closest first; ties go to the lower position.
    /// `k` larger than the index yields every vector.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, AppError> {
        if query.len() != self.dims {
            return Err(AppError::new(
                "AI_RETRIEVAL_FAILED",
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={}; query_dims={}", self.dims, query.len())));
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dims)
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                distance: squared_l2(query, v),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k.min(self.len()));
        Ok(hits)
    }
}

/// Embed every chunk and build the index. Returns the index and the raw embedding matrix.
pub fn build_index(
    chunks: &[String],
    embedder: &dyn Embedder,
    model: &str,
) -> Result<(VectorIndex, EmbeddingMatrix), AppError> {
    if chunks.is_empty() {
        return Err(AppError::new(
            "AI_INDEX_EMPTY",
            "No chunks available; cannot build an index over an empty document",
        ));
    }

    let rows = embedder.embed_batch(model, chunks).map_err(|e| {
        AppError::new("AI_EMBEDDINGS_FAILED", "Failed to compute embeddings")
            .with_details(format!("chunks={}; err={}", chunks.len(), e))
            .with_retryable(e.retryable)
    })?;

    let ids = chunks
        .iter()
        .enumerate()
        .map(|(i, t)| chunk_id(i, t))
        .collect::<Vec<_>>();
    let index = VectorIndex::from_embeddings(model, ids, &rows)?;

    log::info!(
        "built index: {} chunks, {} dims, model={}",
        index.len(),
        index.dims(),
        model
    );
    let dims = index.dims();
    Ok((index, EmbeddingMatrix { dims, rows }))
}
