use viva_core::error::AppError;

/// Sentence-embedding service. Implementations must be deterministic for a given model.
pub trait Embedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;

    /// One vector per input, in input order.
    fn embed_batch(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        inputs.iter().map(|t| self.embed(model, t)).collect()
    }
}

pub mod ollama_embed;
