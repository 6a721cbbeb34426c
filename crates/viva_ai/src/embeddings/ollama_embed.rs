use serde::{Deserialize, Serialize};
use viva_core::error::AppError;

use super::Embedder;
use crate::ollama::OllamaClient;

const MAX_EMBED_INPUT_CHARS: usize = 12_000;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct EmbedBatchRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbedBatchResponse {
    embeddings: Vec<Vec<f32>>,
}

fn bounded(input: &str) -> &str {
    match input.char_indices().nth(MAX_EMBED_INPUT_CHARS) {
        Some((i, _)) => &input[..i],
        None => input,
    }
}

impl OllamaEmbedder {
    fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.client.base_url(), path);
        let resp = ureq::post(&url)
            .timeout(self.client.embed_timeout())
            .send_json(body);

        match resp {
            Ok(r) if r.status() == 200 => r.into_json::<T>().map_err(|e| {
                AppError::new("AI_EMBEDDINGS_FAILED", "Failed to decode embeddings response")
                    .with_details(e.to_string())
            }),
            Ok(r) => Err(
                AppError::new("AI_EMBEDDINGS_FAILED", "Embeddings request failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(ureq::Error::Status(code, r)) => Err(
                AppError::new("AI_EMBEDDINGS_FAILED", "Embeddings request failed")
                    .with_details(format!(
                        "status={code}; body={}",
                        r.into_string().unwrap_or_default()
                    )),
            ),
            Err(e) => Err(
                AppError::new("AI_EMBEDDINGS_FAILED", "Failed to call embeddings endpoint")
                    .with_details(e.to_string())
                    .with_retryable(true),
            ),
        }
    }
}

fn encode<T: Serialize>(req: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(req).map_err(|e| {
        AppError::new("AI_EMBEDDINGS_FAILED", "Failed to encode embeddings request")
            .with_details(e.to_string())
    })
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError> {
        let req = EmbeddingsRequest {
            model,
            prompt: bounded(input),
        };
        let v: EmbeddingsResponse = self.post("/api/embeddings", encode(&req)?)?;
        if v.embedding.is_empty() {
            return Err(AppError::new(
                "AI_EMBEDDINGS_FAILED",
                "Embeddings response was empty",
            ));
        }
        Ok(v.embedding)
    }

    fn embed_batch(&self, model: &str, inputs: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let req = EmbedBatchRequest {
            model,
            input: inputs.iter().map(|s| bounded(s)).collect(),
        };
        let v: EmbedBatchResponse = self.post("/api/embed", encode(&req)?)?;
        if v.embeddings.len() != inputs.len() {
            return Err(AppError::new(
                "AI_EMBEDDINGS_FAILED",
                "Embeddings response count does not match inputs",
            )
            .with_details(format!(
                "inputs={}; embeddings={}",
                inputs.len(),
                v.embeddings.len()
            )));
        }
        log::debug!("embedded {} inputs with model={model}", inputs.len());
        Ok(v.embeddings)
    }
}
