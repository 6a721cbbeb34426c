use serde::{Deserialize, Serialize};
use viva_core::error::AppError;

use super::{decode_response, encode_request, non_empty, Llm};
use crate::ollama::OllamaClient;

/// Local generation through Ollama's `/api/generate`, non-streaming.
#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    #[serde(default)]
    response: String,
}

impl Llm for OllamaLlm {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let body = encode_request(&GenerateBody {
            model,
            prompt,
            stream: false,
        })?;

        log::debug!("ollama generate model={model} prompt_chars={}", prompt.chars().count());
        let resp = ureq::post(&format!("{}/api/generate", self.client.base_url()))
            .timeout(self.client.generate_timeout())
            .send_json(body);

        let reply: GenerateReply = decode_response(resp, model)?;
        non_empty(reply.response)
    }
}
